//! Layered options: an instance map over a kind-wide default map
//!
//! Reads fall through to the defaults when the instance map lacks a key.
//! Writes always land in the instance map. Nothing is ever deleted.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub type OptionMap = HashMap<String, Value>;

/// Default option map shared by every instance of one component kind.
#[derive(Clone, Debug, Default)]
pub struct Defaults(Arc<RwLock<OptionMap>>);

impl Defaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: OptionMap) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Override a kind-wide default. Visible to every instance whose own map
    /// does not shadow `key`.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value);
    }
}

/// Per-instance options backed by a kind's [`Defaults`].
#[derive(Clone, Debug, Default)]
pub struct Options {
    local: OptionMap,
    defaults: Defaults,
}

impl Options {
    pub fn new(defaults: Defaults) -> Self {
        Self {
            local: OptionMap::new(),
            defaults,
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        match self.local.get(key) {
            Some(value) => Some(value.clone()),
            None => self.defaults.get(key),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.local.insert(key.into(), value);
    }

    /// Shallow-overwrite several keys. Callers hold the owning record's write
    /// lock, so readers never observe a partial merge.
    pub fn merge<K, I>(&mut self, partial: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (key, value) in partial {
            self.local.insert(key.into(), value);
        }
    }

    /// `true` when `key` resolves to a truthy value.
    pub fn is_enabled(&self, key: &str) -> bool {
        match self.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Instance-level entries only.
    pub fn local(&self) -> &OptionMap {
        &self.local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_falls_through_to_defaults() {
        let defaults = Defaults::new();
        defaults.set("theme", json!("dark"));
        let options = Options::new(defaults);
        assert_eq!(options.get("theme"), Some(json!("dark")));
        assert_eq!(options.get("missing"), None);
    }

    #[test]
    fn set_shadows_without_touching_defaults() {
        let defaults = Defaults::new();
        defaults.set("theme", json!("dark"));
        let mut a = Options::new(defaults.clone());
        let b = Options::new(defaults.clone());

        a.set("theme", json!("light"));

        assert_eq!(a.get("theme"), Some(json!("light")));
        assert_eq!(b.get("theme"), Some(json!("dark")));
        assert_eq!(defaults.get("theme"), Some(json!("dark")));
    }

    #[test]
    fn default_override_reaches_unshadowed_instances() {
        let defaults = Defaults::new();
        let mut shadowed = Options::new(defaults.clone());
        shadowed.set("size", json!(1));

        defaults.set("size", json!(3));
        let later = Options::new(defaults.clone());

        assert_eq!(later.get("size"), Some(json!(3)));
        assert_eq!(shadowed.get("size"), Some(json!(1)));
    }

    #[test]
    fn merge_overwrites_shallowly() {
        let mut options = Options::new(Defaults::new());
        options.set("a", json!({"nested": 1}));
        options.merge([("a", json!({"other": 2})), ("b", json!(true))]);
        assert_eq!(options.get("a"), Some(json!({"other": 2})));
        assert_eq!(options.get("b"), Some(json!(true)));
    }

    #[test]
    fn truthiness() {
        let mut options = Options::new(Defaults::new());
        options.merge([
            ("t", json!(true)),
            ("f", json!(false)),
            ("zero", json!(0)),
            ("one", json!(1)),
            ("empty", json!("")),
            ("word", json!("yes")),
            ("obj", json!({})),
        ]);
        assert!(options.is_enabled("t"));
        assert!(!options.is_enabled("f"));
        assert!(!options.is_enabled("zero"));
        assert!(options.is_enabled("one"));
        assert!(!options.is_enabled("empty"));
        assert!(options.is_enabled("word"));
        assert!(options.is_enabled("obj"));
        assert!(!options.is_enabled("absent"));
    }
}
