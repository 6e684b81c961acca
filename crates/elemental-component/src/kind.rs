//! Component kinds: the class-level side of an instance

use crate::options::{Defaults, OptionMap};
use serde_json::Value;
use std::sync::Arc;

/// Attribute holding the canonical identity on the represented node.
pub const IDENTITY_ATTRIBUTE: &str = "data-element-id";
/// Attribute written after a clone event, holding the superseded identity.
pub const CLONE_MARKER_ATTRIBUTE: &str = "data-cloned-from";
/// Option key that turns on per-publish diagnostic records.
pub const DEBUG_OPTION: &str = "debug";

/// Name, shared default options, and persisted attribute names for one kind
/// of component. Every instance of the kind holds the same `Arc`.
#[derive(Debug)]
pub struct ComponentKind {
    name: String,
    defaults: Defaults,
    identity_attribute: String,
    clone_marker_attribute: String,
}

impl ComponentKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Defaults::new(),
            identity_attribute: IDENTITY_ATTRIBUTE.to_string(),
            clone_marker_attribute: CLONE_MARKER_ATTRIBUTE.to_string(),
        }
    }

    pub fn with_defaults(mut self, defaults: OptionMap) -> Self {
        self.defaults = Defaults::from_map(defaults);
        self
    }

    pub fn with_attributes(
        mut self,
        identity: impl Into<String>,
        clone_marker: impl Into<String>,
    ) -> Self {
        self.identity_attribute = identity.into();
        self.clone_marker_attribute = clone_marker.into();
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn set_default(&self, key: impl Into<String>, value: Value) {
        self.defaults.set(key, value);
    }

    pub fn default_value(&self, key: &str) -> Option<Value> {
        self.defaults.get(key)
    }

    pub fn identity_attribute(&self) -> &str {
        &self.identity_attribute
    }

    pub fn clone_marker_attribute(&self) -> &str {
        &self.clone_marker_attribute
    }
}
