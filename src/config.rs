//! Elemental configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists or it fails to parse.

use elemental_component::kind::{CLONE_MARKER_ATTRIBUTE, DEBUG_OPTION, IDENTITY_ATTRIBUTE};
use elemental_component::{ComponentKind, OptionMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementalConfig {
    /// Log filter, format, and optional file.
    pub logging: LoggingConfig,
    /// Per-publish diagnostic records.
    pub diagnostics: DiagnosticsConfig,
    /// Names of the attributes persisted on each represented node.
    pub attributes: AttributeConfig,
    /// Class-level default options, keyed by component kind.
    pub defaults: BTreeMap<String, BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
    /// Also write logs to this file.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Seed the `debug` option into every kind's defaults.
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeConfig {
    pub identity: String,
    pub clone_marker: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "elemental=info".into(),
            json: false,
            file: None,
        }
    }
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            identity: IDENTITY_ATTRIBUTE.into(),
            clone_marker: CLONE_MARKER_ATTRIBUTE.into(),
        }
    }
}

impl ElementalConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> elemental_core::Result<Self> {
        toml::from_str(content).map_err(|e| elemental_core::Error::Config(e.to_string()))
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Build the shared kind for `name`: configured attribute names, the
    /// `[defaults.<name>]` table, and the debug flag.
    pub fn kind(&self, name: &str) -> Arc<ComponentKind> {
        let mut defaults: OptionMap = self
            .defaults
            .get(name)
            .map(|table| table.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        if self.diagnostics.debug {
            defaults.insert(DEBUG_OPTION.to_string(), Value::Bool(true));
        }
        ComponentKind::new(name)
            .with_attributes(&self.attributes.identity, &self.attributes.clone_marker)
            .with_defaults(defaults)
            .shared()
    }
}
