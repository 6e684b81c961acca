//! Core types for Elemental

use crate::event::Event;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Instance identity - cheaply cloneable, immutable once generated
#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct InstanceId(Arc<str>);

impl InstanceId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for InstanceId {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for InstanceId {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Handle to a node in the host tree
#[derive(
    Clone, Copy, Debug, Default, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an instance sits in its lifecycle.
///
/// `Disconnected` only ends one mount cycle; a later attach starts over at
/// `Connecting`.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Created,
    Connecting,
    PropsInitializing,
    ElementsInitializing,
    Rendering,
    Connected,
    Disconnected,
    Adopted,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Connecting => "connecting",
            Self::PropsInitializing => "props_initializing",
            Self::ElementsInitializing => "elements_initializing",
            Self::Rendering => "rendering",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Adopted => "adopted",
        }
    }

    /// True while a mount sequence has started but not reached `Connected`.
    pub fn is_mounting(&self) -> bool {
        matches!(
            self,
            Self::Connecting | Self::PropsInitializing | Self::ElementsInitializing | Self::Rendering
        )
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data carried by a published event.
///
/// A stage's outgoing payload keeps a back-reference to the payload it was
/// derived from, so a subscriber can walk the chain back to the mount input.
#[derive(Clone, Debug, Default)]
pub struct Payload {
    data: Value,
    origin: Option<Arc<Payload>>,
}

impl Payload {
    pub fn new(data: Value) -> Self {
        Self { data, origin: None }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Outgoing payload for a stage: the hook's output, or the input data
    /// when the hook returned nothing.
    pub fn derive(input: &Payload, output: Option<Value>) -> Self {
        let data = match output {
            Some(Value::Null) | None => input.data.clone(),
            Some(value) => value,
        };
        Self {
            data,
            origin: Some(Arc::new(input.clone())),
        }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn origin(&self) -> Option<&Payload> {
        self.origin.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Number of payloads behind this one in the derivation chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut cursor = self.origin();
        while let Some(payload) = cursor {
            depth += 1;
            cursor = payload.origin();
        }
        depth
    }

    /// JSON view including the origin chain.
    pub fn to_json(&self) -> Value {
        match &self.origin {
            Some(origin) => serde_json::json!({ "data": self.data, "origin": origin.to_json() }),
            None => serde_json::json!({ "data": self.data }),
        }
    }
}

impl From<Value> for Payload {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}

/// One attribute mutation reported by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl AttributeChange {
    pub fn new(name: impl Into<String>, old_value: Option<&str>, new_value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            old_value: old_value.map(str::to_string),
            new_value: new_value.map(str::to_string),
        }
    }
}

/// Structured record emitted for every publish while diagnostic mode is on.
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticRecord {
    pub ts: String,
    pub kind: String,
    pub identity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<String>,
    pub event: Event,
    pub payload: Value,
}

impl DiagnosticRecord {
    pub fn new(
        kind: &str,
        identity: &InstanceId,
        cloned_from: Option<&InstanceId>,
        event: Event,
        payload: &Payload,
    ) -> Self {
        Self {
            ts: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            kind: kind.to_string(),
            identity: identity.to_string(),
            cloned_from: cloned_from.map(|id| id.to_string()),
            event,
            payload: payload.data().clone(),
        }
    }
}
