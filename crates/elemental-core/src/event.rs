//! Event names, hooks, and entry-point actions
//!
//! Event names are a stable wire contract: subscribers embedding a component
//! match on these exact strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every event an instance can publish.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Event {
    #[serde(rename = "changed")]
    Changed,
    #[serde(rename = "attribute.changed")]
    AttributeChanged,
    #[serde(rename = "cloned")]
    Cloned,
    #[serde(rename = "connecting")]
    Connecting,
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "rendered")]
    Rendered,
    #[serde(rename = "disconnected")]
    Disconnected,
    #[serde(rename = "adopted")]
    Adopted,
    #[serde(rename = "props.set")]
    PropsSet,
    #[serde(rename = "elements.set")]
    ElementsSet,
    #[serde(rename = "error")]
    Error,
}

impl Event {
    pub const ALL: [Event; 11] = [
        Event::Changed,
        Event::AttributeChanged,
        Event::Cloned,
        Event::Connecting,
        Event::Connected,
        Event::Rendered,
        Event::Disconnected,
        Event::Adopted,
        Event::PropsSet,
        Event::ElementsSet,
        Event::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Event::Changed => "changed",
            Event::AttributeChanged => "attribute.changed",
            Event::Cloned => "cloned",
            Event::Connecting => "connecting",
            Event::Connected => "connected",
            Event::Rendered => "rendered",
            Event::Disconnected => "disconnected",
            Event::Adopted => "adopted",
            Event::PropsSet => "props.set",
            Event::ElementsSet => "elements.set",
            Event::Error => "error",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Event {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Event::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| crate::Error::custom(format!("unknown event: {s}")))
    }
}

/// User-overridable lifecycle hooks, in the order a mount runs them.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hook {
    Props,
    Elements,
    Render,
    Connected,
    Disconnected,
    Adopted,
    AttributeChanged,
}

impl Hook {
    /// The three stages that precede `Connected` during a mount.
    pub const MOUNT: [Hook; 3] = [Hook::Props, Hook::Elements, Hook::Render];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Props => "props",
            Hook::Elements => "elements",
            Hook::Render => "render",
            Hook::Connected => "connected",
            Hook::Disconnected => "disconnected",
            Hook::Adopted => "adopted",
            Hook::AttributeChanged => "attribute_changed",
        }
    }

    /// Event published once this hook settles successfully.
    pub fn event(&self) -> Event {
        match self {
            Hook::Props => Event::PropsSet,
            Hook::Elements => Event::ElementsSet,
            Hook::Render => Event::Rendered,
            Hook::Connected => Event::Connected,
            Hook::Disconnected => Event::Disconnected,
            Hook::Adopted => Event::Adopted,
            Hook::AttributeChanged => Event::AttributeChanged,
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-facing entry points. Named in `error` event payloads.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Connect,
    Disconnect,
    Adopt,
    AttributeChange,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Connect => "connect",
            Action::Disconnect => "disconnect",
            Action::Adopt => "adopt",
            Action::AttributeChange => "attribute_change",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
