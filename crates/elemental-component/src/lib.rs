//! Elemental Component - lifecycle orchestration for one component instance
//!
//! An [`Element`] pairs a user [`Component`] (the hooks) with an [`Instance`]
//! (identity, options, subscriptions, rendering surface). The host that owns
//! tree membership drives it through four entry points: `connect`,
//! `disconnect`, `adopt`, and `attribute_changed`.

pub mod clone;
pub mod host;
pub mod ident;
pub mod instance;
pub mod kind;
pub mod lifecycle;
pub mod memory;
pub mod options;
pub mod registry;

pub use clone::Detection;
pub use host::{Host, Surface};
pub use ident::{EntropySource, SystemEntropy};
pub use instance::{DataRecord, Instance};
pub use kind::ComponentKind;
pub use lifecycle::{Component, Element, HookResult};
pub use memory::{MemoryHost, MemorySurface};
pub use options::{Defaults, OptionMap, Options};
pub use registry::{Callback, SubscriptionRegistry};
