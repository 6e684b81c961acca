//! Clone detection
//!
//! When the host duplicates a node, the copy carries the original's identity
//! attribute before the new instance ever runs. On connect, an instance whose
//! declared identity belongs to another live instance of the same kind takes
//! over the canonical identity slot and inherits the original's data record.
//!
//! The "no live owner" branch assumes at most one live instance per declared
//! identity. Two copies that both connect before either finishes this check
//! can each conclude they are not clones.

use crate::instance::Instance;
use crate::lifecycle::Component;
use elemental_core::{Event, InstanceId, Payload, Result};
use serde_json::json;
use tracing::info;

/// Outcome of the check run at the start of the connected stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Detection {
    /// No identity was persisted yet; this instance's identity now is.
    FirstMount,
    /// The persisted identity is already this instance's.
    Persisted,
    /// The persisted identity belonged to a live instance; it was superseded.
    Cloned { original: InstanceId },
    /// The persisted identity has no live owner; left as is.
    Stale { declared: String },
}

pub(crate) fn detect<C: Component>(instance: &Instance, component: &C) -> Result<Detection> {
    let kind = instance.kind();
    let host = instance.host();
    let node = instance.node();
    let own = instance.identity();

    let declared = match instance.declared_identity() {
        None => {
            host.set_attribute(node, kind.identity_attribute(), own.as_str());
            return Ok(Detection::FirstMount);
        }
        Some(declared) if own == declared.as_str() => return Ok(Detection::Persisted),
        Some(declared) => declared,
    };

    let Some(original) = host.find_live(kind.name(), kind.identity_attribute(), &declared, node)
    else {
        return Ok(Detection::Stale { declared });
    };

    info!(
        kind = kind.name(),
        identity = %own,
        original = %original.identity(),
        "clone detected"
    );

    instance.mark_cloned_from(InstanceId::new(declared.as_str()));
    host.set_attribute(node, kind.clone_marker_attribute(), &declared);
    host.set_attribute(node, kind.identity_attribute(), own.as_str());

    component
        .cloned(instance, &original)
        .map_err(|error| error.in_hook("cloned"))?;

    let payload = Payload::new(json!({
        "kind": original.kind().name(),
        "identity": original.identity().as_str(),
        "node": original.node(),
    }));
    instance.publish(Event::Cloned, &payload)?;

    Ok(Detection::Cloned {
        original: original.identity().clone(),
    })
}
