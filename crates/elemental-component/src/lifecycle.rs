//! Lifecycle orchestration
//!
//! ```text
//! connect:  connecting -> props.set -> elements.set -> rendered -> [clone check] -> connected
//! disconnect:                                                        disconnected
//! adopt:                                                             adopted
//! attribute_changed:  attribute.changed  ~~(deferred)~~>  changed
//! ```
//!
//! Each hook runs inside a stage wrapper: on success its output (or the input
//! when it returns nothing) is published under the stage's event; on failure
//! a warning is logged and the error is returned to the caller.
//!
//! A failed mount stops at the failing stage. The failure is reported (warning
//! plus `error` event) but `connect` itself does not return it, so the
//! instance stays in whatever state it reached.

use crate::clone;
use crate::host::{Host, Surface};
use crate::instance::Instance;
use crate::kind::ComponentKind;
use async_trait::async_trait;
use elemental_core::{
    Action, AttributeChange, Event, Hook, LifecycleState, NodeId, Payload, Result,
};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a hook hands to the next stage. `None` passes the input through.
pub type HookResult = Result<Option<Value>>;

/// Extension points of a component kind. Every hook has a default, so a
/// concrete component overrides only what it needs.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Attributes whose mutations reach `attribute_changed`. `None` observes
    /// every attribute.
    fn observed_attributes(&self) -> Option<&[&'static str]> {
        None
    }

    async fn props(&self, _instance: &Instance, _input: &Payload) -> HookResult {
        Ok(None)
    }

    /// Runs after the instance's surface exists.
    async fn elements(
        &self,
        _instance: &Instance,
        _surface: &Arc<dyn Surface>,
        _input: &Payload,
    ) -> HookResult {
        Ok(None)
    }

    async fn render(&self, _instance: &Instance, _input: &Payload) -> HookResult {
        Ok(None)
    }

    async fn connected(&self, _instance: &Instance, _input: &Payload) -> HookResult {
        Ok(None)
    }

    async fn disconnected(&self, _instance: &Instance, _input: &Payload) -> HookResult {
        Ok(None)
    }

    async fn adopted(&self, _instance: &Instance, _input: &Payload) -> HookResult {
        Ok(None)
    }

    async fn attribute_changed(
        &self,
        _instance: &Instance,
        _change: &AttributeChange,
    ) -> HookResult {
        Ok(None)
    }

    /// Called when `instance` turns out to be a clone of `original`. Runs
    /// synchronously so the hand-off is atomic to observers. The default
    /// moves the original's subscriptions and options onto the clone.
    fn cloned(&self, instance: &Instance, original: &Instance) -> Result<()> {
        instance.take_over(original);
        Ok(())
    }
}

/// A component bound to its instance state.
pub struct Element<C: Component> {
    instance: Arc<Instance>,
    component: C,
}

impl<C: Component> Element<C> {
    pub fn new(
        kind: Arc<ComponentKind>,
        host: Arc<dyn Host>,
        node: NodeId,
        component: C,
    ) -> Result<Self> {
        let instance = Instance::new(kind, host, node)?;
        Ok(Self {
            instance: Arc::new(instance),
            component,
        })
    }

    pub fn instance(&self) -> &Arc<Instance> {
        &self.instance
    }

    pub fn component(&self) -> &C {
        &self.component
    }

    // -- entry points --------------------------------------------------------

    /// Host attach signal. Never fails from the caller's point of view; a
    /// failing stage is reported and leaves the instance partially mounted.
    pub async fn connect(&self) {
        let input = Payload::empty();
        if let Err(error) = self.mount(&input).await {
            self.instance.report_failure(Action::Connect, &error, &input);
        }
    }

    /// Host detach signal.
    pub async fn disconnect(&self) -> Result<()> {
        self.instance.set_state(LifecycleState::Disconnected);
        self.run_entry(Action::Disconnect, Hook::Disconnected, Payload::empty())
            .await
            .map(drop)
    }

    /// Host move-between-trees signal.
    pub async fn adopt(&self) -> Result<()> {
        self.instance.set_state(LifecycleState::Adopted);
        self.run_entry(Action::Adopt, Hook::Adopted, Payload::empty())
            .await
            .map(drop)
    }

    /// Host attribute-mutation signal. After the hook settles and
    /// `attribute.changed` is published, a separate `changed` publish is
    /// handed to [`Host::defer`]. Every mutation gets its own, including one
    /// that writes the value already there.
    pub async fn attribute_changed(
        &self,
        name: &str,
        old_value: Option<&str>,
        new_value: Option<&str>,
    ) -> Result<()> {
        if !self.observes(name) {
            return Ok(());
        }
        let change = AttributeChange::new(name, old_value, new_value);
        let input = Payload::new(serde_json::to_value(&change)?);
        let output = self
            .run_entry(Action::AttributeChange, Hook::AttributeChanged, input)
            .await?;
        self.defer_changed(output);
        Ok(())
    }

    pub fn observes(&self, name: &str) -> bool {
        match self.component.observed_attributes() {
            Some(observed) => observed.contains(&name),
            None => true,
        }
    }

    // -- orchestration -------------------------------------------------------

    async fn mount(&self, input: &Payload) -> Result<Payload> {
        self.instance.set_state(LifecycleState::Connecting);
        self.instance.publish(Event::Connecting, input)?;

        let mut payload = input.clone();
        for hook in Hook::MOUNT {
            self.instance.set_state(mount_state(hook));
            payload = self.run_stage(hook, payload).await?;
        }

        self.instance.set_state(LifecycleState::Connected);
        let connected = self.run_stage(Hook::Connected, payload).await?;
        debug!(
            kind = self.instance.kind().name(),
            identity = %self.instance.identity(),
            "connected"
        );
        Ok(connected)
    }

    async fn run_entry(&self, action: Action, hook: Hook, input: Payload) -> Result<Payload> {
        match self.run_stage(hook, input.clone()).await {
            Ok(output) => Ok(output),
            Err(error) => {
                self.instance.report_failure(action, &error, &input);
                Err(error)
            }
        }
    }

    /// Invoke `hook`, then publish its event with the derived payload.
    async fn run_stage(&self, hook: Hook, input: Payload) -> Result<Payload> {
        let outcome = match self.invoke(hook, &input).await {
            Ok(output) => {
                let payload = Payload::derive(&input, output);
                self.instance
                    .publish(hook.event(), &payload)
                    .map(|()| payload)
            }
            Err(error) => Err(error),
        };

        outcome.map_err(|error| {
            let error = error.in_hook(hook.as_str());
            warn!(
                kind = self.instance.kind().name(),
                identity = %self.instance.identity(),
                hook = hook.as_str(),
                error = %error,
                input = %input.data(),
                "hook failed"
            );
            error
        })
    }

    async fn invoke(&self, hook: Hook, input: &Payload) -> Result<Option<Value>> {
        let instance = self.instance.as_ref();
        match hook {
            Hook::Props => self.component.props(instance, input).await,
            Hook::Elements => {
                let surface = instance.ensure_surface()?;
                self.component.elements(instance, &surface, input).await
            }
            Hook::Render => self.component.render(instance, input).await,
            Hook::Connected => {
                let detection = clone::detect(instance, &self.component)?;
                debug!(identity = %instance.identity(), ?detection, "identity checked");
                self.component.connected(instance, input).await
            }
            Hook::Disconnected => self.component.disconnected(instance, input).await,
            Hook::Adopted => self.component.adopted(instance, input).await,
            Hook::AttributeChanged => {
                let change: AttributeChange = serde_json::from_value(input.data().clone())?;
                self.component.attribute_changed(instance, &change).await
            }
        }
    }

    fn defer_changed(&self, payload: Payload) {
        let instance = Arc::clone(&self.instance);
        self.instance.host().defer(Box::pin(async move {
            if let Err(error) = instance.publish(Event::Changed, &payload) {
                instance.report_failure(Action::AttributeChange, &error, &payload);
            }
        }));
    }
}

impl<C: Component> Deref for Element<C> {
    type Target = Instance;

    fn deref(&self) -> &Instance {
        &self.instance
    }
}

fn mount_state(hook: Hook) -> LifecycleState {
    match hook {
        Hook::Props => LifecycleState::PropsInitializing,
        Hook::Elements => LifecycleState::ElementsInitializing,
        Hook::Render => LifecycleState::Rendering,
        _ => LifecycleState::Connected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_states_follow_stage_order() {
        let states: Vec<_> = Hook::MOUNT.into_iter().map(mount_state).collect();
        assert_eq!(
            states,
            vec![
                LifecycleState::PropsInitializing,
                LifecycleState::ElementsInitializing,
                LifecycleState::Rendering,
            ]
        );
    }
}
