//! Instance state: identity, data record, lifecycle state, surface
//!
//! The data record (subscriptions + options) sits behind one lock so that a
//! clone hand-off replaces it in a single step. No lock is held while
//! callbacks run.

use crate::host::{Host, Surface};
use crate::ident;
use crate::kind::{ComponentKind, DEBUG_OPTION};
use crate::options::{OptionMap, Options};
use crate::registry::{self, Callback, SubscriptionRegistry};
use elemental_core::{
    Action, DiagnosticRecord, Error, Event, InstanceId, LifecycleState, NodeId, Payload, Result,
};
use serde_json::{json, Value};
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace, warn};

/// Subscriptions and options: the logical state that moves on a clone.
#[derive(Clone, Debug, Default)]
pub struct DataRecord {
    pub subscriptions: SubscriptionRegistry,
    pub options: Options,
}

impl DataRecord {
    pub fn new(options: Options) -> Self {
        Self {
            subscriptions: SubscriptionRegistry::new(),
            options,
        }
    }
}

pub struct Instance {
    kind: Arc<ComponentKind>,
    identity: InstanceId,
    node: NodeId,
    host: Arc<dyn Host>,
    cloned_from: Mutex<Option<InstanceId>>,
    state: Mutex<LifecycleState>,
    data: RwLock<DataRecord>,
    surface: OnceLock<Arc<dyn Surface>>,
}

impl Instance {
    /// Construct with a fresh identity. Fails only when the host's entropy
    /// source is unavailable.
    pub fn new(kind: Arc<ComponentKind>, host: Arc<dyn Host>, node: NodeId) -> Result<Self> {
        let identity = ident::generate(host.entropy())?;
        let options = Options::new(kind.defaults().clone());
        debug!(kind = kind.name(), %identity, %node, "instance created");
        Ok(Self {
            kind,
            identity,
            node,
            host,
            cloned_from: Mutex::new(None),
            state: Mutex::new(LifecycleState::Created),
            data: RwLock::new(DataRecord::new(options)),
            surface: OnceLock::new(),
        })
    }

    pub fn identity(&self) -> &InstanceId {
        &self.identity
    }

    pub fn kind(&self) -> &Arc<ComponentKind> {
        &self.kind
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_state(&self, next: LifecycleState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        trace!(identity = %self.identity, from = %*state, to = %next, "state");
        *state = next;
    }

    /// Identity persisted on the represented node, if any.
    pub fn declared_identity(&self) -> Option<String> {
        self.host.attribute(self.node, self.kind.identity_attribute())
    }

    pub fn cloned_from(&self) -> Option<InstanceId> {
        self.cloned_from
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn mark_cloned_from(&self, source: InstanceId) {
        *self.cloned_from.lock().unwrap_or_else(PoisonError::into_inner) = Some(source);
    }

    pub fn surface(&self) -> Option<Arc<dyn Surface>> {
        self.surface.get().cloned()
    }

    /// The rendering surface, created through the host on first use and
    /// never replaced afterwards.
    pub(crate) fn ensure_surface(&self) -> Result<Arc<dyn Surface>> {
        if let Some(surface) = self.surface.get() {
            return Ok(Arc::clone(surface));
        }
        let created = self.host.create_surface(self.node)?;
        Ok(Arc::clone(self.surface.get_or_init(|| created)))
    }

    // -- data record ---------------------------------------------------------

    fn read(&self) -> RwLockReadGuard<'_, DataRecord> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DataRecord> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe<F>(&self, event: Event, callback: F)
    where
        F: Fn(&Payload) -> Result<()> + Send + Sync + 'static,
    {
        self.subscribe_callback(event, Arc::new(callback));
    }

    pub fn subscribe_callback(&self, event: Event, callback: Callback) {
        self.write().subscriptions.subscribe(event, callback);
    }

    pub fn subscriber_count(&self, event: Event) -> usize {
        self.read().subscriptions.count(event)
    }

    pub fn option(&self, key: &str) -> Option<Value> {
        self.read().options.get(key)
    }

    pub fn set_option(&self, key: impl Into<String>, value: Value) {
        self.write().options.set(key, value);
    }

    pub fn merge_options<K, I>(&self, partial: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        self.write().options.merge(partial);
    }

    /// Instance-level option entries, without defaults.
    pub fn local_options(&self) -> OptionMap {
        self.read().options.local().clone()
    }

    /// Deep copy of the data record.
    pub fn data(&self) -> DataRecord {
        self.read().clone()
    }

    /// Replace this instance's data record with a copy of `original`'s.
    /// Afterwards the two records evolve independently.
    pub fn take_over(&self, original: &Instance) {
        let record = original.data();
        *self.write() = record;
    }

    // -- publishing ----------------------------------------------------------

    /// Dispatch `event` to the current subscribers. Subscriber failures are
    /// returned untouched; the orchestrator decides what they mean.
    pub(crate) fn publish(&self, event: Event, payload: &Payload) -> Result<()> {
        let (callbacks, debug) = {
            let record = self.read();
            (
                record.subscriptions.subscribers(event),
                record.options.is_enabled(DEBUG_OPTION),
            )
        };
        if debug {
            let cloned_from = self.cloned_from();
            self.host.diagnostic(&DiagnosticRecord::new(
                self.kind.name(),
                &self.identity,
                cloned_from.as_ref(),
                event,
                payload,
            ));
        }
        registry::dispatch(&callbacks, payload)
    }

    /// Surface a failed entry point: structured warning plus an `error`
    /// publish carrying the action, the error, and the originating data.
    pub(crate) fn report_failure(&self, action: Action, error: &Error, data: &Payload) {
        warn!(
            kind = self.kind.name(),
            identity = %self.identity,
            action = action.as_str(),
            error = %error,
            data = %data.data(),
            "lifecycle action failed"
        );
        let payload = Payload::new(json!({
            "action": action.as_str(),
            "error": error.to_string(),
            "data": data.data(),
        }));
        if let Err(nested) = self.publish(Event::Error, &payload) {
            warn!(
                identity = %self.identity,
                error = %nested,
                "error subscriber failed"
            );
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("kind", &self.kind.name())
            .field("identity", &self.identity)
            .field("node", &self.node)
            .field("state", &self.state())
            .field("cloned_from", &self.cloned_from())
            .finish_non_exhaustive()
    }
}
