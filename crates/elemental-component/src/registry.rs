//! Subscription registry - ordered, synchronous callback dispatch
//!
//! Callbacks run in registration order. Duplicates are kept. There is no
//! unsubscribe: subscriptions live as long as the instance's data record.

use elemental_core::{Event, Payload, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type Callback = Arc<dyn Fn(&Payload) -> Result<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct SubscriptionRegistry {
    subscribers: HashMap<Event, Vec<Callback>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event: Event, callback: Callback) {
        self.subscribers.entry(event).or_default().push(callback);
    }

    /// Snapshot of the callbacks for `event`. Dispatching over a snapshot
    /// lets callbacks subscribe without disturbing the running dispatch.
    pub fn subscribers(&self, event: Event) -> Vec<Callback> {
        self.subscribers.get(&event).cloned().unwrap_or_default()
    }

    pub fn count(&self, event: Event) -> usize {
        self.subscribers.get(&event).map_or(0, Vec::len)
    }

    /// Per-event subscriber counts, in wire order.
    pub fn counts(&self) -> Vec<(Event, usize)> {
        Event::ALL
            .into_iter()
            .map(|event| (event, self.count(event)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    pub fn publish(&self, event: Event, payload: &Payload) -> Result<()> {
        dispatch(&self.subscribers(event), payload)
    }
}

/// Invoke `callbacks` in order. The first failure stops the dispatch and is
/// returned to the caller untouched.
pub fn dispatch(callbacks: &[Callback], payload: &Payload) -> Result<()> {
    for callback in callbacks {
        callback(payload)?;
    }
    Ok(())
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.counts()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elemental_core::Error;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Callback {
        let log = Arc::clone(log);
        Arc::new(move |_payload: &Payload| {
            log.lock().unwrap().push(tag.to_string());
            Ok(())
        })
    }

    #[test]
    fn publish_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(Event::Rendered, recorder(&log, "first"));
        registry.subscribe(Event::Rendered, recorder(&log, "second"));
        registry.subscribe(Event::Connected, recorder(&log, "other"));

        registry.publish(Event::Rendered, &Payload::empty()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn duplicates_are_not_collapsed() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let cb = recorder(&log, "dup");
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(Event::Changed, Arc::clone(&cb));
        registry.subscribe(Event::Changed, cb);

        registry.publish(Event::Changed, &Payload::empty()).unwrap();

        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(registry.count(Event::Changed), 2);
    }

    #[test]
    fn failure_propagates_and_stops_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(Event::Error, Arc::new(|_: &Payload| Err(Error::custom("boom"))));
        registry.subscribe(Event::Error, recorder(&log, "after"));

        let err = registry.publish(Event::Error, &Payload::empty()).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn publish_without_subscribers_is_ok() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.publish(Event::Adopted, &Payload::empty()).is_ok());
        assert!(registry.counts().is_empty());
    }

    #[test]
    fn clones_are_independent() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut original = SubscriptionRegistry::new();
        original.subscribe(Event::Cloned, recorder(&log, "a"));
        let mut copy = original.clone();
        copy.subscribe(Event::Cloned, recorder(&log, "b"));

        assert_eq!(original.count(Event::Cloned), 1);
        assert_eq!(copy.count(Event::Cloned), 2);
    }
}
