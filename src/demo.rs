//! Demo components and scenarios run by the `elemental` binary
//!
//! Each scenario builds a [`MemoryHost`], drives one or more elements through
//! their entry points, and returns every published event in order.

use crate::config::ElementalConfig;
use async_trait::async_trait;
use elemental_component::{Component, Element, HookResult, Instance, MemoryHost, Surface};
use elemental_core::{AttributeChange, Error, Event, Payload};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};

pub const COUNTER: &str = "x-counter";
pub const BROKEN: &str = "x-broken";

/// Counter rendered from its `count` attribute.
pub struct Counter;

#[async_trait]
impl Component for Counter {
    fn observed_attributes(&self) -> Option<&[&'static str]> {
        Some(&["count"])
    }

    async fn props(&self, instance: &Instance, _input: &Payload) -> HookResult {
        let count = instance
            .option("count")
            .or_else(|| instance.option("start"))
            .unwrap_or(json!(0));
        Ok(Some(json!({ "count": count })))
    }

    async fn elements(
        &self,
        _instance: &Instance,
        surface: &Arc<dyn Surface>,
        _input: &Payload,
    ) -> HookResult {
        surface.set_style(":host { display: inline-block; font-variant-numeric: tabular-nums }");
        Ok(None)
    }

    async fn render(&self, instance: &Instance, input: &Payload) -> HookResult {
        let count = input.get("count").cloned().unwrap_or(json!(0));
        if let Some(surface) = instance.surface() {
            surface.set_content(&format!("<span>{count}</span>"));
        }
        Ok(None)
    }

    async fn attribute_changed(&self, instance: &Instance, change: &AttributeChange) -> HookResult {
        let raw = change.new_value.as_deref().unwrap_or("0");
        let count: i64 = raw
            .parse()
            .map_err(|_| Error::custom(format!("count is not a number: {raw}")))?;
        instance.set_option("count", json!(count));
        if let Some(surface) = instance.surface() {
            surface.set_content(&format!("<span>{count}</span>"));
        }
        Ok(Some(json!({ "count": count })))
    }
}

/// Fails during props so the mount aborts.
pub struct Broken;

#[async_trait]
impl Component for Broken {
    async fn props(&self, _instance: &Instance, _input: &Payload) -> HookResult {
        Err(Error::custom("required option `source` is missing"))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Scenario {
    /// Mount one counter
    Mount,
    /// Mount a counter, duplicate its node, mount the copy
    Clone,
    /// Mount a component whose props stage fails
    Fail,
    /// Mount a counter, then write `count` three times (the last one repeats
    /// the current value)
    Attributes,
}

/// One published event as printed by the binary.
#[derive(Clone, Debug, Serialize)]
pub struct EventLine {
    /// Label of the element that subscribed. A clone inherits its
    /// original's subscriptions, so its events arrive under that label.
    pub listener: String,
    pub event: Event,
    pub data: Value,
}

type Journal = Arc<Mutex<Vec<EventLine>>>;

fn record(journal: &Journal, label: &str, instance: &Instance) {
    for event in Event::ALL {
        let journal = Arc::clone(journal);
        let label = label.to_string();
        instance.subscribe(event, move |payload| {
            journal
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(EventLine {
                    listener: label.clone(),
                    event,
                    data: payload.data().clone(),
                });
            Ok(())
        });
    }
}

/// Run `scenario` and return the journal of published events.
pub async fn run(scenario: Scenario, config: &ElementalConfig) -> anyhow::Result<Vec<EventLine>> {
    let host = MemoryHost::new();
    let journal: Journal = Arc::default();

    match scenario {
        Scenario::Mount => {
            let el = counter(&host, config, &journal, "a")?;
            host.mount(&el).await;
        }
        Scenario::Clone => {
            let kind = config.kind(COUNTER);
            let original = host.element(&kind, host.create_node(COUNTER), Counter)?;
            record(&journal, "original", &original);
            host.mount(&original).await;

            let node = host
                .clone_node(original.node())
                .ok_or_else(|| anyhow::anyhow!("original node vanished"))?;
            let copy: Element<Counter> = host.element(&kind, node, Counter)?;
            host.mount(&copy).await;
            tracing::info!(
                original = %original.identity(),
                copy = %copy.identity(),
                cloned_from = ?copy.cloned_from(),
                "clone scenario finished"
            );
        }
        Scenario::Fail => {
            let kind = config.kind(BROKEN);
            let el = host.element(&kind, host.create_node(BROKEN), Broken)?;
            record(&journal, "broken", &el);
            host.mount(&el).await;
            tracing::info!(state = %el.state(), "fail scenario finished");
        }
        Scenario::Attributes => {
            let el = counter(&host, config, &journal, "a")?;
            host.mount(&el).await;
            host.mutate_attribute(&el, "count", Some("1")).await?;
            host.mutate_attribute(&el, "count", Some("2")).await?;
            host.mutate_attribute(&el, "count", Some("2")).await?;
            host.tick().await;
        }
    }

    let lines = journal
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Ok(lines)
}

fn counter(
    host: &Arc<MemoryHost>,
    config: &ElementalConfig,
    journal: &Journal,
    label: &str,
) -> anyhow::Result<Element<Counter>> {
    let kind = config.kind(COUNTER);
    let el = host.element(&kind, host.create_node(COUNTER), Counter)?;
    record(journal, label, &el);
    Ok(el)
}
