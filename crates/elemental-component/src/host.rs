//! Host capability set
//!
//! Everything an instance needs from the runtime that owns its tree
//! membership: attribute storage on the represented node, lookup of live
//! instances by attribute, a rendering-surface factory, an entropy source,
//! cooperative deferral, and a diagnostic sink.

use crate::ident::EntropySource;
use crate::instance::Instance;
use elemental_core::{DiagnosticRecord, NodeId, Result};
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Isolated style + content area owned by exactly one instance.
pub trait Surface: Send + Sync + fmt::Debug {
    fn set_style(&self, css: &str);
    fn set_content(&self, content: &str);
    fn style(&self) -> String;
    fn content(&self) -> String;
}

pub trait Host: Send + Sync {
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&self, node: NodeId, name: &str, value: &str);

    /// Find a live instance of `kind`, other than the one on `exclude`, whose
    /// node carries `attribute = value`.
    fn find_live(
        &self,
        kind: &str,
        attribute: &str,
        value: &str,
        exclude: NodeId,
    ) -> Option<Arc<Instance>>;

    fn create_surface(&self, node: NodeId) -> Result<Arc<dyn Surface>>;

    fn entropy(&self) -> &dyn EntropySource;

    /// Queue `task` to run once the entry point that deferred it has
    /// returned to the host. The host owns the task from then on: it runs
    /// each one exactly once, in queue order, and never drops one unrun.
    fn defer(&self, task: BoxFuture<'static, ()>);

    fn diagnostic(&self, record: &DiagnosticRecord) {
        tracing::debug!(
            target: "elemental::diagnostics",
            kind = %record.kind,
            identity = %record.identity,
            cloned_from = ?record.cloned_from,
            event = %record.event,
            payload = %record.payload,
            "publish"
        );
    }
}
