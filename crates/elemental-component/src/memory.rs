//! In-process host: a flat tree of attribute-carrying nodes
//!
//! Owns tree membership for the elements it hosts and drives their entry
//! points through [`MemoryHost::mount`], [`MemoryHost::unmount`],
//! [`MemoryHost::move_to`], and [`MemoryHost::mutate_attribute`]. Deferred
//! work is queued and runs only when the owner calls [`MemoryHost::tick`],
//! so it can never overtake the code that mutated the element, whatever
//! runtime drives the host.

use crate::host::{Host, Surface};
use crate::ident::{EntropySource, SystemEntropy};
use crate::instance::Instance;
use crate::kind::ComponentKind;
use crate::lifecycle::{Component, Element};
use dashmap::DashMap;
use elemental_core::{DiagnosticRecord, Error, NodeId, Result};
use futures::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemorySurface {
    node: NodeId,
    style: Mutex<String>,
    content: Mutex<String>,
}

impl MemorySurface {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            ..Self::default()
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Surface for MemorySurface {
    fn set_style(&self, css: &str) {
        *self.style.lock().unwrap_or_else(PoisonError::into_inner) = css.to_string();
    }

    fn set_content(&self, content: &str) {
        *self.content.lock().unwrap_or_else(PoisonError::into_inner) = content.to_string();
    }

    fn style(&self) -> String {
        self.style.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn content(&self) -> String {
        self.content.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[derive(Default)]
struct Node {
    tag: String,
    attributes: HashMap<String, String>,
    live: bool,
    instance: Option<Weak<Instance>>,
    surfaces: usize,
}

pub struct MemoryHost {
    nodes: DashMap<NodeId, Node>,
    next_node: AtomicU64,
    entropy: Box<dyn EntropySource>,
    diagnostics: Mutex<Vec<DiagnosticRecord>>,
    deferred: Mutex<VecDeque<BoxFuture<'static, ()>>>,
}

impl MemoryHost {
    pub fn new() -> Arc<Self> {
        Self::with_entropy(SystemEntropy::new())
    }

    pub fn with_entropy(entropy: impl EntropySource + 'static) -> Arc<Self> {
        Arc::new(Self {
            nodes: DashMap::new(),
            next_node: AtomicU64::new(1),
            entropy: Box::new(entropy),
            diagnostics: Mutex::new(Vec::new()),
            deferred: Mutex::new(VecDeque::new()),
        })
    }

    // -- tree ----------------------------------------------------------------

    pub fn create_node(&self, tag: &str) -> NodeId {
        let id = NodeId(self.next_node.fetch_add(1, Ordering::Relaxed));
        self.nodes.insert(
            id,
            Node {
                tag: tag.to_string(),
                ..Node::default()
            },
        );
        id
    }

    /// Duplicate a node's tag and attributes into a new, detached node. The
    /// copy has no instance until one is created for it.
    pub fn clone_node(&self, node: NodeId) -> Option<NodeId> {
        let (tag, attributes) = {
            let source = self.nodes.get(&node)?;
            (source.tag.clone(), source.attributes.clone())
        };
        let id = self.create_node(&tag);
        if let Some(mut copy) = self.nodes.get_mut(&id) {
            copy.attributes = attributes;
        }
        Some(id)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.nodes.get(&node).map(|n| n.tag.clone())
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.live)
    }

    /// Number of surfaces ever created for `node`.
    pub fn surfaces_created(&self, node: NodeId) -> usize {
        self.nodes.get(&node).map_or(0, |n| n.surfaces)
    }

    pub fn diagnostics(&self) -> Vec<DiagnosticRecord> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // -- scheduling ----------------------------------------------------------

    /// Deferred tasks waiting for the next [`tick`](Self::tick).
    pub fn pending(&self) -> usize {
        self.deferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Run every task queued before this call, oldest first, and return how
    /// many ran. Tasks deferred while the batch runs wait for the next tick.
    pub async fn tick(&self) -> usize {
        let batch = {
            let mut queue = self.deferred.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *queue)
        };
        let ran = batch.len();
        for task in batch {
            task.await;
        }
        if ran > 0 {
            debug!(ran, "deferred tasks ran");
        }
        ran
    }

    fn set_live(&self, node: NodeId, live: bool) {
        if let Some(mut n) = self.nodes.get_mut(&node) {
            n.live = live;
        }
    }

    // -- element lifecycle ---------------------------------------------------

    /// Instantiate `component` on `node` and register its instance.
    pub fn element<C: Component>(
        self: &Arc<Self>,
        kind: &Arc<ComponentKind>,
        node: NodeId,
        component: C,
    ) -> Result<Element<C>> {
        let host: Arc<dyn Host> = Arc::clone(self) as Arc<dyn Host>;
        let element = Element::new(Arc::clone(kind), host, node, component)?;
        if let Some(mut n) = self.nodes.get_mut(&node) {
            n.instance = Some(Arc::downgrade(element.instance()));
        }
        Ok(element)
    }

    /// Attach `element`'s node to the tree and connect it.
    pub async fn mount<C: Component>(&self, element: &Element<C>) {
        self.set_live(element.node(), true);
        element.connect().await;
    }

    /// Detach `element`'s node and disconnect it.
    pub async fn unmount<C: Component>(&self, element: &Element<C>) -> Result<()> {
        self.set_live(element.node(), false);
        element.disconnect().await
    }

    /// Move `element` into this host's tree from elsewhere.
    pub async fn move_to<C: Component>(&self, element: &Element<C>) -> Result<()> {
        self.set_live(element.node(), true);
        element.adopt().await
    }

    /// Write an attribute and signal the mutation to `element`.
    pub async fn mutate_attribute<C: Component>(
        &self,
        element: &Element<C>,
        name: &str,
        value: Option<&str>,
    ) -> Result<()> {
        let node = element.node();
        let old = {
            let Some(mut n) = self.nodes.get_mut(&node) else {
                return Ok(());
            };
            match value {
                Some(value) => n.attributes.insert(name.to_string(), value.to_string()),
                None => n.attributes.remove(name),
            }
        };
        element.attribute_changed(name, old.as_deref(), value).await
    }
}

impl Host for MemoryHost {
    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.get(&node)?.attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(mut n) = self.nodes.get_mut(&node) {
            n.attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn find_live(
        &self,
        kind: &str,
        attribute: &str,
        value: &str,
        exclude: NodeId,
    ) -> Option<Arc<Instance>> {
        let candidates: Vec<Weak<Instance>> = self
            .nodes
            .iter()
            .filter(|entry| *entry.key() != exclude && entry.live)
            .filter(|entry| entry.attributes.get(attribute).map(String::as_str) == Some(value))
            .filter_map(|entry| entry.instance.clone())
            .collect();
        candidates
            .iter()
            .filter_map(Weak::upgrade)
            .find(|instance| instance.kind().name() == kind)
    }

    fn create_surface(&self, node: NodeId) -> Result<Arc<dyn Surface>> {
        let Some(mut n) = self.nodes.get_mut(&node) else {
            return Err(Error::Surface(format!("node {node} is not in the tree")));
        };
        n.surfaces += 1;
        drop(n);
        debug!(%node, "surface created");
        Ok(Arc::new(MemorySurface::new(node)))
    }

    fn entropy(&self) -> &dyn EntropySource {
        self.entropy.as_ref()
    }

    fn defer(&self, task: BoxFuture<'static, ()>) {
        self.deferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(task);
    }

    fn diagnostic(&self, record: &DiagnosticRecord) {
        debug!(
            target: "elemental::diagnostics",
            kind = %record.kind,
            identity = %record.identity,
            event = %record.event,
            "publish"
        );
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_node_copies_attributes_only() {
        let host = MemoryHost::new();
        let node = host.create_node("x-widget");
        host.set_attribute(node, "data-element-id", "abc");
        host.set_live(node, true);

        let copy = host.clone_node(node).unwrap();

        assert_ne!(copy, node);
        assert_eq!(host.tag(copy).as_deref(), Some("x-widget"));
        assert_eq!(host.attribute(copy, "data-element-id").as_deref(), Some("abc"));
        assert!(!host.is_live(copy));
    }

    #[test]
    fn clone_of_unknown_node_is_none() {
        let host = MemoryHost::new();
        assert!(host.clone_node(NodeId(999)).is_none());
    }

    #[test]
    fn surfaces_are_isolated() {
        let host = MemoryHost::new();
        let a = host.create_surface(host.create_node("x-a")).unwrap();
        let b = host.create_surface(host.create_node("x-b")).unwrap();
        a.set_style(":host { color: red }");
        a.set_content("hello");
        assert_eq!(a.content(), "hello");
        assert_eq!(b.content(), "");
        assert_eq!(b.style(), "");
    }

    #[test]
    fn surface_for_unknown_node_is_an_error() {
        let host = MemoryHost::new();
        let err = host.create_surface(NodeId(999)).unwrap_err();
        assert!(matches!(err, Error::Surface(_)));
        assert_eq!(host.surfaces_created(NodeId(999)), 0);
    }

    #[test]
    fn deferred_tasks_wait_for_tick_without_a_runtime() {
        let host = MemoryHost::new();
        let ran = Arc::new(Mutex::new(Vec::new()));
        for n in 0..3 {
            let ran = Arc::clone(&ran);
            host.defer(Box::pin(async move {
                ran.lock().unwrap().push(n);
            }));
        }

        assert_eq!(host.pending(), 3);
        assert!(ran.lock().unwrap().is_empty());

        assert_eq!(futures::executor::block_on(host.tick()), 3);
        assert_eq!(*ran.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(host.pending(), 0);
        assert_eq!(futures::executor::block_on(host.tick()), 0);
    }
}
