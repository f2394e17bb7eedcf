//! Capability node contract
//!
//! Every structure in the runtime answers the same [`Node`] contract: leaves,
//! composites, wrappers, dispatch handlers and served flyweights. Structures
//! that recurse into other nodes expose them through [`Node::links`] so that
//! construction-time checks can walk the graph without knowing concrete types.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Polymorphic capability node
///
/// `operation` must be deterministic given the node's current state and the
/// input. Nodes never store per-call input.
pub trait Node<In = (), Out = String>: Send + Sync + Debug {
    /// Produce an outcome for `input`
    fn operation(&self, input: &In) -> Out;

    /// Nodes this node recurses into when `operation` runs
    ///
    /// Composites return their children, wrappers their inner node. Leaves
    /// keep the default.
    fn links(&self) -> Vec<NodeRef<In, Out>> {
        Vec::new()
    }

    /// Short name used in log records and diagnostics
    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

/// Shared handle to a capability node
///
/// Keeping a clone of the handle is how a caller opts into shared ownership;
/// handing over the only clone makes the container the exclusive owner.
pub type NodeRef<In = (), Out = String> = Arc<dyn Node<In, Out>>;

/// Thin address of a node, used for identity comparisons
#[inline]
#[must_use]
pub fn node_addr<In, Out>(node: &NodeRef<In, Out>) -> *const () {
    Arc::as_ptr(node).cast::<()>()
}

/// Reference identity of two handles
///
/// Compares data addresses only; two handles to equal-but-distinct nodes are
/// never the same node.
#[inline]
#[must_use]
pub fn same_node<In, Out>(a: &NodeRef<In, Out>, b: &NodeRef<In, Out>) -> bool {
    std::ptr::eq(node_addr(a), node_addr(b))
}

/// Whether `target` is `from` itself or reachable from it through [`Node::links`]
#[must_use]
pub fn reaches<In, Out>(from: &NodeRef<In, Out>, target: *const ()) -> bool {
    let mut stack = vec![Arc::clone(from)];
    let mut seen: HashSet<*const ()> = HashSet::new();

    while let Some(node) = stack.pop() {
        let addr = node_addr(&node);
        if std::ptr::eq(addr, target) {
            return true;
        }
        if seen.insert(addr) {
            stack.extend(node.links());
        }
    }

    false
}

/// Node returning a fixed outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf<Out = String> {
    name: String,
    outcome: Out,
}

impl Leaf<String> {
    /// Text leaf answering `Leaf: <name>`
    #[inline]
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        let outcome = format!("Leaf: {name}");
        Self { name, outcome }
    }
}

impl<Out> Leaf<Out> {
    /// Leaf with an explicit outcome
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, outcome: Out) -> Self {
        Self {
            name: name.into(),
            outcome,
        }
    }

    /// Leaf name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<In, Out> Node<In, Out> for Leaf<Out>
where
    Out: Clone + Send + Sync + Debug,
{
    fn operation(&self, _input: &In) -> Out {
        self.outcome.clone()
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Node backed by a closure over the input
pub struct FnNode<F> {
    name: String,
    f: F,
}

impl<F> FnNode<F> {
    /// Wrap `f` as a node
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Debug for FnNode<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnNode").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<In, Out, F> Node<In, Out> for FnNode<F>
where
    F: Fn(&In) -> Out + Send + Sync,
{
    fn operation(&self, input: &In) -> Out {
        (self.f)(input)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}
