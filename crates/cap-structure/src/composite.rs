//! Composite aggregation
//!
//! A [`Composite`] owns an ordered list of child nodes and answers
//! `operation` by running every child in insertion order and handing the
//! outcomes to its [`Aggregator`].
//!
//! # Invariants
//! - Insertion order is the aggregation order.
//! - An empty composite yields [`Aggregator::empty`], never an error.
//! - A composite is never its own descendant: [`Composite::add`] rejects any
//!   child from which the composite is reachable.

use crate::error::StructureError;
use cap_core::{reaches, same_node, CompositeConfig, Node, NodeRef};
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::fmt::{self, Debug};

/// Serializes cycle checks against concurrent `add` calls on other composites
static TOPOLOGY: Mutex<()> = parking_lot::const_mutex(());

/// Folds child outcomes into one aggregate
pub trait Aggregator<Out>: Send + Sync + Debug {
    /// Aggregate of a composite with no children
    fn empty(&self) -> Out;

    /// Aggregate of the children's outcomes, in insertion order
    fn combine(&self, parts: Vec<Out>) -> Out;
}

/// Text aggregate: a header line followed by the joined child outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextAggregator {
    header: String,
    separator: String,
}

impl TextAggregator {
    /// Create aggregator with explicit header and separator
    #[inline]
    #[must_use]
    pub fn new(header: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            separator: separator.into(),
        }
    }

    /// Create aggregator from config
    #[inline]
    #[must_use]
    pub fn from_config(config: &CompositeConfig) -> Self {
        Self::new(config.header.clone(), config.separator.clone())
    }
}

impl Default for TextAggregator {
    fn default() -> Self {
        Self::from_config(&CompositeConfig::default())
    }
}

impl Aggregator<String> for TextAggregator {
    fn empty(&self) -> String {
        format!("{}\n", self.header)
    }

    fn combine(&self, parts: Vec<String>) -> String {
        format!("{}\n{}", self.header, parts.join(&self.separator))
    }
}

/// List aggregate: child outcome lists concatenated in order
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAggregator;

impl<T: Send + Sync> Aggregator<Vec<T>> for ListAggregator {
    fn empty(&self) -> Vec<T> {
        Vec::new()
    }

    fn combine(&self, parts: Vec<Vec<T>>) -> Vec<T> {
        parts.into_iter().flatten().collect()
    }
}

/// Ordered tree node aggregating its children
pub struct Composite<In = (), Out = String> {
    name: String,
    children: RwLock<Vec<NodeRef<In, Out>>>,
    aggregator: Box<dyn Aggregator<Out>>,
}

impl<In> Composite<In, String> {
    /// Text composite with the default layout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_aggregator(TextAggregator::default())
    }

    /// Text composite laid out per `config`
    #[inline]
    #[must_use]
    pub fn with_config(config: &CompositeConfig) -> Self {
        Self::with_aggregator(TextAggregator::from_config(config))
    }
}

impl<In> Default for Composite<In, String> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In, Out> Composite<In, Out> {
    /// Composite using a custom aggregator
    #[must_use]
    pub fn with_aggregator(aggregator: impl Aggregator<Out> + 'static) -> Self {
        Self {
            name: "composite".to_string(),
            children: RwLock::new(Vec::new()),
            aggregator: Box::new(aggregator),
        }
    }

    /// Set the name used in logs and errors
    #[inline]
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Composite name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a child
    ///
    /// # Errors
    /// [`StructureError::CycleDetected`] if `child` is this composite or
    /// contains it anywhere below.
    pub fn add(&self, child: NodeRef<In, Out>) -> Result<(), StructureError> {
        let me = (self as *const Self).cast::<()>();
        let _topology = TOPOLOGY.lock();

        if reaches(&child, me) {
            tracing::warn!(
                parent = %self.name,
                child = %child.label(),
                "rejected child that would close a cycle"
            );
            return Err(StructureError::CycleDetected {
                parent: self.name.clone(),
                child: child.label().into_owned(),
            });
        }

        tracing::debug!(parent = %self.name, child = %child.label(), "adding child");
        self.children.write().push(child);
        Ok(())
    }

    /// Remove the first child identical to `child`
    ///
    /// Returns `false` and leaves the children untouched when `child` is absent.
    pub fn remove(&self, child: &NodeRef<In, Out>) -> bool {
        let mut children = self.children.write();
        match children.iter().position(|c| same_node(c, child)) {
            Some(index) => {
                let removed = children.remove(index);
                tracing::debug!(parent = %self.name, child = %removed.label(), index, "removed child");
                true
            }
            None => false,
        }
    }

    /// Snapshot of the children in insertion order
    #[must_use]
    pub fn children(&self) -> Vec<NodeRef<In, Out>> {
        self.children.read().clone()
    }

    /// Whether `child` is a direct child
    #[must_use]
    pub fn contains(&self, child: &NodeRef<In, Out>) -> bool {
        self.children.read().iter().any(|c| same_node(c, child))
    }

    /// Number of direct children
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.read().len()
    }

    /// Whether there are no children
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.read().is_empty()
    }
}

impl<In, Out> Debug for Composite<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("name", &self.name)
            .field("children", &self.children.read().len())
            .field("aggregator", &self.aggregator)
            .finish()
    }
}

impl<In, Out> Node<In, Out> for Composite<In, Out> {
    fn operation(&self, input: &In) -> Out {
        // Snapshot so children never run under our lock.
        let children = self.children();
        if children.is_empty() {
            return self.aggregator.empty();
        }

        tracing::trace!(composite = %self.name, children = children.len(), "aggregating");
        let parts = children.iter().map(|child| child.operation(input)).collect();
        self.aggregator.combine(parts)
    }

    fn links(&self) -> Vec<NodeRef<In, Out>> {
        self.children()
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}
