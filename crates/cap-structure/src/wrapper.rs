//! Transparent wrapping
//!
//! A [`Wrapper`] holds exactly one inner node and a [`Layer`]. Running it
//! applies the layer's pre-transform to the input, delegates to the inner
//! node, then applies the post-transform to the outcome. Nesting composes
//! explicitly:
//!
//! ```text
//! W1(W2(C)).operation(x) == W1.after(W2.after(C.operation(W2.before(W1.before(x)))))
//! ```

use cap_core::{Node, NodeRef};
use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Behaviour added around a delegated call
pub trait Layer<In, Out>: Send + Sync + Debug {
    /// Replacement input for the inner node; `None` passes the input through
    fn before(&self, _input: &In) -> Option<In> {
        None
    }

    /// Transform the inner node's outcome
    fn after(&self, output: Out) -> Out {
        output
    }

    /// Name used in log records
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

/// Pure delegation
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl<In, Out> Layer<In, Out> for Passthrough {}

/// Prefix-tagging post-transform: `"{tag}: {inner} {trailer}"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLayer {
    tag: String,
    trailer: String,
}

impl TagLayer {
    /// Tag with a trailing remark
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>, trailer: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            trailer: trailer.into(),
        }
    }

    /// Tag only
    #[inline]
    #[must_use]
    pub fn prefix(tag: impl Into<String>) -> Self {
        Self::new(tag, String::new())
    }
}

impl<In> Layer<In, String> for TagLayer {
    fn after(&self, output: String) -> String {
        if self.trailer.is_empty() {
            format!("{}: {output}", self.tag)
        } else {
            format!("{}: {output} {}", self.tag, self.trailer)
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.tag)
    }
}

type BeforeFn<In> = Box<dyn Fn(&In) -> In + Send + Sync>;
type AfterFn<Out> = Box<dyn Fn(Out) -> Out + Send + Sync>;

/// Layer assembled from closures
pub struct FnLayer<In, Out> {
    name: String,
    before: Option<BeforeFn<In>>,
    after: Option<AfterFn<Out>>,
}

impl<In, Out> FnLayer<In, Out> {
    /// Layer with neither transform
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before: None,
            after: None,
        }
    }

    /// With a pre-transform on the input
    #[must_use]
    pub fn before(mut self, f: impl Fn(&In) -> In + Send + Sync + 'static) -> Self {
        self.before = Some(Box::new(f));
        self
    }

    /// With a post-transform on the outcome
    #[must_use]
    pub fn after(mut self, f: impl Fn(Out) -> Out + Send + Sync + 'static) -> Self {
        self.after = Some(Box::new(f));
        self
    }
}

impl<In, Out> Debug for FnLayer<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLayer")
            .field("name", &self.name)
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl<In, Out> Layer<In, Out> for FnLayer<In, Out> {
    fn before(&self, input: &In) -> Option<In> {
        self.before.as_ref().map(|f| f(input))
    }

    fn after(&self, output: Out) -> Out {
        match &self.after {
            Some(f) => f(output),
            None => output,
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Node wrapping exactly one inner node
pub struct Wrapper<In = (), Out = String> {
    inner: NodeRef<In, Out>,
    layer: Box<dyn Layer<In, Out>>,
}

impl<In, Out> Wrapper<In, Out> {
    /// Wrap `inner` with `layer`
    #[must_use]
    pub fn new(inner: NodeRef<In, Out>, layer: impl Layer<In, Out> + 'static) -> Self {
        Self {
            inner,
            layer: Box::new(layer),
        }
    }

    /// Wrapper that delegates unchanged
    #[must_use]
    pub fn passthrough(inner: NodeRef<In, Out>) -> Self {
        Self::new(inner, Passthrough)
    }

    /// Wrapped node
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &NodeRef<In, Out> {
        &self.inner
    }
}

impl<In, Out> Debug for Wrapper<In, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapper")
            .field("layer", &self.layer)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<In, Out> Node<In, Out> for Wrapper<In, Out> {
    fn operation(&self, input: &In) -> Out {
        let output = match self.layer.before(input) {
            Some(rewritten) => self.inner.operation(&rewritten),
            None => self.inner.operation(input),
        };
        self.layer.after(output)
    }

    fn links(&self) -> Vec<NodeRef<In, Out>> {
        vec![Arc::clone(&self.inner)]
    }

    fn label(&self) -> Cow<'_, str> {
        self.layer.name()
    }
}

/// Builder for nested wrappers
///
/// The first [`wrap`](WrapStack::wrap) is innermost, the last outermost.
#[derive(Debug)]
pub struct WrapStack<In = (), Out = String> {
    node: NodeRef<In, Out>,
    depth: usize,
}

impl<In: 'static, Out: 'static> WrapStack<In, Out> {
    /// Start from the core node
    #[inline]
    #[must_use]
    pub fn new(core: NodeRef<In, Out>) -> Self {
        Self {
            node: core,
            depth: 0,
        }
    }

    /// Wrap everything built so far in `layer`
    #[must_use]
    pub fn wrap(self, layer: impl Layer<In, Out> + 'static) -> Self {
        tracing::trace!(layer = %layer.name(), depth = self.depth + 1, "wrapping");
        Self {
            node: Arc::new(Wrapper::new(self.node, layer)),
            depth: self.depth + 1,
        }
    }

    /// Number of layers applied
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Finished node
    #[inline]
    #[must_use]
    pub fn build(self) -> NodeRef<In, Out> {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cap_core::{FnNode, Leaf};
    use pretty_assertions::assert_eq;

    fn core() -> NodeRef {
        Arc::new(Leaf::new("core", "ConcreteComponent operation".to_string()))
    }

    #[test]
    fn passthrough_delegates_unchanged() {
        let wrapper = Wrapper::passthrough(core());
        assert_eq!(wrapper.operation(&()), "ConcreteComponent operation");
    }

    #[test]
    fn tag_layer_prefixes_and_trails() {
        let wrapper = Wrapper::new(core(), TagLayer::new("A", "with additional behavior A"));
        assert_eq!(
            wrapper.operation(&()),
            "A: ConcreteComponent operation with additional behavior A"
        );
    }

    #[test]
    fn prefix_only_tag() {
        let wrapper = Wrapper::new(core(), TagLayer::prefix("B"));
        assert_eq!(wrapper.operation(&()), "B: ConcreteComponent operation");
    }

    #[test]
    fn pre_and_post_compose_outside_in() {
        let echo: NodeRef<String, String> =
            Arc::new(FnNode::new("echo", |s: &String| format!("[{s}]")));

        let stack = WrapStack::new(echo)
            .wrap(
                FnLayer::new("inner")
                    .before(|s: &String| format!("{s}2"))
                    .after(|s: String| format!("{s}b")),
            )
            .wrap(
                FnLayer::new("outer")
                    .before(|s: &String| format!("{s}1"))
                    .after(|s: String| format!("{s}a")),
            );
        assert_eq!(stack.depth(), 2);

        let node = stack.build();
        assert_eq!(node.operation(&"x".to_string()), "[x12]ba");
    }

    #[test]
    fn links_point_at_inner() {
        let inner = core();
        let wrapper = Wrapper::passthrough(Arc::clone(&inner));
        let links = wrapper.links();
        assert_eq!(links.len(), 1);
        assert!(cap_core::same_node(&links[0], &inner));
        assert!(cap_core::same_node(wrapper.inner(), &inner));
    }

    #[test]
    fn label_is_layer_name() {
        let wrapper = Wrapper::new(core(), TagLayer::prefix("Tagger"));
        assert_eq!(wrapper.label(), "Tagger");
    }
}
