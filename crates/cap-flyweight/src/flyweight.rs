//! Instances handed out by the factory

use cap_core::Node;
use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Instance serving per-call extrinsic state
///
/// `serve` takes `&self`: extrinsic state is consumed at use time and has no
/// path back into the instance, which may be shared by every caller of the
/// same key.
pub trait Flyweight<Ext: ?Sized, Out = String>: Send + Sync + Debug {
    /// Use the instance with caller-supplied extrinsic state
    fn serve(&self, extrinsic: &Ext) -> Out;
}

/// Binds an instance to the capability node contract
///
/// The node's input is the extrinsic state.
pub struct Served<F: ?Sized> {
    label: String,
    instance: Arc<F>,
}

impl<F: ?Sized> Served<F> {
    /// Wrap an instance
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, instance: Arc<F>) -> Self {
        Self {
            label: label.into(),
            instance,
        }
    }

    /// Underlying instance
    #[inline]
    #[must_use]
    pub fn instance(&self) -> &Arc<F> {
        &self.instance
    }
}

impl<F: ?Sized + Debug> Debug for Served<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Served")
            .field("label", &self.label)
            .field("instance", &self.instance)
            .finish()
    }
}

impl<Ext, Out, F> Node<Ext, Out> for Served<F>
where
    F: Flyweight<Ext, Out> + ?Sized,
{
    fn operation(&self, input: &Ext) -> Out {
        self.instance.serve(input)
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.label)
    }
}
