//! Capability Structures
//!
//! Tree aggregation and transparent wrapping over [`cap_core::Node`].
//!
//! # Core Concepts
//!
//! - [`Composite`]: ordered children, aggregated by an [`Aggregator`]
//! - [`Wrapper`]: one inner node plus a [`Layer`] of pre/post transforms
//! - [`WrapStack`]: builder for nested wrappers, innermost first
//!
//! # Example
//!
//! ```rust
//! use cap_core::{Leaf, Node, NodeRef};
//! use cap_structure::{Composite, TagLayer, WrapStack};
//! use std::sync::Arc;
//!
//! let tree: Arc<Composite> = Arc::new(Composite::new());
//! tree.add(Arc::new(Leaf::named("Leaf 1"))).unwrap();
//! tree.add(Arc::new(Leaf::named("Leaf 2"))).unwrap();
//! assert_eq!(tree.operation(&()), "Composite:\nLeaf: Leaf 1\nLeaf: Leaf 2");
//!
//! let core: NodeRef = Arc::new(Leaf::named("core"));
//! let wrapped = WrapStack::new(core).wrap(TagLayer::prefix("A")).build();
//! assert_eq!(wrapped.operation(&()), "A: Leaf: core");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod composite;
pub mod error;
pub mod wrapper;

// Re-exports
pub use composite::{Aggregator, Composite, ListAggregator, TextAggregator};
pub use error::StructureError;
pub use wrapper::{FnLayer, Layer, Passthrough, TagLayer, WrapStack, Wrapper};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
