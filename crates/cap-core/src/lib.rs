//! Capability Runtime Core
//!
//! The contract every structure in the runtime implements, plus the
//! configuration shared by the structure, dispatch and flyweight crates.
//!
//! # Core Concepts
//!
//! - [`Node`]: polymorphic capability producing an outcome from an input
//! - [`NodeRef`]: shared handle; identity is the handle's address
//! - [`Leaf`] / [`FnNode`]: terminal nodes
//! - [`RuntimeConfig`]: composite layout and cache settings, loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use cap_core::{Leaf, Node, NodeRef};
//! use std::sync::Arc;
//!
//! let leaf: NodeRef = Arc::new(Leaf::named("Leaf 1"));
//! assert_eq!(leaf.operation(&()), "Leaf: Leaf 1");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod node;

// Re-exports
pub use config::{CacheConfig, CompositeConfig, RuntimeConfig};
pub use error::ConfigError;
pub use node::{node_addr, reaches, same_node, FnNode, Leaf, Node, NodeRef};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
