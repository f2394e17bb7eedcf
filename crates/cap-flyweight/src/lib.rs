//! Capability Flyweights
//!
//! Keyed shared-instance caching: one canonical instance per [`CacheKey`],
//! built lazily on first request, plus a separate path for instances that
//! are never shared.
//!
//! # Core Concepts
//!
//! - [`Flyweight`]: an instance serving caller-supplied extrinsic state
//! - [`FlyweightFactory`]: owner of the registry; explicit lifecycle
//! - [`CacheKey`]: intrinsic attributes, compared by value
//! - [`Served`]: adapter exposing an instance as a [`cap_core::Node`]
//!
//! # Example
//!
//! ```rust
//! use cap_flyweight::{CacheKey, Flyweight, FlyweightFactory};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Base(String);
//!
//! impl Flyweight<[String]> for Base {
//!     fn serve(&self, toppings: &[String]) -> String {
//!         format!("{} with {}", self.0, toppings.join(", "))
//!     }
//! }
//!
//! let factory: FlyweightFactory<Base> = FlyweightFactory::new(
//!     |key: &CacheKey| Ok(Arc::new(Base(key.to_string()))),
//!     |description: &str| Arc::new(Base(description.to_string())),
//! );
//!
//! let a = factory.shared(["Thin Crust", "Tomato Sauce"]).unwrap();
//! let b = factory.shared(["Thin Crust", "Tomato Sauce"]).unwrap();
//! assert!(Arc::ptr_eq(&a, &b));
//! assert_eq!(a.serve(&["Basil".to_string()][..]), "Thin Crust-Tomato Sauce with Basil");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod factory;
pub mod flyweight;
pub mod key;

// Re-exports
pub use error::CacheError;
pub use factory::{CacheStats, FlyweightFactory};
pub use flyweight::{Flyweight, Served};
pub use key::CacheKey;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
