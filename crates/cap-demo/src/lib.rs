//! Capability Runtime Demonstrations
//!
//! Sample domains and the console scenarios run by the `capdemo` binary.
//!
//! - [`domain`]: components, decorating layers, the animal chain, pizzas
//! - [`scenarios`]: one runner per mechanism, plus text/JSON rendering
//! - [`DemoError`]: what a scenario run can fail with

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod domain;
pub mod error;
pub mod scenarios;

pub use error::DemoError;
pub use scenarios::{render, Scenario};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
