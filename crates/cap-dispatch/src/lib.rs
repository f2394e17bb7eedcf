//! Capability Dispatch
//!
//! Ordered fallback resolution: a request travels forward along a chain of
//! [`Handler`]s until one accepts it, or comes back [`Dispatch::Unhandled`].
//!
//! # Example
//!
//! ```rust
//! use cap_dispatch::{Dispatch, Exact, Handler};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), cap_dispatch::DispatchError> {
//! let monkey = Handler::shared("Monkey", Exact::new("Banana".to_string(), "Monkey: I'll eat the Banana.".to_string()));
//! let squirrel = Handler::shared("Squirrel", Exact::new("Nut".to_string(), "Squirrel: I'll eat the Nut.".to_string()));
//! monkey.set_next(Arc::clone(&squirrel))?;
//!
//! assert_eq!(monkey.handle(&"Nut".to_string()).handled_by(), Some("Squirrel"));
//! assert_eq!(squirrel.handle(&"Banana".to_string()), Dispatch::Unhandled);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod handler;
pub mod outcome;
pub mod responder;

// Re-exports
pub use error::DispatchError;
pub use handler::{Handler, HandlerRef};
pub use outcome::Dispatch;
pub use responder::{Exact, FnResponder, Responder};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
