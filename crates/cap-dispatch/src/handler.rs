//! Ordered dispatch chain
//!
//! Each [`Handler`] holds a local [`Responder`] and at most one forward link.
//! A request is offered to the entry handler first; the first handler that
//! accepts it answers and traversal stops. Handlers without a link end the
//! chain with [`Dispatch::Unhandled`].
//!
//! # Invariants
//! - `set_next` overwrites, never appends, and returns its argument so that
//!   `a.set_next(b)?.set_next(c)?` links `a -> b -> c`.
//! - Chains are acyclic: `set_next` rejects any link that lets a request
//!   reach the same handler twice.
//! - Traversal is strictly forward and iterative, so chain length never
//!   grows the stack.

use crate::error::DispatchError;
use crate::outcome::Dispatch;
use crate::responder::Responder;
use cap_core::{Node, NodeRef};
use parking_lot::{Mutex, RwLock};
use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Serializes cycle checks against concurrent `set_next` calls
static TOPOLOGY: Mutex<()> = parking_lot::const_mutex(());

/// Shared handle to a handler
pub type HandlerRef<Req = String, Out = String> = Arc<Handler<Req, Out>>;

/// One link of a dispatch chain
pub struct Handler<Req = String, Out = String> {
    name: String,
    responder: Box<dyn Responder<Req, Out>>,
    next: RwLock<Option<HandlerRef<Req, Out>>>,
}

impl<Req, Out> Handler<Req, Out> {
    /// Create an unlinked handler
    #[must_use]
    pub fn new(name: impl Into<String>, responder: impl Responder<Req, Out> + 'static) -> Self {
        Self {
            name: name.into(),
            responder: Box::new(responder),
            next: RwLock::new(None),
        }
    }

    /// Create an unlinked handler behind a shared handle
    #[must_use]
    pub fn shared(
        name: impl Into<String>,
        responder: impl Responder<Req, Out> + 'static,
    ) -> HandlerRef<Req, Out> {
        Arc::new(Self::new(name, responder))
    }

    /// Handler name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Point this handler at `next`, replacing any previous link
    ///
    /// Returns `next` so links can be chained fluently.
    ///
    /// # Errors
    /// [`DispatchError::CycleDetected`] if this handler is reachable from
    /// `next`. The previous link is kept.
    pub fn set_next(
        &self,
        next: HandlerRef<Req, Out>,
    ) -> Result<HandlerRef<Req, Out>, DispatchError> {
        let _topology = TOPOLOGY.lock();

        if self.reachable_from(&next) {
            tracing::warn!(from = %self.name, to = %next.name, "rejected link that would close a cycle");
            return Err(DispatchError::CycleDetected {
                from: self.name.clone(),
                to: next.name.clone(),
            });
        }

        let previous = self.next.write().replace(Arc::clone(&next));
        tracing::debug!(
            from = %self.name,
            to = %next.name,
            replaced = previous.as_ref().map(|p| p.name.as_str()),
            "linked handler"
        );
        Ok(next)
    }

    /// Drop the forward link, returning it
    pub fn clear_next(&self) -> Option<HandlerRef<Req, Out>> {
        self.next.write().take()
    }

    /// Current forward link
    #[must_use]
    pub fn next(&self) -> Option<HandlerRef<Req, Out>> {
        self.next.read().clone()
    }

    /// Offer `request` to this handler, then forward along the chain
    pub fn handle(&self, request: &Req) -> Dispatch<Out> {
        if let Some(done) = self.try_local(request) {
            return done;
        }

        let mut cursor = self.next();
        while let Some(handler) = cursor {
            if let Some(done) = handler.try_local(request) {
                return done;
            }
            cursor = handler.next();
        }

        tracing::trace!(entry = %self.name, "request left unhandled");
        Dispatch::Unhandled
    }

    /// Names from this handler to the end of the chain
    #[must_use]
    pub fn chain_names(&self) -> Vec<String> {
        let mut names = vec![self.name.clone()];
        let mut cursor = self.next();
        while let Some(handler) = cursor {
            names.push(handler.name.clone());
            cursor = handler.next();
        }
        names
    }

    fn try_local(&self, request: &Req) -> Option<Dispatch<Out>> {
        if !self.responder.accepts(request) {
            return None;
        }
        tracing::trace!(handler = %self.name, "request handled");
        Some(Dispatch::Handled {
            by: self.name.clone(),
            outcome: self.responder.respond(request),
        })
    }

    fn reachable_from(&self, start: &HandlerRef<Req, Out>) -> bool {
        let mut cursor = Some(Arc::clone(start));
        while let Some(handler) = cursor {
            if std::ptr::eq(Arc::as_ptr(&handler), self) {
                return true;
            }
            cursor = handler.next();
        }
        false
    }
}

impl<Req, Out> Debug for Handler<Req, Out> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let next = self.next.read().as_ref().map(|n| n.name.clone());
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("responder", &self.responder)
            .field("next", &next)
            .finish()
    }
}

impl<Req: 'static, Out: 'static> Node<Req, Dispatch<Out>> for Handler<Req, Out> {
    fn operation(&self, input: &Req) -> Dispatch<Out> {
        self.handle(input)
    }

    fn links(&self) -> Vec<NodeRef<Req, Dispatch<Out>>> {
        self.next()
            .map(|next| -> NodeRef<Req, Dispatch<Out>> { next })
            .into_iter()
            .collect()
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::{Exact, FnResponder};

    fn animal(name: &str, food: &str) -> HandlerRef {
        Handler::shared(
            name,
            Exact::new(food.to_string(), format!("{name}: I'll eat the {food}.")),
        )
    }

    fn req(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn unlinked_handler_without_match_is_unhandled() {
        let dog = animal("Dog", "MeatBall");
        assert_eq!(dog.handle(&req("Nut")), Dispatch::Unhandled);
    }

    #[test]
    fn local_match_stops_forwarding() {
        let first = Handler::shared("first", FnResponder::new(|_: &String| true, |_: &String| "first".to_string()));
        let second = Handler::shared("second", FnResponder::new(|_: &String| true, |_: &String| "second".to_string()));
        first.set_next(second).unwrap();

        assert_eq!(first.handle(&req("anything")).handled_by(), Some("first"));
    }

    #[test]
    fn set_next_returns_argument() {
        let a = animal("a", "x");
        let b = animal("b", "y");
        let returned = a.set_next(Arc::clone(&b)).unwrap();
        assert!(Arc::ptr_eq(&returned, &b));
    }

    #[test]
    fn set_next_overwrites() {
        let a = animal("a", "x");
        let b = animal("b", "y");
        let c = animal("c", "z");

        a.set_next(b).unwrap();
        a.set_next(Arc::clone(&c)).unwrap();

        assert!(Arc::ptr_eq(&a.next().unwrap(), &c));
        assert_eq!(a.chain_names(), vec!["a", "c"]);
    }

    #[test]
    fn rejects_self_link() {
        let a = animal("a", "x");
        let err = a.set_next(Arc::clone(&a)).unwrap_err();
        assert_eq!(
            err,
            DispatchError::CycleDetected {
                from: "a".to_string(),
                to: "a".to_string(),
            }
        );
        assert!(a.next().is_none());
    }

    #[test]
    fn rejected_link_keeps_previous() {
        let a = animal("a", "x");
        let b = animal("b", "y");
        let c = animal("c", "z");
        a.set_next(Arc::clone(&b)).unwrap().set_next(Arc::clone(&c)).unwrap();

        let d = animal("d", "w");
        c.set_next(Arc::clone(&d)).unwrap();
        assert!(c.set_next(Arc::clone(&a)).is_err());
        assert!(Arc::ptr_eq(&c.next().unwrap(), &d));
    }

    #[test]
    fn relinking_out_of_a_cycle_is_allowed() {
        let a = animal("a", "x");
        let b = animal("b", "y");
        a.set_next(Arc::clone(&b)).unwrap();
        assert!(b.set_next(Arc::clone(&a)).is_err());

        a.clear_next();
        assert!(b.set_next(Arc::clone(&a)).is_ok());
        assert_eq!(b.chain_names(), vec!["b", "a"]);
    }

    #[test]
    fn node_contract_delegates_to_handle() {
        let dog = animal("Dog", "MeatBall");
        let node: NodeRef<String, Dispatch<String>> = dog;
        assert!(node.operation(&req("MeatBall")).is_handled());
        assert_eq!(node.label(), "Dog");
    }

    #[test]
    fn links_expose_successor() {
        let a = animal("a", "x");
        let b = animal("b", "y");
        assert!(Node::links(&*a).is_empty());

        a.set_next(b).unwrap();
        assert_eq!(Node::links(&*a).len(), 1);
    }
}
