//! Local match-and-reply logic of a handler

use std::fmt::{self, Debug};

/// Decides whether a handler takes a request and what it answers
pub trait Responder<Req, Out>: Send + Sync + Debug {
    /// Whether this handler resolves `request`
    fn accepts(&self, request: &Req) -> bool;

    /// Canned outcome for an accepted request
    fn respond(&self, request: &Req) -> Out;
}

/// Accepts exactly one request value and answers with a fixed outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exact<Req, Out> {
    request: Req,
    reply: Out,
}

impl<Req, Out> Exact<Req, Out> {
    /// Create responder for `request`
    #[inline]
    #[must_use]
    pub fn new(request: Req, reply: Out) -> Self {
        Self { request, reply }
    }
}

impl<Req, Out> Responder<Req, Out> for Exact<Req, Out>
where
    Req: PartialEq + Send + Sync + Debug,
    Out: Clone + Send + Sync + Debug,
{
    fn accepts(&self, request: &Req) -> bool {
        *request == self.request
    }

    fn respond(&self, _request: &Req) -> Out {
        self.reply.clone()
    }
}

/// Responder assembled from a predicate and a reply closure
pub struct FnResponder<P, R> {
    predicate: P,
    reply: R,
}

impl<P, R> FnResponder<P, R> {
    /// Create responder
    #[inline]
    #[must_use]
    pub fn new(predicate: P, reply: R) -> Self {
        Self { predicate, reply }
    }
}

impl<P, R> Debug for FnResponder<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnResponder").finish_non_exhaustive()
    }
}

impl<Req, Out, P, R> Responder<Req, Out> for FnResponder<P, R>
where
    P: Fn(&Req) -> bool + Send + Sync,
    R: Fn(&Req) -> Out + Send + Sync,
{
    fn accepts(&self, request: &Req) -> bool {
        (self.predicate)(request)
    }

    fn respond(&self, request: &Req) -> Out {
        (self.reply)(request)
    }
}
