//! Chain handler contract.
//!
//! A [`LogicHandler`] consumes a request and the per-request context and
//! returns a [`Flow`]: either let the chain continue, or stop it with a value.

use crate::context::Proceed;

/// Outcome of a chain handler.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Flow<R> {
    /// Hand over to the next handler. Returned by a whole chain when every
    /// member continued, i.e. the chain completed without a decision.
    Continue,
    /// Short-circuit the chain with this result.
    Stop(R),
}

impl<R> Flow<R> {
    pub fn is_stop(&self) -> bool {
        matches!(self, Flow::Stop(_))
    }

    /// The stop value, or `None` if the flow continued.
    pub fn into_stopped(self) -> Option<R> {
        match self {
            Flow::Continue => None,
            Flow::Stop(result) => Some(result),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Flow<U> {
        match self {
            Flow::Continue => Flow::Continue,
            Flow::Stop(result) => Flow::Stop(f(result)),
        }
    }
}

/// Unit of work inside a [`crate::chain::BusinessChain`].
pub trait LogicHandler<T, D, R>: Send + Sync {
    /// Handle `request`, optionally mutating `context`.
    ///
    /// # Errors
    ///
    /// Any domain error. It propagates out of the enclosing chain unchanged.
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<Flow<R>>;
}

impl<T, D, R, F> LogicHandler<T, D, R> for F
where
    F: Fn(&T, &mut D) -> anyhow::Result<Flow<R>> + Send + Sync,
{
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<Flow<R>> {
        self(request, context)
    }
}

/// Mark the context as proceeding and let the chain continue.
pub fn next<D: Proceed, R>(context: &mut D) -> Flow<R> {
    context.set_proceed(true);
    Flow::Continue
}

/// Mark the context as stopped and short-circuit the chain with `result`.
pub fn stop<D: Proceed, R>(context: &mut D, result: R) -> Flow<R> {
    context.set_proceed(false);
    Flow::Stop(result)
}
