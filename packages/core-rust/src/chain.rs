//! Composite executor: a named, ordered chain of [`LogicHandler`]s that is
//! itself a handler.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::handler::{Flow, LogicHandler};
use crate::linked_list::LinkedList;
use crate::tree::StrategyHandler;

/// Shared, type-erased chain member.
pub type SharedLogicHandler<T, D, R> = Arc<dyn LogicHandler<T, D, R>>;

/// Runs its handlers in insertion order until one returns [`Flow::Stop`].
///
/// The chain's own result is the stopping handler's `Flow::Stop(value)`, or
/// `Flow::Continue` when every member continued. Handler errors abort the
/// remaining handlers and propagate unchanged.
pub struct BusinessChain<T, D, R> {
    handlers: LinkedList<SharedLogicHandler<T, D, R>>,
}

impl<T, D, R> BusinessChain<T, D, R> {
    /// Build a chain; construction order is execution order.
    pub fn new(
        name: impl Into<String>,
        handlers: impl IntoIterator<Item = SharedLogicHandler<T, D, R>>,
    ) -> Self {
        let mut chain = Self::empty(name);
        chain.handlers.extend(handlers);
        chain
    }

    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            handlers: LinkedList::new(name),
        }
    }

    /// Append a handler, builder style.
    #[must_use]
    pub fn with(mut self, handler: impl LogicHandler<T, D, R> + 'static) -> Self {
        self.handlers.add(Arc::new(handler));
        self
    }

    /// Append a handler at the tail.
    pub fn add(&mut self, handler: SharedLogicHandler<T, D, R>) {
        self.handlers.add_last(handler);
    }

    /// Insert a handler ahead of every other.
    pub fn add_first(&mut self, handler: SharedLogicHandler<T, D, R>) {
        self.handlers.add_first(handler);
    }

    /// Remove `handler` (matched by identity). Returns whether it was a member.
    pub fn remove(&mut self, handler: &SharedLogicHandler<T, D, R>) -> bool {
        self.handlers
            .remove_by(|member| Arc::ptr_eq(member, handler))
            .is_some()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.handlers.name()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The underlying node store.
    #[must_use]
    pub fn handlers(&self) -> &LinkedList<SharedLogicHandler<T, D, R>> {
        &self.handlers
    }
}

impl<T, D, R> LogicHandler<T, D, R> for BusinessChain<T, D, R> {
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<Flow<R>> {
        for (position, handler) in self.handlers.iter().enumerate() {
            match handler.apply(request, context)? {
                Flow::Continue => trace!(chain = self.name(), position, "handler continued"),
                Flow::Stop(result) => {
                    debug!(chain = self.name(), position, "chain short-circuited");
                    return Ok(Flow::Stop(result));
                }
            }
        }
        debug!(chain = self.name(), handlers = self.len(), "chain completed without decision");
        Ok(Flow::Continue)
    }
}

impl<T, D, R> StrategyHandler<T, D, Flow<R>> for BusinessChain<T, D, R> {
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<Flow<R>> {
        LogicHandler::apply(self, request, context)
    }
}

impl<T, D, R> fmt::Debug for BusinessChain<T, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessChain")
            .field("name", &self.name())
            .field("handlers", &self.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
