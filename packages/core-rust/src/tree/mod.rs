//! Strategy routing tree.
//!
//! 1. **Handlers** ([`StrategyHandler`]): the unit of work a router dispatches to
//! 2. **Mappers** ([`StrategyMapper`]): pick the next handler for a request
//! 3. **Routers** ([`router`]): mapper + default fallback, themselves handlers

use std::sync::Arc;

pub mod router;

pub use router::{RegistryRouter, RoutedStrategy, Router, StrategyRouter};

// ---------------------------------------------------------------------------
// StrategyHandler
// ---------------------------------------------------------------------------

/// A routable unit of work: consumes a request and the context, produces a result.
pub trait StrategyHandler<T, D, R>: Send + Sync {
    /// # Errors
    ///
    /// Any domain error. Routers propagate it unchanged.
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R>;
}

impl<T, D, R, F> StrategyHandler<T, D, R> for F
where
    F: Fn(&T, &mut D) -> anyhow::Result<R> + Send + Sync,
{
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        self(request, context)
    }
}

/// Shared, type-erased handler as returned by mappers.
pub type SharedHandler<T, D, R> = Arc<dyn StrategyHandler<T, D, R>>;

/// No-op handler returning `R::default()`. The default fallback of [`Router::new`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyHandler;

impl<T, D, R: Default> StrategyHandler<T, D, R> for EmptyHandler {
    fn apply(&self, _request: &T, _context: &mut D) -> anyhow::Result<R> {
        Ok(R::default())
    }
}

// ---------------------------------------------------------------------------
// StrategyMapper
// ---------------------------------------------------------------------------

/// Decision function selecting the handler for a request.
pub trait StrategyMapper<T, D, R>: Send + Sync {
    /// `Ok(None)` means no handler matched and the router's default applies.
    ///
    /// # Errors
    ///
    /// Any domain error. It is not recovered by the default handler.
    fn get(&self, request: &T, context: &mut D) -> anyhow::Result<Option<SharedHandler<T, D, R>>>;
}

impl<T, D, R, F> StrategyMapper<T, D, R> for F
where
    F: Fn(&T, &mut D) -> anyhow::Result<Option<SharedHandler<T, D, R>>> + Send + Sync,
{
    fn get(&self, request: &T, context: &mut D) -> anyhow::Result<Option<SharedHandler<T, D, R>>> {
        self(request, context)
    }
}
