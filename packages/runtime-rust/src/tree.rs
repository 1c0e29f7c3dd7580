//! Asynchronous routing tree and the concurrent (prefetching) router.
//!
//! Mirrors `winter_core::tree` with `async` handlers. A
//! [`MultiThreadStrategyRouter`] adds a prefetch phase ahead of routing:
//! `Prefetching -> Mapping -> Dispatching -> Done`, where a prefetch failure
//! ends the call before any business handler runs.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tracing::{debug, trace};
use winter_core::tree::StrategyHandler;

use crate::prefetch::PrefetchError;

/// Shared, type-erased async handler.
pub type SharedAsyncHandler<T, D, R> = Arc<dyn AsyncStrategyHandler<T, D, R>>;

/// Async unit of work a router dispatches to.
#[async_trait]
pub trait AsyncStrategyHandler<T, D, R>: Send + Sync {
    /// # Errors
    ///
    /// Any domain error. Routers propagate it unchanged.
    async fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R>;
}

/// Async decision function selecting the handler for a request.
#[async_trait]
pub trait AsyncStrategyMapper<T, D, R>: Send + Sync {
    /// `Ok(None)` means no handler matched and the router's default applies.
    ///
    /// # Errors
    ///
    /// Any domain error. It is not recovered by the default handler.
    async fn get(
        &self,
        request: &T,
        context: &mut D,
    ) -> anyhow::Result<Option<SharedAsyncHandler<T, D, R>>>;
}

/// An async mapper that knows its fallback and can route requests.
#[async_trait]
pub trait AsyncStrategyRouter<T, D, R>: AsyncStrategyMapper<T, D, R>
where
    T: Sync + 'static,
    D: Send + 'static,
    R: Send + 'static,
{
    /// Handler used when the mapper selects nothing.
    fn default_handler(&self) -> &dyn AsyncStrategyHandler<T, D, R>;

    /// Map the request and invoke the selected handler, or the default.
    ///
    /// # Errors
    ///
    /// Propagates mapper and handler errors unchanged.
    async fn route(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        let router = std::any::type_name::<Self>();
        match self.get(request, context).await? {
            Some(handler) => {
                trace!(router, "dispatching to mapped handler");
                handler.apply(request, context).await
            }
            None => {
                trace!(router, "no handler mapped, dispatching to default");
                self.default_handler().apply(request, context).await
            }
        }
    }
}

/// A router that loads data concurrently before routing.
///
/// Wrap an implementor in [`ConcurrentRouter`] to use it as an
/// [`AsyncStrategyHandler`]: [`multi_thread`](Self::multi_thread) runs first
/// and [`do_apply`](Self::do_apply), which usually ends in
/// [`route`](AsyncStrategyRouter::route), only runs if it succeeded. Use
/// [`crate::prefetch::Prefetch`] to fan out the loads and store their results
/// in the context.
#[async_trait]
pub trait MultiThreadStrategyRouter<T, D, R>: AsyncStrategyRouter<T, D, R>
where
    T: Sync + 'static,
    D: Send + 'static,
    R: Send + 'static,
{
    /// Prefetch phase.
    ///
    /// # Errors
    ///
    /// Any `PrefetchError`; it aborts the invocation.
    async fn multi_thread(&self, request: &T, context: &mut D) -> Result<(), PrefetchError>;

    /// Business phase, run after a successful prefetch.
    ///
    /// # Errors
    ///
    /// Any domain error.
    async fn do_apply(&self, request: &T, context: &mut D) -> anyhow::Result<R>;
}

/// Handler view of a [`MultiThreadStrategyRouter`].
///
/// `apply` awaits `multi_thread` and, only if it succeeds, runs `do_apply`.
pub struct ConcurrentRouter<X> {
    router: X,
}

impl<X> ConcurrentRouter<X> {
    #[must_use]
    pub fn new(router: X) -> Self {
        Self { router }
    }

    #[must_use]
    pub fn router(&self) -> &X {
        &self.router
    }

    pub fn into_inner(self) -> X {
        self.router
    }
}

#[async_trait]
impl<T, D, R, X> AsyncStrategyHandler<T, D, R> for ConcurrentRouter<X>
where
    X: MultiThreadStrategyRouter<T, D, R>,
    T: Sync + 'static,
    D: Send + 'static,
    R: Send + 'static,
{
    async fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        let router = std::any::type_name::<X>();
        trace!(router, "prefetch started");
        self.router.multi_thread(request, context).await?;
        debug!(router, "prefetch done, routing");
        self.router.do_apply(request, context).await
    }
}

impl<X: fmt::Debug> fmt::Debug for ConcurrentRouter<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConcurrentRouter").field(&self.router).finish()
    }
}

// ---------------------------------------------------------------------------
// Bridges
// ---------------------------------------------------------------------------

/// Runs a synchronous [`StrategyHandler`] as an async one.
#[derive(Debug, Clone)]
pub struct SyncHandler<H>(pub H);

#[async_trait]
impl<T, D, R, H> AsyncStrategyHandler<T, D, R> for SyncHandler<H>
where
    H: StrategyHandler<T, D, R>,
    T: Sync + 'static,
    D: Send + 'static,
    R: Send + 'static,
{
    async fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        StrategyHandler::apply(&self.0, request, context)
    }
}

/// Drives an async handler to completion so it can serve as a synchronous
/// [`StrategyHandler`], blocking the calling thread.
///
/// # Panics
///
/// `apply` panics if called from within an async execution context, as
/// [`Handle::block_on`] does.
pub struct BlockOn<H> {
    handler: H,
    runtime: Handle,
}

impl<H> BlockOn<H> {
    #[must_use]
    pub fn new(handler: H, runtime: Handle) -> Self {
        Self { handler, runtime }
    }

    pub fn into_inner(self) -> H {
        self.handler
    }
}

impl<T, D, R, H> StrategyHandler<T, D, R> for BlockOn<H>
where
    H: AsyncStrategyHandler<T, D, R>,
{
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        self.runtime
            .block_on(AsyncStrategyHandler::apply(&self.handler, request, context))
    }
}

impl<H> fmt::Debug for BlockOn<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockOn").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
