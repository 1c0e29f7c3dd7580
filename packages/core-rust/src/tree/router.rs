//! Routers: a mapper plus a default handler, dispatching each request once.
//!
//! Dispatch moves through `Mapping -> Dispatching(mapped | default) -> Done`.
//! An error while mapping or dispatching ends the call with that error; the
//! default handler is only used when the mapper explicitly returns `None`.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::{EmptyHandler, SharedHandler, StrategyHandler, StrategyMapper};
use crate::strategy::{Strategy, StrategyKind, StrategyRegistry};

// ---------------------------------------------------------------------------
// StrategyRouter
// ---------------------------------------------------------------------------

/// A mapper that knows its fallback and can route requests.
///
/// Implement this on routing-tree node types; a node's own
/// [`StrategyHandler::apply`] typically does its work and then calls
/// [`StrategyRouter::route`] to hand over to the next node.
pub trait StrategyRouter<T, D, R>: StrategyMapper<T, D, R> {
    /// Handler used when the mapper selects nothing.
    fn default_handler(&self) -> &dyn StrategyHandler<T, D, R>;

    /// Map the request and invoke the selected handler, or the default.
    ///
    /// # Errors
    ///
    /// Propagates mapper and handler errors unchanged.
    fn route(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        let router = std::any::type_name::<Self>();
        match self.get(request, context)? {
            Some(handler) => {
                trace!(router, "dispatching to mapped handler");
                handler.apply(request, context)
            }
            None => {
                trace!(router, "no handler mapped, dispatching to default");
                self.default_handler().apply(request, context)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// A router assembled from any mapper and a default handler.
pub struct Router<T, D, R> {
    mapper: Box<dyn StrategyMapper<T, D, R>>,
    default_handler: SharedHandler<T, D, R>,
}

impl<T: 'static, D: 'static, R: 'static> Router<T, D, R> {
    /// Router falling back to [`EmptyHandler`].
    pub fn new(mapper: impl StrategyMapper<T, D, R> + 'static) -> Self
    where
        R: Default,
    {
        Self::with_default(mapper, Arc::new(EmptyHandler))
    }

    pub fn with_default(
        mapper: impl StrategyMapper<T, D, R> + 'static,
        default_handler: SharedHandler<T, D, R>,
    ) -> Self {
        Self {
            mapper: Box::new(mapper),
            default_handler,
        }
    }

    pub fn set_default_handler(&mut self, handler: SharedHandler<T, D, R>) {
        self.default_handler = handler;
    }
}

impl<T, D, R> StrategyMapper<T, D, R> for Router<T, D, R> {
    fn get(&self, request: &T, context: &mut D) -> anyhow::Result<Option<SharedHandler<T, D, R>>> {
        self.mapper.get(request, context)
    }
}

impl<T, D, R> StrategyRouter<T, D, R> for Router<T, D, R> {
    fn default_handler(&self) -> &dyn StrategyHandler<T, D, R> {
        self.default_handler.as_ref()
    }
}

impl<T, D, R> StrategyHandler<T, D, R> for Router<T, D, R> {
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        self.route(request, context)
    }
}

impl<T, D, R> fmt::Debug for Router<T, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// RegistryRouter
// ---------------------------------------------------------------------------

/// A strategy that is also a routable handler.
pub trait RoutedStrategy<K: StrategyKind, T, D, R>: Strategy<K> + StrategyHandler<T, D, R> {}

impl<K, T, D, R, X> RoutedStrategy<K, T, D, R> for X
where
    K: StrategyKind,
    X: Strategy<K> + StrategyHandler<T, D, R> + ?Sized,
{
}

type Selector<K, T, D> = Box<dyn Fn(&T, &D) -> anyhow::Result<Option<K>> + Send + Sync>;

/// A router whose mapping step selects a kind and resolves it in a registry.
///
/// The selector decides which kind serves the request. A selected kind without
/// a registered strategy, like a `None` selection, falls back to the default.
pub struct RegistryRouter<K: StrategyKind, T, D, R> {
    registry: StrategyRegistry<K, dyn RoutedStrategy<K, T, D, R>>,
    selector: Selector<K, T, D>,
    default_handler: SharedHandler<T, D, R>,
}

impl<K: StrategyKind, T: 'static, D: 'static, R: 'static> RegistryRouter<K, T, D, R> {
    /// Registry router falling back to [`EmptyHandler`].
    pub fn new(
        registry: StrategyRegistry<K, dyn RoutedStrategy<K, T, D, R>>,
        selector: impl Fn(&T, &D) -> anyhow::Result<Option<K>> + Send + Sync + 'static,
    ) -> Self
    where
        R: Default,
    {
        Self::with_default(registry, selector, Arc::new(EmptyHandler))
    }

    pub fn with_default(
        registry: StrategyRegistry<K, dyn RoutedStrategy<K, T, D, R>>,
        selector: impl Fn(&T, &D) -> anyhow::Result<Option<K>> + Send + Sync + 'static,
        default_handler: SharedHandler<T, D, R>,
    ) -> Self {
        Self {
            registry,
            selector: Box::new(selector),
            default_handler,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &StrategyRegistry<K, dyn RoutedStrategy<K, T, D, R>> {
        &self.registry
    }

    /// Select a kind, resolve it, and invoke the strategy or the default.
    ///
    /// # Errors
    ///
    /// Propagates selector and handler errors unchanged.
    pub fn route(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        let selected = (self.selector)(request, context)?;
        match selected.and_then(|kind| self.registry.get(kind).map(|s| (kind, s))) {
            Some((kind, strategy)) => {
                trace!(
                    domain = K::domain(),
                    code = %kind.code(),
                    "dispatching to registered strategy"
                );
                strategy.apply(request, context)
            }
            None => {
                trace!(
                    domain = K::domain(),
                    ?selected,
                    "no strategy selected, dispatching to default"
                );
                self.default_handler.apply(request, context)
            }
        }
    }
}

impl<K: StrategyKind, T: 'static, D: 'static, R: 'static> StrategyHandler<T, D, R>
    for RegistryRouter<K, T, D, R>
{
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        self.route(request, context)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
