use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::kind::StrategyKind;
use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Strategy / StrategyProvider
// ---------------------------------------------------------------------------

/// An interchangeable implementation that identifies itself by a kind.
pub trait Strategy<K: StrategyKind>: Send + Sync {
    fn strategy_type(&self) -> K;
}

/// Provider-discovery collaborator: yields strategy instances the caller did
/// not construct directly.
///
/// Discovery is an explicit, statically-known list assembled at startup. An
/// `Err` item ends discovery from this provider; the registry logs it and keeps
/// whatever was yielded before.
pub trait StrategyProvider<S: ?Sized>: Send + Sync {
    /// Name used in log output.
    fn name(&self) -> &str;

    fn discover(&self) -> Box<dyn Iterator<Item = anyhow::Result<Arc<S>>> + '_>;
}

impl<S, F> StrategyProvider<S> for F
where
    S: ?Sized + 'static,
    F: Fn() -> anyhow::Result<Vec<Arc<S>>> + Send + Sync,
{
    fn name(&self) -> &str {
        std::any::type_name::<F>()
    }

    fn discover(&self) -> Box<dyn Iterator<Item = anyhow::Result<Arc<S>>> + '_> {
        match self() {
            Ok(strategies) => Box::new(strategies.into_iter().map(Ok)),
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }
}

/// A constructor-time table of strategies.
pub struct StaticProvider<S: ?Sized> {
    name: String,
    strategies: Vec<Arc<S>>,
}

impl<S: ?Sized> StaticProvider<S> {
    #[must_use]
    pub fn new(name: impl Into<String>, strategies: Vec<Arc<S>>) -> Self {
        Self {
            name: name.into(),
            strategies,
        }
    }
}

impl<S: ?Sized + Send + Sync + 'static> StrategyProvider<S> for StaticProvider<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn discover(&self) -> Box<dyn Iterator<Item = anyhow::Result<Arc<S>>> + '_> {
        Box::new(self.strategies.iter().cloned().map(Ok))
    }
}

// ---------------------------------------------------------------------------
// StrategyRegistry
// ---------------------------------------------------------------------------

/// Resolves strategies by the code of their kind.
///
/// Populated at construction from providers (first) and a manual list (second).
/// A code can be registered once: a duplicate is rejected with
/// `RegistryError::Duplicate` and the existing entry is kept. Provider failures
/// are logged and skipped. After construction the registry is read-only from
/// `&self`; further registration needs `&mut self`.
pub struct StrategyRegistry<K: StrategyKind, S: ?Sized> {
    strategies: HashMap<K::Code, Arc<S>>,
    /// Registration order, for deterministic iteration.
    order: Vec<K>,
}

impl<K: StrategyKind, S: ?Sized> StrategyRegistry<K, S> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        debug_assert!(K::codes_are_unique(), "{} declares duplicate codes", K::domain());
        Self {
            strategies: HashMap::new(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn builder() -> RegistryBuilder<K, S> {
        RegistryBuilder {
            providers: Vec::new(),
            manual: Vec::new(),
            _kind: PhantomData,
        }
    }

    /// Strategy registered for `kind`.
    #[must_use]
    pub fn get(&self, kind: K) -> Option<&Arc<S>> {
        self.strategies.get(&kind.code())
    }

    /// Strategy registered under a raw `code`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownCode` if `code` is not a member of the
    /// kind's domain. A valid code with no registered strategy is `Ok(None)`.
    pub fn get_by_code(&self, code: K::Code) -> Result<Option<&Arc<S>>, RegistryError> {
        let kind = K::from_code(code)?;
        Ok(self.get(kind))
    }

    /// Read-only view of every registered strategy keyed by code.
    #[must_use]
    pub fn all(&self) -> &HashMap<K::Code, Arc<S>> {
        &self.strategies
    }

    /// Registered strategies in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &Arc<S>)> + '_ {
        self.order
            .iter()
            .filter_map(|kind| self.strategies.get(&kind.code()).map(|s| (*kind, s)))
    }

    #[must_use]
    pub fn contains(&self, kind: K) -> bool {
        self.strategies.contains_key(&kind.code())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl<K: StrategyKind, S: ?Sized + Strategy<K>> StrategyRegistry<K, S> {
    /// Build a registry from providers followed by a manual list.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` if two strategies share a code.
    pub fn with_strategies(
        providers: impl IntoIterator<Item = Box<dyn StrategyProvider<S>>>,
        extra: impl IntoIterator<Item = Arc<S>>,
    ) -> Result<Self, RegistryError> {
        let mut builder = Self::builder().strategies(extra);
        builder.providers.extend(providers);
        builder.build()
    }

    /// Register a strategy under its kind's code.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` if the code is already taken; the
    /// existing strategy stays registered.
    pub fn register(&mut self, strategy: Arc<S>) -> Result<(), RegistryError> {
        let kind = strategy.strategy_type();
        let code = kind.code();
        match self.strategies.entry(code) {
            Entry::Occupied(_) => Err(RegistryError::Duplicate {
                code: code.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(strategy);
                self.order.push(kind);
                debug!(
                    domain = K::domain(),
                    code = %code,
                    desc = kind.desc(),
                    "strategy registered"
                );
                Ok(())
            }
        }
    }

    /// Register every strategy in order, stopping at the first duplicate.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` on the first code clash.
    pub fn register_all(
        &mut self,
        strategies: impl IntoIterator<Item = Arc<S>>,
    ) -> Result<(), RegistryError> {
        for strategy in strategies {
            self.register(strategy)?;
        }
        Ok(())
    }

    /// Register everything `provider` yields and return how many were added.
    ///
    /// A provider error is logged and ends discovery from that provider.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` if a discovered strategy clashes.
    pub fn discover(&mut self, provider: &dyn StrategyProvider<S>) -> Result<usize, RegistryError> {
        let mut loaded = 0;
        for candidate in provider.discover() {
            match candidate {
                Ok(strategy) => {
                    self.register(strategy)?;
                    loaded += 1;
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        loaded,
                        error = %err,
                        "strategy discovery failed, continuing with partial results"
                    );
                    break;
                }
            }
        }
        Ok(loaded)
    }
}

impl<K: StrategyKind, S: ?Sized> Default for StrategyRegistry<K, S> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RegistryBuilder
// ---------------------------------------------------------------------------

/// Collects providers and manual strategies, then builds a [`StrategyRegistry`].
pub struct RegistryBuilder<K: StrategyKind, S: ?Sized> {
    providers: Vec<Box<dyn StrategyProvider<S>>>,
    manual: Vec<Arc<S>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: StrategyKind, S: ?Sized + Strategy<K>> RegistryBuilder<K, S> {
    #[must_use]
    pub fn provider(mut self, provider: impl StrategyProvider<S> + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Arc<S>) -> Self {
        self.manual.push(strategy);
        self
    }

    #[must_use]
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = Arc<S>>) -> Self {
        self.manual.extend(strategies);
        self
    }

    /// Run discovery for every provider, then register the manual list.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Duplicate` on the first code clash.
    pub fn build(self) -> Result<StrategyRegistry<K, S>, RegistryError> {
        let mut registry = StrategyRegistry::new();
        let mut discovered = 0;
        for provider in &self.providers {
            discovered += registry.discover(provider.as_ref())?;
        }
        let manual = self.manual.len();
        registry.register_all(self.manual)?;
        info!(
            domain = K::domain(),
            discovered,
            manual,
            total = registry.len(),
            "strategy registry built"
        );
        Ok(registry)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    crate::strategy_kind! {
        enum Notify: u32 {
            Sms = (1, "sms"),
            Mail = (2, "mail"),
            Push = (3, "push"),
        }
    }

    trait Notifier: Strategy<Notify> {
        fn send(&self, to: &str) -> String;
    }

    struct Fixed {
        kind: Notify,
        tag: &'static str,
    }

    impl Strategy<Notify> for Fixed {
        fn strategy_type(&self) -> Notify {
            self.kind
        }
    }

    impl Notifier for Fixed {
        fn send(&self, to: &str) -> String {
            format!("{}:{to}", self.tag)
        }
    }

    fn fixed(kind: Notify, tag: &'static str) -> Arc<dyn Notifier> {
        Arc::new(Fixed { kind, tag })
    }

    #[test]
    fn manual_registration_resolves_by_identity() {
        let sms = fixed(Notify::Sms, "sms");
        let mail = fixed(Notify::Mail, "mail");
        let registry = StrategyRegistry::<Notify, dyn Notifier>::builder()
            .strategies([sms.clone(), mail.clone()])
            .build()
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(registry.get(Notify::Sms).unwrap(), &sms));
        assert!(Arc::ptr_eq(registry.get(Notify::Mail).unwrap(), &mail));
        assert!(registry.get(Notify::Push).is_none());
        assert_eq!(registry.get(Notify::Mail).unwrap().send("bob"), "mail:bob");
    }

    #[test]
    fn duplicate_code_is_rejected_and_first_kept() {
        let first = fixed(Notify::Sms, "first");
        let second = fixed(Notify::Sms, "second");
        let mut registry = StrategyRegistry::<Notify, dyn Notifier>::new();

        registry.register(first.clone()).unwrap();
        let err = registry.register(second).unwrap_err();

        assert_eq!(err, RegistryError::Duplicate { code: "1".to_string() });
        assert!(Arc::ptr_eq(registry.get(Notify::Sms).unwrap(), &first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_in_builder_fails_construction() {
        let result = StrategyRegistry::<Notify, dyn Notifier>::builder()
            .strategy(fixed(Notify::Push, "a"))
            .strategy(fixed(Notify::Push, "b"))
            .build();
        assert!(matches!(result, Err(RegistryError::Duplicate { .. })));
    }

    #[test]
    fn get_by_code_validates_domain() {
        let registry = StrategyRegistry::<Notify, dyn Notifier>::builder()
            .strategy(fixed(Notify::Sms, "sms"))
            .build()
            .unwrap();

        assert!(registry.get_by_code(1).unwrap().is_some());
        assert!(registry.get_by_code(3).unwrap().is_none());
        assert!(matches!(
            registry.get_by_code(99),
            Err(RegistryError::UnknownCode { domain: "Notify", ref code }) if code == "99"
        ));
    }

    #[test]
    fn discovery_runs_before_manual_registration() {
        let discovered = fixed(Notify::Sms, "discovered");
        let manual = fixed(Notify::Mail, "manual");
        let registry = StrategyRegistry::<Notify, dyn Notifier>::builder()
            .provider(StaticProvider::new("builtin", vec![discovered.clone()]))
            .strategy(manual)
            .build()
            .unwrap();

        let order: Vec<Notify> = registry.iter().map(|(kind, _)| kind).collect();
        assert_eq!(order, vec![Notify::Sms, Notify::Mail]);
        assert!(Arc::ptr_eq(registry.get(Notify::Sms).unwrap(), &discovered));
    }

    #[test]
    fn manual_duplicate_of_discovered_is_fatal() {
        let result = StrategyRegistry::<Notify, dyn Notifier>::builder()
            .provider(StaticProvider::new("builtin", vec![fixed(Notify::Sms, "discovered")]))
            .strategy(fixed(Notify::Sms, "manual"))
            .build();
        assert!(matches!(result, Err(RegistryError::Duplicate { .. })));
    }

    #[test]
    fn failing_provider_is_logged_and_skipped() {
        let failing = || -> anyhow::Result<Vec<Arc<dyn Notifier>>> {
            Err(anyhow::anyhow!("manifest unreadable"))
        };
        let registry = StrategyRegistry::<Notify, dyn Notifier>::builder()
            .provider(failing)
            .strategy(fixed(Notify::Mail, "manual"))
            .build()
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry.contains(Notify::Mail));
    }

    struct PartialProvider;

    impl StrategyProvider<dyn Notifier> for PartialProvider {
        fn name(&self) -> &str {
            "partial"
        }

        fn discover(&self) -> Box<dyn Iterator<Item = anyhow::Result<Arc<dyn Notifier>>> + '_> {
            Box::new(
                vec![
                    Ok(fixed(Notify::Sms, "ok")),
                    Err(anyhow::anyhow!("broken entry")),
                    Ok(fixed(Notify::Push, "never reached")),
                ]
                .into_iter(),
            )
        }
    }

    #[test]
    fn partial_discovery_keeps_earlier_results() {
        let mut registry = StrategyRegistry::<Notify, dyn Notifier>::new();
        let loaded = registry.discover(&PartialProvider).unwrap();

        assert_eq!(loaded, 1);
        assert!(registry.contains(Notify::Sms));
        assert!(!registry.contains(Notify::Push));
    }

    #[test]
    fn with_strategies_combines_sources() {
        let providers: Vec<Box<dyn StrategyProvider<dyn Notifier>>> = vec![Box::new(
            StaticProvider::new("builtin", vec![fixed(Notify::Push, "push")]),
        )];
        let registry = StrategyRegistry::<Notify, dyn Notifier>::with_strategies(
            providers,
            vec![fixed(Notify::Sms, "sms")],
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.all().len(), 2);
        assert!(registry.all().contains_key(&3));
    }

    #[test]
    fn empty_registry_defaults() {
        let registry: StrategyRegistry<Notify, dyn Notifier> = StrategyRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }
}
