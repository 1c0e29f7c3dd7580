use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Read/write access to the continue/stop control flag of an execution context.
///
/// Implemented by [`DynamicContext`]; caller-defined context types implement it
/// to work with [`crate::handler::next`] and [`crate::handler::stop`].
pub trait Proceed {
    fn is_proceed(&self) -> bool;

    fn set_proceed(&mut self, proceed: bool);
}

/// Per-request mutable state: an untyped key-value bag plus a proceed flag.
///
/// One instance is created per logical request and passed by `&mut` through
/// every handler invoked for that request. It is not internally synchronized.
pub struct DynamicContext {
    proceed: bool,
    data: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl DynamicContext {
    /// Create an empty context with `proceed = true`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            proceed: true,
            data: HashMap::new(),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn set_value<V: Any + Send + Sync>(&mut self, key: impl Into<String>, value: V) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Value stored under `key`. `None` if the key is missing or holds another type.
    #[must_use]
    pub fn get_value<V: Any>(&self, key: &str) -> Option<&V> {
        self.data.get(key).and_then(|value| value.downcast_ref::<V>())
    }

    #[must_use]
    pub fn get_value_mut<V: Any>(&mut self, key: &str) -> Option<&mut V> {
        self.data.get_mut(key).and_then(|value| value.downcast_mut::<V>())
    }

    /// Remove and return the value under `key` if it has type `V`.
    ///
    /// A value of another type is left in place.
    pub fn take_value<V: Any>(&mut self, key: &str) -> Option<V> {
        if !self.data.get(key).is_some_and(|value| value.is::<V>()) {
            return None;
        }
        let value = self.data.remove(key)?;
        value.downcast::<V>().ok().map(|boxed| *boxed)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Proceed for DynamicContext {
    fn is_proceed(&self) -> bool {
        self.proceed
    }

    fn set_proceed(&mut self, proceed: bool) {
        self.proceed = proceed;
    }
}

impl Default for DynamicContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DynamicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.data.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("DynamicContext")
            .field("proceed", &self.proceed)
            .field("keys", &keys)
            .finish()
    }
}
