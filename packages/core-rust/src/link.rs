//! Explicit-next link chain.
//!
//! Unlike [`crate::chain::BusinessChain`], which decides on its members' behalf
//! whether to continue, each [`LogicLink`] receives a [`Next`] handle and
//! forwards to its successor itself, possibly transforming the result.

use std::fmt;

use crate::error::ChainError;
use crate::tree::StrategyHandler;

/// A link that may forward to its successor through `next`.
pub trait LogicLink<T, D, R>: Send + Sync {
    /// # Errors
    ///
    /// Any domain error, or `ChainError::EndOfChain` when forwarding past the tail.
    fn apply(&self, request: &T, context: &mut D, next: Next<'_, T, D, R>) -> anyhow::Result<R>;
}

/// Handle to the remainder of a [`LinkChain`].
pub struct Next<'a, T, D, R> {
    chain: &'a str,
    rest: &'a [Box<dyn LogicLink<T, D, R>>],
}

impl<T, D, R> Next<'_, T, D, R> {
    /// Whether a successor exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        !self.rest.is_empty()
    }

    /// Forward to the successor.
    ///
    /// # Errors
    ///
    /// The successor's error, or `ChainError::EndOfChain` if there is none.
    pub fn run(self, request: &T, context: &mut D) -> anyhow::Result<R> {
        match self.rest.split_first() {
            Some((link, rest)) => link.apply(
                request,
                context,
                Next {
                    chain: self.chain,
                    rest,
                },
            ),
            None => Err(ChainError::EndOfChain {
                chain: self.chain.to_string(),
            }
            .into()),
        }
    }
}

/// A named, singly-linked chain of [`LogicLink`]s, assembled head first.
pub struct LinkChain<T, D, R> {
    name: String,
    links: Vec<Box<dyn LogicLink<T, D, R>>>,
}

impl<T, D, R> LinkChain<T, D, R> {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            links: Vec::new(),
        }
    }

    /// Attach `link` after the current tail.
    #[must_use]
    pub fn append_next(mut self, link: impl LogicLink<T, D, R> + 'static) -> Self {
        self.links.push(Box::new(link));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Run the chain from its head.
    ///
    /// # Errors
    ///
    /// Any link's error; `ChainError::EndOfChain` for an empty chain.
    pub fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        Next {
            chain: &self.name,
            rest: &self.links,
        }
        .run(request, context)
    }
}

impl<T, D, R> StrategyHandler<T, D, R> for LinkChain<T, D, R> {
    fn apply(&self, request: &T, context: &mut D) -> anyhow::Result<R> {
        LinkChain::apply(self, request, context)
    }
}

impl<T, D, R> fmt::Debug for LinkChain<T, D, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkChain")
            .field("name", &self.name)
            .field("links", &self.links.len())
            .finish()
    }
}
