//! Winter Core: chain-of-responsibility executor, strategy routing tree, and
//! code-keyed strategy registry.

pub mod chain;
pub mod context;
pub mod error;
pub mod handler;
pub mod link;
pub mod linked_list;
pub mod strategy;
pub mod tree;

pub use chain::{BusinessChain, SharedLogicHandler};
pub use context::{DynamicContext, Proceed};
pub use error::{ChainError, RegistryError};
pub use handler::{next, stop, Flow, LogicHandler};
pub use link::{LinkChain, LogicLink, Next};
pub use linked_list::LinkedList;
pub use strategy::{
    RegistryBuilder, StaticProvider, Strategy, StrategyKind, StrategyProvider, StrategyRegistry,
};
pub use tree::{
    EmptyHandler, RegistryRouter, RoutedStrategy, Router, SharedHandler, StrategyHandler,
    StrategyMapper, StrategyRouter,
};
