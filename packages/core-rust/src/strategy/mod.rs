//! Strategy registry: pluggable implementations resolved by a stable identifier.
//!
//! - [`kind`]: the identifier capability (`code`, `desc`) and the
//!   [`strategy_kind!`](crate::strategy_kind) declaration macro
//! - [`registry`]: discovery plus manual registration with uniqueness enforcement

pub mod kind;
pub mod registry;

pub use kind::StrategyKind;
pub use registry::{RegistryBuilder, StaticProvider, Strategy, StrategyProvider, StrategyRegistry};
