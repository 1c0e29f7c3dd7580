//! Framework-originated errors.
//!
//! Handler and mapper failures are arbitrary domain errors carried as
//! `anyhow::Error` and are never wrapped by the framework. The enums here cover
//! only the conditions the framework itself raises.

/// Errors raised while registering or resolving strategies.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A second strategy claimed a code that is already registered.
    #[error("duplicate strategy registration, code={code}")]
    Duplicate { code: String },
    /// A raw code does not belong to the identifier domain.
    #[error("unknown {domain} code: {code}")]
    UnknownCode { domain: &'static str, code: String },
}

/// Errors raised by the explicit-next link chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A link forwarded past the tail of its chain.
    #[error("link chain `{chain}` has no next link")]
    EndOfChain { chain: String },
}
