//! The module contains the errors the engine can throw.
//!
//! The settlement core itself never fails on well-formed input: unknown groups
//! and unallocatable expenses simply produce empty results. Errors come from
//! the edges:
//!
//! - [`InvalidTolerance`] when ε is misconfigured (negative).
//! - [`SelfSettlement`] when a user tries to settle with themself.
//! - [`Database`] when the ledger storage fails; propagated unchanged.
//!
//!  [`InvalidTolerance`]: EngineError::InvalidTolerance
//!  [`SelfSettlement`]: EngineError::SelfSettlement
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Cannot settle with yourself: {0}")]
    SelfSettlement(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidTolerance(a), Self::InvalidTolerance(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::SelfSettlement(a), Self::SelfSettlement(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
