//! The module contains the errors the engine can throw.
//!
//! The balance aggregation and settlement operations are total: they never
//! fail on well-formed input. Errors come from share preparation
//! ([`InvalidSplit`], [`InvalidAmount`]) and from lookups the server layer
//! funnels through the engine error type ([`KeyNotFound`], [`ExistingKey`]).
//!
//! [`InvalidSplit`]: EngineError::InvalidSplit
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`ExistingKey`]: EngineError::ExistingKey
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
}
