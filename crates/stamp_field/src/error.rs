//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration, unresolved field or pattern references, malformed import data
//! and IO.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown field '{id}'")]
    UnknownField { id: String },

    #[error("unknown pattern '{name}'")]
    UnknownPattern { name: String },

    #[error("field import error: {0}")]
    Import(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
