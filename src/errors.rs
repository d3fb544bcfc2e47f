//! Error taxonomy for the store.
//!
//! Three kinds cover the whole surface: `InvalidKey` is rejected before any
//! filesystem access, `NotFound` is the point-operation miss, and `Io` carries
//! every other filesystem failure through to the caller. Enumeration paths
//! absorb not-found conditions into empty results themselves and never emit
//! `NotFound` from here.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object identifier `{id}`: {reason}")]
    InvalidKey { id: String, reason: &'static str },
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn invalid_key(id: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidKey {
            id: id.into(),
            reason,
        }
    }

    /// True when the underlying cause is a missing filesystem entry.
    ///
    /// Lets callers map either variant onto a 404-style response without
    /// matching twice.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Io(err) => err.kind() == io::ErrorKind::NotFound,
            Self::InvalidKey { .. } => false,
        }
    }
}
