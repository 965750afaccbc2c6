//! Error type shared by every fallible operation.

use crate::table::TableId;
use std::collections::TryReserveError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A split needed a directory deeper than `max_depth`. The failed insert's
    /// evictions are undone, so `unplaced` is always the key passed to
    /// `insert`: it is not stored and every key stored before remains.
    #[error("{table} directory would exceed depth {max_depth}; key {unplaced} was not placed")]
    DepthLimit {
        table: TableId,
        max_depth: u32,
        unplaced: i64,
    },

    #[error("directory allocation failed")]
    Allocation(#[from] TryReserveError),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },

    /// Keys can be inserted and looked up, never removed.
    #[error("deletion is not supported")]
    Unsupported,
}

impl Error {
    /// The key left without a bucket, if this error interrupted displacement.
    pub fn unplaced_key(&self) -> Option<i64> {
        match self {
            Error::DepthLimit { unplaced, .. } => Some(*unplaced),
            _ => None,
        }
    }
}
