//! The status-record persistence port.
//!
//! The engine is a stateless orchestrator over an externally owned store.
//! This port is the narrow contract it requires: versioned reads, optimistic
//! writes, and an append-only history operation. The in-memory
//! implementation here stands in for a transactional backend.

mod in_memory;

pub use in_memory::InMemoryStatusStore;

use std::sync::Arc;

use thiserror::Error;

use priceguard_core::{ExpectedVersion, PriceItemId};
use priceguard_lifecycle::{PriceStatusRecord, StatusHistoryEntry};

/// A record together with its storage version.
///
/// The version is the optimistic-concurrency token: every mutation carries
/// the version observed at read time and fails when it no longer matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    pub record: PriceStatusRecord,
    pub version: u64,
}

/// Store operation error.
///
/// Infrastructure failures only; transition legality is decided before the
/// store is touched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("price record '{0}' not found")]
    NotFound(PriceItemId),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Versioned store of price status records.
///
/// Implementations must:
/// - enforce optimistic concurrency on every mutation (`ExpectedVersion`);
/// - keep `append_history` atomic per record: push the entry, refresh the
///   cached `current_status` and `last_status_check`, bump the version;
/// - reject history appends that move time backwards or carry a blank
///   reason (the history is an audit log);
/// - serialize concurrent mutations per record (different records are
///   fully independent).
pub trait StatusStore: Send + Sync {
    /// Fetch one record with its version. `None` is a normal outcome.
    fn get(&self, id: PriceItemId) -> Result<Option<VersionedRecord>, StoreError>;

    /// Insert or replace a record. Returns the new version.
    ///
    /// A missing record has version 0, so `ExpectedVersion::Exact(0)` is a
    /// create-only write.
    fn put(
        &self,
        record: PriceStatusRecord,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError>;

    /// Append one history entry to an existing record and project it onto
    /// the cached status fields. Returns the updated record.
    fn append_history(
        &self,
        id: PriceItemId,
        entry: StatusHistoryEntry,
        expected: ExpectedVersion,
    ) -> Result<VersionedRecord, StoreError>;

    /// Snapshot of the full population, in stable (insertion) order.
    fn list(&self) -> Result<Vec<PriceStatusRecord>, StoreError>;
}

impl<S> StatusStore for Arc<S>
where
    S: StatusStore + ?Sized,
{
    fn get(&self, id: PriceItemId) -> Result<Option<VersionedRecord>, StoreError> {
        (**self).get(id)
    }

    fn put(
        &self,
        record: PriceStatusRecord,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        (**self).put(record, expected)
    }

    fn append_history(
        &self,
        id: PriceItemId,
        entry: StatusHistoryEntry,
        expected: ExpectedVersion,
    ) -> Result<VersionedRecord, StoreError> {
        (**self).append_history(id, entry, expected)
    }

    fn list(&self) -> Result<Vec<PriceStatusRecord>, StoreError> {
        (**self).list()
    }
}
