use std::collections::HashMap;
use std::sync::RwLock;

use priceguard_core::{ExpectedVersion, PriceItemId};
use priceguard_lifecycle::{PriceStatusRecord, StatusHistoryEntry};

use super::{StatusStore, StoreError, VersionedRecord};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<PriceItemId, VersionedRecord>,
    /// Insertion order, so `list()` is deterministic.
    order: Vec<PriceItemId>,
}

/// In-memory status store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    inner: RwLock<Inner>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with records, bypassing version checks. Each record
    /// lands at version 1.
    pub fn seed(&self, records: impl IntoIterator<Item = PriceStatusRecord>) {
        for record in records {
            // Seeding cannot conflict; Any always matches.
            let _ = self.put(record, ExpectedVersion::Any);
        }
    }
}

impl StatusStore for InMemoryStatusStore {
    fn get(&self, id: PriceItemId) -> Result<Option<VersionedRecord>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        Ok(inner.records.get(&id).cloned())
    }

    fn put(
        &self,
        record: PriceStatusRecord,
        expected: ExpectedVersion,
    ) -> Result<u64, StoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let id = record.id;
        let current = inner.records.get(&id).map(|v| v.version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(StoreError::Concurrency(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        let version = current + 1;
        if !inner.records.contains_key(&id) {
            inner.order.push(id);
        }
        inner.records.insert(id, VersionedRecord { record, version });
        Ok(version)
    }

    fn append_history(
        &self,
        id: PriceItemId,
        entry: StatusHistoryEntry,
        expected: ExpectedVersion,
    ) -> Result<VersionedRecord, StoreError> {
        if entry.reason.trim().is_empty() {
            return Err(StoreError::InvalidAppend(
                "history entries require a non-empty reason".to_string(),
            ));
        }

        let mut inner = self
            .inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        let versioned = inner
            .records
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;

        if !expected.matches(versioned.version) {
            return Err(StoreError::Concurrency(format!(
                "expected {expected:?}, found {}",
                versioned.version
            )));
        }

        // History is append-only and must not move time backwards.
        if let Some(last) = versioned.record.status_history.last() {
            if entry.timestamp < last.timestamp {
                return Err(StoreError::InvalidAppend(format!(
                    "entry timestamp {} precedes last history entry {}",
                    entry.timestamp, last.timestamp
                )));
            }
        }

        versioned.record.current_status = entry.status.clone();
        versioned.record.last_status_check = Some(entry.timestamp);
        versioned.record.status_history.push(entry);
        versioned.version += 1;

        Ok(versioned.clone())
    }

    fn list(&self) -> Result<Vec<PriceStatusRecord>, StoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;

        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id))
            .map(|v| v.record.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use priceguard_catalog::{well_known, StatusId};
    use priceguard_core::{ProductId, VendorId};

    fn record(status: &str) -> PriceStatusRecord {
        let now = Utc::now();
        PriceStatusRecord::new(
            PriceItemId::new(),
            ProductId::new(),
            "Paper Towels 12pk",
            VendorId::new(),
            "CleanCo Supplies",
            StatusId::new(status),
            now - Duration::days(10),
            now + Duration::days(90),
            7,
        )
    }

    fn entry(status: &str, at: chrono::DateTime<Utc>) -> StatusHistoryEntry {
        StatusHistoryEntry {
            status: StatusId::new(status),
            timestamp: at,
            changed_by: "alice".to_string(),
            reason: "manual review".to_string(),
        }
    }

    #[test]
    fn put_and_get_round_trip_with_versions() {
        let store = InMemoryStatusStore::new();
        let r = record(well_known::ACTIVE);
        let id = r.id;

        let v1 = store.put(r.clone(), ExpectedVersion::Exact(0)).unwrap();
        assert_eq!(v1, 1);

        let fetched = store.get(id).unwrap().unwrap();
        assert_eq!(fetched.version, 1);
        assert_eq!(fetched.record, r);

        // Stale write is rejected.
        let err = store.put(r, ExpectedVersion::Exact(0)).unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));
    }

    #[test]
    fn get_missing_record_is_none() {
        let store = InMemoryStatusStore::new();
        assert!(store.get(PriceItemId::new()).unwrap().is_none());
    }

    #[test]
    fn append_history_projects_status_and_bumps_version() {
        let store = InMemoryStatusStore::new();
        let r = record(well_known::ACTIVE);
        let id = r.id;
        store.seed([r]);

        let now = Utc::now();
        let updated = store
            .append_history(id, entry(well_known::EXPIRING, now), ExpectedVersion::Exact(1))
            .unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.record.current_status, StatusId::new(well_known::EXPIRING));
        assert_eq!(updated.record.status_history.len(), 1);
        assert_eq!(updated.record.last_status_check, Some(now));
        assert!(updated.record.history_is_consistent());
    }

    #[test]
    fn append_history_to_missing_record_fails() {
        let store = InMemoryStatusStore::new();
        let err = store
            .append_history(
                PriceItemId::new(),
                entry(well_known::EXPIRED, Utc::now()),
                ExpectedVersion::Any,
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn append_history_rejects_stale_version() {
        let store = InMemoryStatusStore::new();
        let r = record(well_known::ACTIVE);
        let id = r.id;
        store.seed([r]);

        let err = store
            .append_history(
                id,
                entry(well_known::EXPIRING, Utc::now()),
                ExpectedVersion::Exact(7),
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));
    }

    #[test]
    fn append_history_rejects_backwards_time_and_blank_reason() {
        let store = InMemoryStatusStore::new();
        let r = record(well_known::ACTIVE);
        let id = r.id;
        store.seed([r]);

        let now = Utc::now();
        store
            .append_history(id, entry(well_known::EXPIRING, now), ExpectedVersion::Any)
            .unwrap();

        let backwards = store
            .append_history(
                id,
                entry(well_known::EXPIRED, now - Duration::hours(1)),
                ExpectedVersion::Any,
            )
            .unwrap_err();
        assert!(matches!(backwards, StoreError::InvalidAppend(_)));

        let mut blank = entry(well_known::EXPIRED, now + Duration::hours(1));
        blank.reason = "   ".to_string();
        let err = store.append_history(id, blank, ExpectedVersion::Any).unwrap_err();
        assert!(matches!(err, StoreError::InvalidAppend(_)));
    }

    #[test]
    fn list_preserves_insertion_order() {
        let store = InMemoryStatusStore::new();
        let a = record(well_known::ACTIVE);
        let b = record(well_known::EXPIRED);
        let c = record(well_known::EXPIRING);
        let ids = [a.id, b.id, c.id];
        store.seed([a, b, c]);

        let listed: Vec<_> = store.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);
    }
}
