use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use brgy_docs::requests::{
    order_stable, DirectoryError, DocumentRequest, RequestFilter, RequestId, RequestRecord,
    RequestStore, ResidentDirectory, ResidentSummary, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Default store backing the service: a mutex-guarded map with a monotonic
/// id sequence and a version check on update, matching the contract a
/// database-backed store would honor with row versioning.
#[derive(Default)]
pub(crate) struct InMemoryRequestStore {
    records: Mutex<HashMap<RequestId, RequestRecord>>,
    next_id: AtomicU64,
}

impl RequestStore for InMemoryRequestStore {
    fn insert(&self, request: DocumentRequest) -> Result<RequestRecord, StoreError> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let record = RequestRecord {
            id,
            version: 1,
            request,
        };
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: RequestId) -> Result<Option<RequestRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn update(
        &self,
        id: RequestId,
        expected_version: u64,
        request: DocumentRequest,
    ) -> Result<RequestRecord, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let stored = guard.get_mut(&id).ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                stored: stored.version,
            });
        }
        stored.version += 1;
        stored.request = request;
        Ok(stored.clone())
    }

    fn select(&self, filter: &RequestFilter) -> Result<Vec<RequestRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        let mut records: Vec<RequestRecord> = guard
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        order_stable(&mut records);
        Ok(records)
    }
}

/// Stand-in for the externally-owned resident registry. A deployment wires
/// the registry service here; the seeded roster keeps `serve` and `demo`
/// usable out of the box.
pub(crate) struct SeededResidentDirectory {
    residents: HashMap<u64, ResidentSummary>,
}

impl SeededResidentDirectory {
    pub(crate) fn sample_roster() -> Self {
        let mut residents = HashMap::new();
        residents.insert(
            7,
            ResidentSummary {
                name: "Maria Dela Cruz".to_string(),
                address: "Purok 2, Sitio Malinis".to_string(),
                contact_number: "0917-555-0107".to_string(),
            },
        );
        residents.insert(
            12,
            ResidentSummary {
                name: "Jose Ramirez".to_string(),
                address: "Blk 4 Lot 9, Villa Esperanza".to_string(),
                contact_number: "0928-555-0112".to_string(),
            },
        );
        residents.insert(
            31,
            ResidentSummary {
                name: "Ana Santos".to_string(),
                address: "Purok 5, Riverside".to_string(),
                contact_number: "0906-555-0131".to_string(),
            },
        );
        Self { residents }
    }
}

impl ResidentDirectory for SeededResidentDirectory {
    fn summary(&self, resident_id: u64) -> Result<ResidentSummary, DirectoryError> {
        self.residents
            .get(&resident_id)
            .cloned()
            .ok_or(DirectoryError::NotFound(resident_id))
    }
}
