use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::requests::directory::{DirectoryError, ResidentDirectory};
use crate::requests::domain::{
    DocumentRequest, DocumentRequestSubmission, DocumentType, Priority, RequestId, RequestStatus,
    ResidentSummary,
};
use crate::requests::fees::FeeSchedule;
use crate::requests::lifecycle::RequestLifecycleService;
use crate::requests::store::{
    order_stable, RequestFilter, RequestRecord, RequestStore, StoreError,
};

/// In-memory store double mirroring the API service's production default:
/// id sequence per store, version check on update, stable select ordering.
#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<HashMap<RequestId, RequestRecord>>,
    next_id: AtomicU64,
}

impl RequestStore for MemoryStore {
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

/// Store double whose every call fails, for infrastructure-error paths.
pub(super) struct UnavailableStore;

impl RequestStore for UnavailableStore {
    fn insert(&self, _request: DocumentRequest) -> Result<RequestRecord, StoreError> {
        Err(StoreError::Unavailable("db offline".to_string()))
    }

    fn fetch(&self, _id: RequestId) -> Result<Option<RequestRecord>, StoreError> {
        Err(StoreError::Unavailable("db offline".to_string()))
    }

    fn update(
        &self,
        _id: RequestId,
        _expected_version: u64,
        _request: DocumentRequest,
    ) -> Result<RequestRecord, StoreError> {
        Err(StoreError::Unavailable("db offline".to_string()))
    }

    fn select(&self, _filter: &RequestFilter) -> Result<Vec<RequestRecord>, StoreError> {
        Err(StoreError::Unavailable("db offline".to_string()))
    }
}

/// Store double that reads normally but loses every version race, to force
/// the concurrent-modification path deterministically.
#[derive(Default)]
pub(super) struct RacingStore {
    pub(super) inner: MemoryStore,
}

impl RequestStore for RacingStore {
    fn insert(&self, request: DocumentRequest) -> Result<RequestRecord, StoreError> {
        self.inner.insert(request)
    }

    fn fetch(&self, id: RequestId) -> Result<Option<RequestRecord>, StoreError> {
        self.inner.fetch(id)
    }

    fn update(
        &self,
        _id: RequestId,
        expected_version: u64,
        _request: DocumentRequest,
    ) -> Result<RequestRecord, StoreError> {
        Err(StoreError::VersionConflict {
            expected: expected_version,
            stored: expected_version + 1,
        })
    }

    fn select(&self, filter: &RequestFilter) -> Result<Vec<RequestRecord>, StoreError> {
        self.inner.select(filter)
    }
}

pub(super) struct MemoryDirectory {
    residents: HashMap<u64, ResidentSummary>,
}

impl MemoryDirectory {
    pub(super) fn seeded() -> Self {
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

impl ResidentDirectory for MemoryDirectory {
    fn summary(&self, resident_id: u64) -> Result<ResidentSummary, DirectoryError> {
        self.residents
            .get(&resident_id)
            .cloned()
            .ok_or(DirectoryError::NotFound(resident_id))
    }
}

pub(super) struct UnavailableDirectory;

impl ResidentDirectory for UnavailableDirectory {
    fn summary(&self, _resident_id: u64) -> Result<ResidentSummary, DirectoryError> {
        Err(DirectoryError::Unavailable("registry offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    Arc<RequestLifecycleService<MemoryStore, MemoryDirectory>>,
    Arc<MemoryStore>,
) {
    let store = Arc::new(MemoryStore::default());
    let directory = Arc::new(MemoryDirectory::seeded());
    let service = Arc::new(RequestLifecycleService::new(
        store.clone(),
        directory,
        FeeSchedule::standard(),
    ));
    (service, store)
}

pub(super) fn indigency_submission() -> DocumentRequestSubmission {
    DocumentRequestSubmission {
        document_type: DocumentType::CertificateOfIndigency,
        resident_id: 7,
        purpose: "Medical Assistance".to_string(),
        is_urgent: true,
        requirements_submitted: vec!["Valid ID".to_string()],
    }
}

pub(super) fn clearance_submission() -> DocumentRequestSubmission {
    DocumentRequestSubmission {
        document_type: DocumentType::BarangayClearance,
        resident_id: 12,
        purpose: "Employment requirement".to_string(),
        is_urgent: false,
        requirements_submitted: vec!["Valid ID".to_string(), "Cedula".to_string()],
    }
}

pub(super) fn permit_submission() -> DocumentRequestSubmission {
    DocumentRequestSubmission {
        document_type: DocumentType::BusinessPermit,
        resident_id: 31,
        purpose: "Sari-sari store renewal".to_string(),
        is_urgent: true,
        requirements_submitted: vec!["DTI registration".to_string()],
    }
}

/// Hand-built record for store and statistics tests that need fixed dates.
pub(super) fn request_at(
    date: DateTime<Utc>,
    document_type: DocumentType,
    status: RequestStatus,
    resident_name: &str,
    purpose: &str,
) -> DocumentRequest {
    DocumentRequest {
        document_type,
        resident_id: 1,
        resident: ResidentSummary {
            name: resident_name.to_string(),
            address: "Purok 1".to_string(),
            contact_number: "0900-555-0000".to_string(),
        },
        purpose: purpose.to_string(),
        status,
        priority: Priority::Normal,
        processing_fee: 50,
        certifying_official: None,
        request_date: date,
        processed_date: None,
        notes: Vec::new(),
        requirements_submitted: Vec::new(),
    }
}

pub(super) fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 9, 0, 0).single().expect("valid date")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body collects");
    serde_json::from_slice(&bytes).expect("json body")
}
