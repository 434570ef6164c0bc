use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    DocumentRequest, DocumentType, NoteEntry, Priority, RequestId, RequestStatus,
};
use super::tracking::ReferenceNumber;

/// Stored request plus the bookkeeping the engine needs: the store-assigned
/// id and an optimistic-concurrency version bumped on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: RequestId,
    pub version: u64,
    pub request: DocumentRequest,
}

impl RequestRecord {
    pub fn reference_number(&self) -> ReferenceNumber {
        ReferenceNumber::from_id(self.id)
    }

    /// Row for clerk dashboards and the list endpoint.
    pub fn summary_view(&self) -> RequestSummaryView {
        RequestSummaryView {
            id: self.id,
            reference_number: self.reference_number().to_string(),
            document_type: self.request.document_type.label(),
            resident_name: self.request.resident.name.clone(),
            purpose: self.request.purpose.clone(),
            status: self.request.status.label(),
            priority: self.request.priority.label(),
            processing_fee: self.request.processing_fee,
            request_date: self.request.request_date,
            processed_date: self.request.processed_date,
        }
    }

    /// Full clerk-facing view, audit trail included.
    pub fn detail_view(&self) -> RequestDetailView {
        RequestDetailView {
            id: self.id,
            reference_number: self.reference_number().to_string(),
            document_type: self.request.document_type.label(),
            resident_id: self.request.resident_id,
            resident_name: self.request.resident.name.clone(),
            resident_address: self.request.resident.address.clone(),
            purpose: self.request.purpose.clone(),
            status: self.request.status.label(),
            priority: self.request.priority.label(),
            processing_fee: self.request.processing_fee,
            certifying_official: self.request.certifying_official.clone(),
            request_date: self.request.request_date,
            processed_date: self.request.processed_date,
            notes: self.request.notes.clone(),
            requirements_submitted: self.request.requirements_submitted.clone(),
        }
    }
}

/// Storage abstraction so the lifecycle service can be exercised against
/// in-memory doubles. `update` must be atomic per id: the write lands only
/// if the stored version still equals `expected_version`.
pub trait RequestStore: Send + Sync {
    fn insert(&self, request: DocumentRequest) -> Result<RequestRecord, StoreError>;
    fn fetch(&self, id: RequestId) -> Result<Option<RequestRecord>, StoreError>;
    fn update(
        &self,
        id: RequestId,
        expected_version: u64,
        request: DocumentRequest,
    ) -> Result<RequestRecord, StoreError>;
    /// Matching records in stable order: newest `request_date` first, ties
    /// broken by ascending id, so pagination is deterministic across pages.
    fn select(&self, filter: &RequestFilter) -> Result<Vec<RequestRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("stale write: expected version {expected}, stored version {stored}")]
    VersionConflict { expected: u64, stored: u64 },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Predicate over stored requests. All fields are conjunctive; `Default`
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub document_type: Option<DocumentType>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring over resident name and purpose.
    pub search: Option<String>,
    /// Inclusive bounds over the calendar date of `request_date` (UTC).
    pub submitted_from: Option<NaiveDate>,
    pub submitted_to: Option<NaiveDate>,
}

impl RequestFilter {
    pub fn matches(&self, record: &RequestRecord) -> bool {
        let request = &record.request;

        if self.status.is_some_and(|status| request.status != status) {
            return false;
        }
        if self
            .document_type
            .is_some_and(|document_type| request.document_type != document_type)
        {
            return false;
        }
        if self
            .priority
            .is_some_and(|priority| request.priority != priority)
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = request.resident.name.to_lowercase().contains(&needle);
            let in_purpose = request.purpose.to_lowercase().contains(&needle);
            if !in_name && !in_purpose {
                return false;
            }
        }
        let submitted_on = request.request_date.date_naive();
        if self.submitted_from.is_some_and(|from| submitted_on < from) {
            return false;
        }
        if self.submitted_to.is_some_and(|to| submitted_on > to) {
            return false;
        }
        true
    }
}

/// Sort into the store's stable listing order. Implementations call this
/// from `select` so every backend pages identically.
pub fn order_stable(records: &mut [RequestRecord]) {
    records.sort_by(|a, b| {
        b.request
            .request_date
            .cmp(&a.request.request_date)
            .then(a.id.cmp(&b.id))
    });
}

/// One-based page selector for the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const DEFAULT_PER_PAGE: u32 = 20;
    pub const MAX_PER_PAGE: u32 = 100;

    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of list results with the totals dashboards paginate against.
#[derive(Debug, Clone, Serialize)]
pub struct RequestPage {
    pub items: Vec<RequestSummaryView>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// Slice ordered records into a page of summary rows.
pub fn paginate(records: &[RequestRecord], page: PageRequest) -> RequestPage {
    let start = (page.page as usize - 1).saturating_mul(page.per_page as usize);
    let items = records
        .iter()
        .skip(start)
        .take(page.per_page as usize)
        .map(RequestRecord::summary_view)
        .collect();

    RequestPage {
        items,
        total: records.len() as u64,
        page: page.page,
        per_page: page.per_page,
    }
}

/// Dashboard table row.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummaryView {
    pub id: RequestId,
    pub reference_number: String,
    pub document_type: &'static str,
    pub resident_name: String,
    pub purpose: String,
    pub status: &'static str,
    pub priority: &'static str,
    pub processing_fee: u32,
    pub request_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_date: Option<DateTime<Utc>>,
}

/// Clerk detail view returned by submit and every transition endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetailView {
    pub id: RequestId,
    pub reference_number: String,
    pub document_type: &'static str,
    pub resident_id: u64,
    pub resident_name: String,
    pub resident_address: String,
    pub purpose: String,
    pub status: &'static str,
    pub priority: &'static str,
    pub processing_fee: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifying_official: Option<String>,
    pub request_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_date: Option<DateTime<Utc>>,
    pub notes: Vec<NoteEntry>,
    pub requirements_submitted: Vec<String>,
}
