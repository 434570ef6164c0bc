use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::directory::{DirectoryError, ResidentDirectory};
use super::domain::{
    DocumentRequest, DocumentRequestSubmission, DocumentType, NoteEntry, RequestId, RequestStatus,
};
use super::fees::{FeeError, FeeQuote, FeeSchedule};
use super::stats::RequestStatistics;
use super::store::{
    paginate, PageRequest, RequestFilter, RequestPage, RequestRecord, RequestStore, StoreError,
};
use super::tracking::{track_by_reference, TrackingError, TrackingView};

/// The sole mutation gate for request status. Every transition is checked
/// against the state graph, stamped into the audit trail, and written with a
/// version check so concurrent clerks cannot trample each other:
///
/// ```text
/// PENDING -> UNDER_REVIEW -> APPROVED -> RELEASED
///    \            \
///     +------------+--> REJECTED
/// ```
///
/// RELEASED and REJECTED are terminal. APPROVED cannot be rejected; once an
/// official has certified a document its only exit is release.
pub struct RequestLifecycleService<S, D> {
    store: Arc<S>,
    directory: Arc<D>,
    fees: FeeSchedule,
}

/// Error raised by the lifecycle service. All variants are recoverable
/// business outcomes except `Store` and `Registry`, which signal
/// infrastructure trouble the caller should retry later.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("missing required field: {field}")]
    Validation { field: &'static str },
    #[error("cannot {action} a request in status '{current}'")]
    InvalidTransition {
        action: &'static str,
        current: RequestStatus,
    },
    #[error("request {0} not found")]
    RequestNotFound(RequestId),
    #[error("resident {0} is not on the registry")]
    ResidentNotFound(u64),
    #[error(transparent)]
    Fee(#[from] FeeError),
    #[error("request {id} was modified concurrently; reload and retry")]
    ConcurrentModification { id: RequestId },
    #[error(transparent)]
    Store(StoreError),
    #[error("resident registry unavailable: {0}")]
    Registry(String),
}

impl<S, D> RequestLifecycleService<S, D>
where
    S: RequestStore + 'static,
    D: ResidentDirectory + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, fees: FeeSchedule) -> Self {
        Self {
            store,
            directory,
            fees,
        }
    }

    /// Fee preview for the forms layer; same computation submit uses.
    pub fn quote(&self, document_type: DocumentType, is_urgent: bool) -> Result<FeeQuote, FeeError> {
        self.fees.quote(document_type, is_urgent)
    }

    /// File a new request. Quotes fee and priority, snapshots the resident's
    /// display fields from the registry, and stores the record as PENDING.
    pub fn submit(
        &self,
        submission: DocumentRequestSubmission,
    ) -> Result<RequestRecord, LifecycleError> {
        if submission.purpose.trim().is_empty() {
            return Err(LifecycleError::Validation { field: "purpose" });
        }

        let quote = self
            .fees
            .quote(submission.document_type, submission.is_urgent)?;

        let resident = self
            .directory
            .summary(submission.resident_id)
            .map_err(|err| match err {
                DirectoryError::NotFound(id) => LifecycleError::ResidentNotFound(id),
                DirectoryError::Unavailable(message) => LifecycleError::Registry(message),
            })?;

        let request = DocumentRequest {
            document_type: submission.document_type,
            resident_id: submission.resident_id,
            resident,
            purpose: submission.purpose.trim().to_string(),
            status: RequestStatus::Pending,
            priority: quote.priority,
            processing_fee: quote.processing_fee,
            certifying_official: None,
            request_date: Utc::now(),
            processed_date: None,
            notes: vec![NoteEntry::now(None, "request submitted")],
            requirements_submitted: submission.requirements_submitted,
        };

        let record = self
            .store
            .insert(request)
            .map_err(LifecycleError::Store)?;

        info!(
            request_id = record.id.0,
            document_type = record.request.document_type.label(),
            priority = record.request.priority.label(),
            fee = record.request.processing_fee,
            "document request submitted"
        );

        Ok(record)
    }

    /// PENDING -> UNDER_REVIEW.
    pub fn advance_to_review(&self, id: RequestId) -> Result<RequestRecord, LifecycleError> {
        self.transition(id, "review", |request| {
            if request.status != RequestStatus::Pending {
                return Err(LifecycleError::InvalidTransition {
                    action: "review",
                    current: request.status,
                });
            }
            request.status = RequestStatus::UnderReview;
            request
                .notes
                .push(NoteEntry::now(None, "moved to under review"));
            Ok(())
        })
    }

    /// {PENDING, UNDER_REVIEW} -> APPROVED. Records the certifying official
    /// and stamps `processed_date` on first processing.
    pub fn approve(
        &self,
        id: RequestId,
        certifying_official: &str,
        notes: Option<&str>,
    ) -> Result<RequestRecord, LifecycleError> {
        let official = certifying_official.trim();
        if official.is_empty() {
            return Err(LifecycleError::Validation {
                field: "certifying_official",
            });
        }
        let official = official.to_string();

        self.transition(id, "approve", move |request| {
            if !matches!(
                request.status,
                RequestStatus::Pending | RequestStatus::UnderReview
            ) {
                return Err(LifecycleError::InvalidTransition {
                    action: "approve",
                    current: request.status,
                });
            }
            request.status = RequestStatus::Approved;
            request.certifying_official = Some(official.clone());
            if request.processed_date.is_none() {
                request.processed_date = Some(Utc::now());
            }
            request
                .notes
                .push(NoteEntry::now(Some(&official), "approved for release"));
            push_extra_note(request, notes);
            Ok(())
        })
    }

    /// {PENDING, UNDER_REVIEW} -> REJECTED. The reason lands in the audit
    /// trail; the record stays queryable forever.
    pub fn reject(
        &self,
        id: RequestId,
        reason: &str,
        notes: Option<&str>,
    ) -> Result<RequestRecord, LifecycleError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(LifecycleError::Validation { field: "reason" });
        }
        let reason = reason.to_string();

        self.transition(id, "reject", move |request| {
            if !matches!(
                request.status,
                RequestStatus::Pending | RequestStatus::UnderReview
            ) {
                return Err(LifecycleError::InvalidTransition {
                    action: "reject",
                    current: request.status,
                });
            }
            request.status = RequestStatus::Rejected;
            if request.processed_date.is_none() {
                request.processed_date = Some(Utc::now());
            }
            request
                .notes
                .push(NoteEntry::now(None, format!("rejected: {reason}")));
            push_extra_note(request, notes);
            Ok(())
        })
    }

    /// APPROVED -> RELEASED. Only an approved request, which by construction
    /// carries a certifying official, can be handed over.
    pub fn release(
        &self,
        id: RequestId,
        notes: Option<&str>,
    ) -> Result<RequestRecord, LifecycleError> {
        self.transition(id, "release", move |request| {
            if request.status != RequestStatus::Approved {
                return Err(LifecycleError::InvalidTransition {
                    action: "release",
                    current: request.status,
                });
            }
            request.status = RequestStatus::Released;
            let official = request.certifying_official.clone();
            request.notes.push(NoteEntry::now(
                official.as_deref(),
                "released to requester",
            ));
            push_extra_note(request, notes);
            Ok(())
        })
    }

    pub fn get(&self, id: RequestId) -> Result<RequestRecord, LifecycleError> {
        self.store
            .fetch(id)
            .map_err(|err| map_store_error(id, err))?
            .ok_or(LifecycleError::RequestNotFound(id))
    }

    /// Filtered, paginated listing for clerk dashboards.
    pub fn list(
        &self,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> Result<RequestPage, LifecycleError> {
        let records = self
            .store
            .select(filter)
            .map_err(LifecycleError::Store)?;
        Ok(paginate(&records, page))
    }

    /// Aggregate counts over the store, optionally scoped by a filter.
    pub fn statistics(&self, scope: &RequestFilter) -> Result<RequestStatistics, LifecycleError> {
        let records = self
            .store
            .select(scope)
            .map_err(LifecycleError::Store)?;
        Ok(RequestStatistics::from_records(records.iter()))
    }

    /// Citizen-facing lookup by public reference number.
    pub fn track(&self, reference: &str) -> Result<TrackingView, TrackingError> {
        track_by_reference(self.store.as_ref(), reference)
    }

    /// Fetch, mutate a copy, write back with a version check. A failed guard
    /// or a lost version race leaves the stored record untouched.
    fn transition<F>(
        &self,
        id: RequestId,
        action: &'static str,
        mutate: F,
    ) -> Result<RequestRecord, LifecycleError>
    where
        F: FnOnce(&mut DocumentRequest) -> Result<(), LifecycleError>,
    {
        let record = self.get(id)?;
        let mut request = record.request.clone();
        mutate(&mut request)?;

        let updated = self
            .store
            .update(id, record.version, request)
            .map_err(|err| map_store_error(id, err))?;

        info!(
            request_id = id.0,
            action,
            status = updated.request.status.label(),
            "request transitioned"
        );

        Ok(updated)
    }
}

fn push_extra_note(request: &mut DocumentRequest, notes: Option<&str>) {
    if let Some(note) = notes {
        let note = note.trim();
        if !note.is_empty() {
            request.notes.push(NoteEntry::now(None, note));
        }
    }
}

fn map_store_error(id: RequestId, err: StoreError) -> LifecycleError {
    match err {
        StoreError::NotFound => LifecycleError::RequestNotFound(id),
        StoreError::VersionConflict { .. } => LifecycleError::ConcurrentModification { id },
        other => LifecycleError::Store(other),
    }
}
