use std::sync::Arc;

use super::common::*;
use crate::requests::domain::{DocumentType, Priority, RequestId, RequestStatus};
use crate::requests::fees::FeeSchedule;
use crate::requests::lifecycle::{LifecycleError, RequestLifecycleService};
use crate::requests::store::{RequestStore, StoreError};

#[test]
fn urgent_indigency_request_is_free_and_high_priority() {
    let (service, _) = build_service();

    let record = service
        .submit(indigency_submission())
        .expect("submission succeeds");

    assert_eq!(record.request.processing_fee, 0);
    assert_eq!(record.request.priority, Priority::High);
    assert_eq!(record.request.status, RequestStatus::Pending);
    assert_eq!(record.request.resident.name, "Maria Dela Cruz");
}

#[test]
fn clearance_quotes_base_fee_and_rejection_is_terminal() {
    let (service, _) = build_service();

    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");
    assert_eq!(record.request.processing_fee, 50);
    assert_eq!(record.request.priority, Priority::Normal);

    let rejected = service
        .reject(record.id, "missing valid ID", None)
        .expect("rejection succeeds");
    assert_eq!(rejected.request.status, RequestStatus::Rejected);
    assert!(rejected
        .request
        .notes
        .iter()
        .any(|note| note.entry == "rejected: missing valid ID"));

    match service.approve(record.id, "Hon. Reyes", None) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::Rejected);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn permit_walks_the_full_happy_path() {
    let (service, _) = build_service();

    let record = service
        .submit(permit_submission())
        .expect("submission succeeds");
    assert_eq!(record.request.processing_fee, 100);
    assert!(record.request.processed_date.is_none());

    let reviewed = service
        .advance_to_review(record.id)
        .expect("review succeeds");
    assert_eq!(reviewed.request.status, RequestStatus::UnderReview);

    let approved = service
        .approve(record.id, "Hon. Reyes", Some("requirements complete"))
        .expect("approval succeeds");
    assert_eq!(approved.request.status, RequestStatus::Approved);
    assert_eq!(
        approved.request.certifying_official.as_deref(),
        Some("Hon. Reyes")
    );
    let processed = approved
        .request
        .processed_date
        .expect("processed date stamped on approval");

    let released = service.release(record.id, None).expect("release succeeds");
    assert_eq!(released.request.status, RequestStatus::Released);
    // First processing stamp is never overwritten.
    assert_eq!(released.request.processed_date, Some(processed));
}

#[test]
fn approve_is_legal_directly_from_pending() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");

    let approved = service
        .approve(record.id, "Hon. Reyes", None)
        .expect("approval from pending succeeds");
    assert_eq!(approved.request.status, RequestStatus::Approved);
}

#[test]
fn submit_requires_a_purpose() {
    let (service, _) = build_service();
    let mut submission = clearance_submission();
    submission.purpose = "   ".to_string();

    match service.submit(submission) {
        Err(LifecycleError::Validation { field }) => assert_eq!(field, "purpose"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn submit_refuses_unknown_residents() {
    let (service, _) = build_service();
    let mut submission = clearance_submission();
    submission.resident_id = 9999;

    match service.submit(submission) {
        Err(LifecycleError::ResidentNotFound(id)) => assert_eq!(id, 9999),
        other => panic!("expected resident not found, got {other:?}"),
    }
}

#[test]
fn registry_outage_is_reported_as_infrastructure() {
    let store = Arc::new(MemoryStore::default());
    let service = RequestLifecycleService::new(
        store,
        Arc::new(UnavailableDirectory),
        FeeSchedule::standard(),
    );

    match service.submit(clearance_submission()) {
        Err(LifecycleError::Registry(message)) => assert!(message.contains("offline")),
        other => panic!("expected registry error, got {other:?}"),
    }
}

#[test]
fn approve_requires_a_certifying_official() {
    let (service, _) = build_service();

    let pending = service
        .submit(clearance_submission())
        .expect("submission succeeds");
    match service.approve(pending.id, "  ", None) {
        Err(LifecycleError::Validation { field }) => assert_eq!(field, "certifying_official"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let reviewed = service
        .advance_to_review(pending.id)
        .expect("review succeeds");
    assert_eq!(reviewed.request.status, RequestStatus::UnderReview);
    match service.approve(pending.id, "", None) {
        Err(LifecycleError::Validation { field }) => assert_eq!(field, "certifying_official"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn reject_requires_a_reason() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");

    match service.reject(record.id, "", None) {
        Err(LifecycleError::Validation { field }) => assert_eq!(field, "reason"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn release_requires_approved_status() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");

    match service.release(record.id, None) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::Pending);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    service
        .advance_to_review(record.id)
        .expect("review succeeds");
    match service.release(record.id, None) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::UnderReview);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    service
        .reject(record.id, "incomplete papers", None)
        .expect("rejection succeeds");
    match service.release(record.id, None) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::Rejected);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn review_only_moves_pending_requests() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");

    service
        .advance_to_review(record.id)
        .expect("first review succeeds");

    match service.advance_to_review(record.id) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::UnderReview);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn approved_requests_cannot_be_rejected() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");
    service
        .approve(record.id, "Hon. Reyes", None)
        .expect("approval succeeds");

    match service.reject(record.id, "changed my mind", None) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::Approved);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
}

#[test]
fn released_requests_accept_no_further_transitions() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");
    service
        .approve(record.id, "Hon. Reyes", None)
        .expect("approval succeeds");
    service.release(record.id, None).expect("release succeeds");

    assert!(matches!(
        service.release(record.id, None),
        Err(LifecycleError::InvalidTransition { .. })
    ));
    assert!(matches!(
        service.approve(record.id, "Hon. Reyes", None),
        Err(LifecycleError::InvalidTransition { .. })
    ));
}

#[test]
fn every_transition_appends_to_the_audit_trail() {
    let (service, _) = build_service();
    let record = service
        .submit(permit_submission())
        .expect("submission succeeds");
    assert_eq!(record.request.notes.len(), 1);
    assert_eq!(record.request.notes[0].entry, "request submitted");

    let reviewed = service
        .advance_to_review(record.id)
        .expect("review succeeds");
    assert_eq!(reviewed.request.notes.len(), 2);

    let approved = service
        .approve(record.id, "Hon. Reyes", Some("all requirements on file"))
        .expect("approval succeeds");
    assert_eq!(approved.request.notes.len(), 4);
    assert_eq!(
        approved.request.notes[2].actor.as_deref(),
        Some("Hon. Reyes")
    );
    assert_eq!(approved.request.notes[3].entry, "all requirements on file");

    // Earlier entries are never rewritten.
    assert_eq!(approved.request.notes[0].entry, "request submitted");
    assert_eq!(approved.request.notes[1].entry, "moved to under review");
}

#[test]
fn failed_transitions_leave_the_record_untouched() {
    let (service, store) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");
    let before = store
        .fetch(record.id)
        .expect("fetch succeeds")
        .expect("record exists");

    assert!(service.release(record.id, None).is_err());

    let after = store
        .fetch(record.id)
        .expect("fetch succeeds")
        .expect("record exists");
    assert_eq!(before, after);
}

#[test]
fn lost_version_race_surfaces_as_concurrent_modification() {
    let store = Arc::new(RacingStore::default());
    let directory = Arc::new(MemoryDirectory::seeded());
    let service = RequestLifecycleService::new(store, directory, FeeSchedule::standard());

    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");

    match service.approve(record.id, "Hon. Reyes", None) {
        Err(LifecycleError::ConcurrentModification { id }) => assert_eq!(id, record.id),
        other => panic!("expected concurrent modification, got {other:?}"),
    }
}

#[test]
fn sequential_double_approve_fails_on_status_not_silently() {
    let (service, _) = build_service();
    let record = service
        .submit(clearance_submission())
        .expect("submission succeeds");

    let first = service
        .approve(record.id, "Hon. Reyes", None)
        .expect("first approval succeeds");

    match service.approve(record.id, "Hon. Cruz", None) {
        Err(LifecycleError::InvalidTransition { current, .. }) => {
            assert_eq!(current, RequestStatus::Approved);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }

    // The winner's official stands.
    let stored = service.get(record.id).expect("record readable");
    assert_eq!(
        stored.request.certifying_official,
        first.request.certifying_official
    );
}

#[test]
fn store_outage_propagates_as_infrastructure_error() {
    let service = RequestLifecycleService::new(
        Arc::new(UnavailableStore),
        Arc::new(MemoryDirectory::seeded()),
        FeeSchedule::standard(),
    );

    match service.submit(clearance_submission()) {
        Err(LifecycleError::Store(StoreError::Unavailable(_))) => {}
        other => panic!("expected store error, got {other:?}"),
    }
}

#[test]
fn get_reports_missing_requests() {
    let (service, _) = build_service();
    match service.get(RequestId(404)) {
        Err(LifecycleError::RequestNotFound(id)) => assert_eq!(id, RequestId(404)),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn quote_preview_matches_submission_outcome() {
    let (service, _) = build_service();
    let preview = service
        .quote(DocumentType::CertificateOfIndigency, true)
        .expect("quote succeeds");
    let record = service
        .submit(indigency_submission())
        .expect("submission succeeds");

    assert_eq!(preview.processing_fee, record.request.processing_fee);
    assert_eq!(preview.priority, record.request.priority);
}
