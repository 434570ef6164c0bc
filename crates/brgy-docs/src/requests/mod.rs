//! Document request processing engine.
//!
//! A request moves PENDING -> UNDER_REVIEW -> APPROVED -> RELEASED, with
//! REJECTED reachable from the two pre-approval states. Fees and priority
//! are quoted once at submission from the [`fees::FeeSchedule`] table, the
//! [`lifecycle::RequestLifecycleService`] is the only writer of status, and
//! the statistics and tracking modules are read-only derivations over the
//! [`store::RequestStore`].

pub mod directory;
pub mod domain;
pub mod fees;
pub mod lifecycle;
pub mod router;
pub mod stats;
pub mod store;
pub mod tracking;

#[cfg(test)]
mod tests;

pub use directory::{DirectoryError, ResidentDirectory};
pub use domain::{
    DocumentRequest, DocumentRequestSubmission, DocumentType, NoteEntry, Priority, RequestId,
    RequestStatus, ResidentSummary,
};
pub use fees::{DocumentTypeRule, FeeError, FeeQuote, FeeSchedule};
pub use lifecycle::{LifecycleError, RequestLifecycleService};
pub use router::request_router;
pub use stats::RequestStatistics;
pub use store::{
    order_stable, paginate, PageRequest, RequestDetailView, RequestFilter, RequestPage,
    RequestRecord, RequestStore, RequestSummaryView, StoreError,
};
pub use tracking::{ReferenceNumber, TrackingError, TrackingView};
