use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the store when a request is first persisted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of documents the barangay hall issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    BarangayClearance,
    BusinessPermit,
    CertificateOfResidency,
    CertificateOfIndigency,
}

impl DocumentType {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentType::BarangayClearance => "barangay_clearance",
            DocumentType::BusinessPermit => "business_permit",
            DocumentType::CertificateOfResidency => "certificate_of_residency",
            DocumentType::CertificateOfIndigency => "certificate_of_indigency",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Processing status tracked through the request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    UnderReview,
    Approved,
    Released,
    Rejected,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::UnderReview => "under_review",
            RequestStatus::Approved => "approved",
            RequestStatus::Released => "released",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Released and rejected requests accept no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Released | RequestStatus::Rejected)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Queue priority, fixed at submission from the urgency flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    High,
}

impl Priority {
    pub const fn label(self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display snapshot of the requesting resident, captured once at submission
/// from the registry. Later registry edits never rewrite stored requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentSummary {
    pub name: String,
    pub address: String,
    pub contact_number: String,
}

/// Payload a citizen (or a clerk on their behalf) files to open a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequestSubmission {
    pub document_type: DocumentType,
    pub resident_id: u64,
    pub purpose: String,
    #[serde(default)]
    pub is_urgent: bool,
    #[serde(default)]
    pub requirements_submitted: Vec<String>,
}

/// One line of the append-only audit trail. Every successful transition adds
/// an entry; nothing ever removes or edits one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub entry: String,
}

impl NoteEntry {
    pub fn now(actor: Option<&str>, entry: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            actor: actor.map(str::to_string),
            entry: entry.into(),
        }
    }
}

/// The central entity: one issued-document request and its processing state.
///
/// `document_type`, `resident_id`, `purpose`, `priority`, and
/// `processing_fee` are fixed at submission; only the lifecycle fields
/// (`status`, `certifying_official`, `processed_date`, `notes`) change
/// afterwards, and only through the lifecycle service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub document_type: DocumentType,
    pub resident_id: u64,
    pub resident: ResidentSummary,
    pub purpose: String,
    pub status: RequestStatus,
    pub priority: Priority,
    /// Whole pesos. Quoted once at submission; re-quoting after the fact is
    /// never allowed, so fee disputes always resolve against this value.
    pub processing_fee: u32,
    pub certifying_official: Option<String>,
    pub request_date: DateTime<Utc>,
    pub processed_date: Option<DateTime<Utc>>,
    pub notes: Vec<NoteEntry>,
    pub requirements_submitted: Vec<String>,
}
