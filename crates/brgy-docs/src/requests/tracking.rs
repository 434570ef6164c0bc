use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::RequestId;
use super::store::{RequestRecord, RequestStore, StoreError};

/// Public reference printed on the claim stub, derived from the internal id
/// rather than exposing it directly: `BRGY-` plus the zero-padded id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceNumber(RequestId);

impl ReferenceNumber {
    const PREFIX: &'static str = "BRGY-";

    pub fn from_id(id: RequestId) -> Self {
        Self(id)
    }

    pub fn id(self) -> RequestId {
        self.0
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:06}", Self::PREFIX, self.0 .0)
    }
}

impl FromStr for ReferenceNumber {
    type Err = MalformedReference;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let digits = raw.trim().strip_prefix(Self::PREFIX).ok_or(MalformedReference)?;
        if digits.len() < 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MalformedReference);
        }
        let id = digits.parse::<u64>().map_err(|_| MalformedReference)?;
        Ok(Self(RequestId(id)))
    }
}

/// Parse failure. Deliberately carries no detail; citizens see the same
/// not-found outcome whether a reference is malformed or merely unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedReference;

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("no request matches that reference number")]
    NotFound,
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}

/// Citizen-safe projection: status and dates only, no notes, no resident
/// details beyond what the citizen supplied in the purpose field.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingView {
    pub reference_number: String,
    pub document_type: &'static str,
    pub status: &'static str,
    pub purpose: String,
    pub request_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_date: Option<DateTime<Utc>>,
}

impl TrackingView {
    pub fn from_record(record: &RequestRecord) -> Self {
        Self {
            reference_number: record.reference_number().to_string(),
            document_type: record.request.document_type.label(),
            status: record.request.status.label(),
            purpose: record.request.purpose.clone(),
            request_date: record.request.request_date,
            processed_date: record.request.processed_date,
        }
    }
}

/// Resolve a citizen-typed reference to the reduced status view. Mistyped
/// references are routine, so a miss is a normal outcome here, reported at
/// debug rather than error level.
pub fn track_by_reference<S: RequestStore + ?Sized>(
    store: &S,
    raw: &str,
) -> Result<TrackingView, TrackingError> {
    let reference: ReferenceNumber = raw.parse().map_err(|MalformedReference| {
        tracing::debug!(reference = raw, "tracking lookup with malformed reference");
        TrackingError::NotFound
    })?;

    let record = match store.fetch(reference.id()) {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(reference = raw, "tracking lookup missed");
            return Err(TrackingError::NotFound);
        }
        Err(StoreError::NotFound) => return Err(TrackingError::NotFound),
        Err(err) => return Err(TrackingError::Unavailable(err.to_string())),
    };

    Ok(TrackingView::from_record(&record))
}
