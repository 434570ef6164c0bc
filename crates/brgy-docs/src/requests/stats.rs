use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{DocumentType, RequestStatus};
use super::store::RequestRecord;

/// Dashboard counts, derived from store contents at call time. There are no
/// persisted running counters to keep in sync; the numbers are always
/// consistent with whatever the store currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestStatistics {
    pub total: u64,
    pub pending: u64,
    pub under_review: u64,
    pub approved: u64,
    pub released: u64,
    pub rejected: u64,
    pub by_document_type: BTreeMap<DocumentType, u64>,
}

impl RequestStatistics {
    /// Tally a set of records. An empty input yields all-zero counts.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RequestRecord>,
    {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            match record.request.status {
                RequestStatus::Pending => stats.pending += 1,
                RequestStatus::UnderReview => stats.under_review += 1,
                RequestStatus::Approved => stats.approved += 1,
                RequestStatus::Released => stats.released += 1,
                RequestStatus::Rejected => stats.rejected += 1,
            }
            *stats
                .by_document_type
                .entry(record.request.document_type)
                .or_insert(0) += 1;
        }
        stats
    }

    pub fn status_sum(&self) -> u64 {
        self.pending + self.under_review + self.approved + self.released + self.rejected
    }
}
