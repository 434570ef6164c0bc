use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{DocumentType, Priority};

/// Fee rule for one document type. `fee_override` forces the fee to zero
/// unconditionally, urgency included; the ordinance makes certificates of
/// indigency free and the surcharge cannot reintroduce a charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTypeRule {
    pub base_fee: u32,
    pub urgent_surcharge: u32,
    #[serde(default)]
    pub fee_override: bool,
}

/// Quoted fee and priority for a submission, fixed for the request's life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub processing_fee: u32,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FeeError {
    #[error("no fee rule configured for document type '{0}'")]
    UnknownDocumentType(DocumentType),
}

/// The consolidated fee table. The portal's forms used to carry one fee
/// literal per form; this table is the single source for quoting, at both
/// submission and quote-preview time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSchedule {
    rules: BTreeMap<DocumentType, DocumentTypeRule>,
}

impl FeeSchedule {
    /// The schedule posted at the barangay hall.
    pub fn standard() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            DocumentType::BarangayClearance,
            DocumentTypeRule {
                base_fee: 50,
                urgent_surcharge: 25,
                fee_override: false,
            },
        );
        rules.insert(
            DocumentType::CertificateOfResidency,
            DocumentTypeRule {
                base_fee: 30,
                urgent_surcharge: 15,
                fee_override: false,
            },
        );
        rules.insert(
            DocumentType::CertificateOfIndigency,
            DocumentTypeRule {
                base_fee: 0,
                urgent_surcharge: 0,
                fee_override: true,
            },
        );
        // Permits have no rush lane; urgency raises priority but not the fee.
        rules.insert(
            DocumentType::BusinessPermit,
            DocumentTypeRule {
                base_fee: 100,
                urgent_surcharge: 0,
                fee_override: false,
            },
        );
        Self { rules }
    }

    pub fn from_rules(rules: BTreeMap<DocumentType, DocumentTypeRule>) -> Self {
        Self { rules }
    }

    pub fn rule(&self, document_type: DocumentType) -> Option<&DocumentTypeRule> {
        self.rules.get(&document_type)
    }

    /// Pure fee and priority computation. Identical inputs always produce
    /// identical quotes, so the same call backs both submission and the
    /// quote-preview endpoint of the forms layer.
    pub fn quote(&self, document_type: DocumentType, is_urgent: bool) -> Result<FeeQuote, FeeError> {
        let rule = self
            .rules
            .get(&document_type)
            .ok_or(FeeError::UnknownDocumentType(document_type))?;

        let processing_fee = if rule.fee_override {
            0
        } else if is_urgent {
            rule.base_fee + rule.urgent_surcharge
        } else {
            rule.base_fee
        };

        let priority = if is_urgent {
            Priority::High
        } else {
            Priority::Normal
        };

        Ok(FeeQuote {
            processing_fee,
            priority,
        })
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::standard()
    }
}
