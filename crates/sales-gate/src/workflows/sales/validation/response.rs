use super::{FailureReason, OutcomeKind, ValidationOutcome, ValidationSummary};
use crate::workflows::sales::parser::ParseError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wire shape returned to callers of the validation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub validation_result: OutcomeKind,
    pub message: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_transactions: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub total_transactions: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub unique_products: usize,
}

impl From<&ValidationSummary> for SummaryView {
    fn from(summary: &ValidationSummary) -> Self {
        Self {
            total_transactions: summary.record_count,
            total_amount: summary.total_amount,
            unique_products: summary.unique_products,
        }
    }
}

impl ValidationResponse {
    pub fn from_outcome(outcome: &ValidationOutcome) -> Self {
        let (summary, invalid_transactions) = match outcome {
            ValidationOutcome::Passed { summary } => (Some(SummaryView::from(summary)), None),
            ValidationOutcome::Failed {
                reason:
                    FailureReason::NonNumericAmount
                    | FailureReason::NegativeAmount
                    | FailureReason::AmountOutOfRange,
                details,
            } => (None, Some(details.clone())),
            ValidationOutcome::Failed { .. } => (None, None),
        };

        Self {
            validation_result: outcome.kind(),
            message: outcome.message(),
            is_valid: outcome.is_passed(),
            summary,
            invalid_transactions,
        }
    }

    pub fn malformed(error: &ParseError) -> Self {
        Self {
            validation_result: OutcomeKind::Invalid,
            message: format!("Error processing file: {error}"),
            is_valid: false,
            summary: None,
            invalid_transactions: None,
        }
    }
}
