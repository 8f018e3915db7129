mod response;
mod rules;

pub use response::{SummaryView, ValidationResponse};

use super::parser::TabularRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const TRANSACTION_ID_COLUMN: &str = "TransactionID";
pub const PRODUCT_NAME_COLUMN: &str = "ProductName";
pub const AMOUNT_COLUMN: &str = "Amount";

/// Columns every intake file must declare, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 3] = [TRANSACTION_ID_COLUMN, PRODUCT_NAME_COLUMN, AMOUNT_COLUMN];

/// Business rule that rejected a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    MissingColumns,
    NonNumericAmount,
    NegativeAmount,
    /// A numeric amount, or the file total, that the decimal type cannot hold
    /// without rounding.
    AmountOutOfRange,
}

/// Aggregates reported for a file that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub record_count: usize,
    pub total_amount: Decimal,
    pub unique_products: usize,
}

/// Result of validating one file.
///
/// `details` carries the missing column names for [`FailureReason::MissingColumns`]
/// and the offending `TransactionID` values, in file order, for the amount checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Passed {
        summary: ValidationSummary,
    },
    Failed {
        reason: FailureReason,
        details: Vec<String>,
    },
}

impl ValidationOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, ValidationOutcome::Passed { .. })
    }

    pub fn kind(&self) -> OutcomeKind {
        if self.is_passed() {
            OutcomeKind::Passed
        } else {
            OutcomeKind::Invalid
        }
    }

    pub fn message(&self) -> String {
        match self {
            ValidationOutcome::Passed { summary } => {
                format!("Validated {} records successfully", summary.record_count)
            }
            ValidationOutcome::Failed {
                reason: FailureReason::MissingColumns,
                details,
            } => format!("Missing required fields: {}", details.join(", ")),
            ValidationOutcome::Failed {
                reason: FailureReason::NonNumericAmount,
                ..
            } => "Amount contains non-numeric values".to_string(),
            ValidationOutcome::Failed {
                reason: FailureReason::NegativeAmount,
                details,
            } => format!("Found {} rows with negative amounts", details.len()),
            ValidationOutcome::Failed {
                reason: FailureReason::AmountOutOfRange,
                ..
            } => "Amount exceeds the supported range or precision".to_string(),
        }
    }
}

/// Externally visible outcome label shared by the audit log and the HTTP contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeKind {
    #[serde(rename = "Validation Passed")]
    Passed,
    #[serde(rename = "Invalid Data")]
    Invalid,
}

impl OutcomeKind {
    pub fn label(self) -> &'static str {
        match self {
            OutcomeKind::Passed => "Validation Passed",
            OutcomeKind::Invalid => "Invalid Data",
        }
    }
}

/// Stateless validator applying the schema and amount rules to a parsed file.
///
/// Checks run in a fixed order and the first failing check decides the outcome:
/// required columns, numeric amounts, representable amounts, non-negative
/// amounts, and finally an exact total.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine;

impl ValidationEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, columns: &[String], records: &[TabularRecord]) -> ValidationOutcome {
        let missing = rules::missing_columns(columns);
        if !missing.is_empty() {
            return ValidationOutcome::Failed {
                reason: FailureReason::MissingColumns,
                details: missing,
            };
        }

        let amounts = match rules::coerce_amounts(records) {
            Ok(amounts) => amounts,
            Err((reason, details)) => return ValidationOutcome::Failed { reason, details },
        };

        let negative = rules::negative_transactions(records, &amounts);
        if !negative.is_empty() {
            return ValidationOutcome::Failed {
                reason: FailureReason::NegativeAmount,
                details: negative,
            };
        }

        match rules::summarize(records, &amounts) {
            Ok(summary) => ValidationOutcome::Passed { summary },
            Err(details) => ValidationOutcome::Failed {
                reason: FailureReason::AmountOutOfRange,
                details,
            },
        }
    }
}
