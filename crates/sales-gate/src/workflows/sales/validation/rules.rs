use super::{
    FailureReason, ValidationSummary, AMOUNT_COLUMN, PRODUCT_NAME_COLUMN, REQUIRED_COLUMNS,
    TRANSACTION_ID_COLUMN,
};
use crate::workflows::sales::parser::TabularRecord;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Exponents past this magnitude are out of range for any non-zero amount.
const MAX_EXPONENT: i64 = 1_000;

/// `i128` holds any 38-digit integer.
const MAX_MANTISSA_DIGITS: usize = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AmountError {
    NonNumeric,
    OutOfRange,
}

pub(crate) fn missing_columns(columns: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|column| column == *required))
        .map(|required| required.to_string())
        .collect()
}

/// Coerces every amount, or returns the failing reason with the ids of all
/// records that did not parse. Non-numeric values take precedence over values
/// the decimal type cannot hold.
pub(crate) fn coerce_amounts(
    records: &[TabularRecord],
) -> Result<Vec<Decimal>, (FailureReason, Vec<String>)> {
    let mut amounts = Vec::with_capacity(records.len());
    let mut non_numeric = Vec::new();
    let mut out_of_range = Vec::new();

    for record in records {
        match parse_amount(record.get(AMOUNT_COLUMN).unwrap_or_default()) {
            Ok(amount) => amounts.push(amount),
            Err(AmountError::NonNumeric) => non_numeric.push(transaction_id(record)),
            Err(AmountError::OutOfRange) => out_of_range.push(transaction_id(record)),
        }
    }

    if !non_numeric.is_empty() {
        Err((FailureReason::NonNumericAmount, non_numeric))
    } else if !out_of_range.is_empty() {
        Err((FailureReason::AmountOutOfRange, out_of_range))
    } else {
        Ok(amounts)
    }
}

pub(crate) fn negative_transactions(records: &[TabularRecord], amounts: &[Decimal]) -> Vec<String> {
    records
        .iter()
        .zip(amounts)
        .filter(|(_, amount)| amount.is_sign_negative() && !amount.is_zero())
        .map(|(record, _)| transaction_id(record))
        .collect()
}

/// Builds the summary, or returns every record id when the total cannot be
/// represented exactly.
pub(crate) fn summarize(
    records: &[TabularRecord],
    amounts: &[Decimal],
) -> Result<ValidationSummary, Vec<String>> {
    let total_amount =
        exact_total(amounts).ok_or_else(|| records.iter().map(transaction_id).collect::<Vec<_>>())?;

    let unique_products: HashSet<&str> = records
        .iter()
        .filter_map(|record| record.get(PRODUCT_NAME_COLUMN))
        .filter(|name| !name.is_empty())
        .collect();

    Ok(ValidationSummary {
        record_count: records.len(),
        total_amount,
        unique_products: unique_products.len(),
    })
}

/// `None` once a partial sum overflows or rust_decimal had to drop scale to fit it.
pub(crate) fn exact_total(amounts: &[Decimal]) -> Option<Decimal> {
    amounts.iter().try_fold(Decimal::ZERO, |total, amount| {
        let sum = total.checked_add(*amount)?;
        (sum.scale() >= total.scale().max(amount.scale())).then_some(sum)
    })
}

/// Parses a trimmed decimal or scientific literal without rounding.
pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, AmountError> {
    let literal = AmountLiteral::lex(raw.trim()).ok_or(AmountError::NonNumeric)?;
    literal.to_decimal().ok_or(AmountError::OutOfRange)
}

/// Value is `digits * 10^exponent`, with `digits` free of leading and trailing zeros.
#[derive(Debug, PartialEq, Eq)]
struct AmountLiteral {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl AmountLiteral {
    fn lex(text: &str) -> Option<Self> {
        let (negative, unsigned) = split_sign(text)?;
        let (mantissa, exponent) = match unsigned.find(|c: char| c == 'e' || c == 'E') {
            Some(at) => (&unsigned[..at], parse_exponent(&unsigned[at + 1..])?),
            None => (unsigned, 0),
        };

        let (integer, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if integer.is_empty() && fraction.is_empty() {
            return None;
        }
        if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let mut digits = format!("{integer}{fraction}");
        let mut exponent = exponent - fraction.len() as i64;
        while digits.ends_with('0') {
            digits.pop();
            exponent += 1;
        }
        let digits = digits.trim_start_matches('0').to_string();

        Some(Self {
            negative,
            digits,
            exponent,
        })
    }

    fn to_decimal(&self) -> Option<Decimal> {
        if self.digits.is_empty() {
            return Some(Decimal::ZERO);
        }
        if self.digits.len() > MAX_MANTISSA_DIGITS {
            return None;
        }

        let mut mantissa: i128 = self.digits.parse().ok()?;
        let scale = if self.exponent >= 0 {
            let shift = 10_i128.checked_pow(u32::try_from(self.exponent).ok()?)?;
            mantissa = mantissa.checked_mul(shift)?;
            0
        } else {
            u32::try_from(-self.exponent).ok()?
        };
        if self.negative {
            mantissa = -mantissa;
        }

        Decimal::try_from_i128_with_scale(mantissa, scale).ok()
    }
}

/// Accepts at most one leading sign.
fn split_sign(text: &str) -> Option<(bool, &str)> {
    match text.as_bytes().first()? {
        b'-' => Some((true, &text[1..])),
        b'+' => Some((false, &text[1..])),
        _ => Some((false, text)),
    }
}

fn parse_exponent(raw: &str) -> Option<i64> {
    let (negative, digits) = split_sign(raw)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX).min(MAX_EXPONENT);
    Some(if negative { -magnitude } else { magnitude })
}

fn transaction_id(record: &TabularRecord) -> String {
    record
        .get(TRANSACTION_ID_COLUMN)
        .unwrap_or_default()
        .to_string()
}
