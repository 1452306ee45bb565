//! Transaction codes: `<PREFIX>-<YYYYMM>-<NNNN>`, e.g. `EXP-202601-0007`.

use chrono::NaiveDate;

use super::types::TransactionType;

/// The part of the code shared by every transaction of a type and month.
#[must_use]
pub fn code_prefix(transaction_type: TransactionType, date: NaiveDate) -> String {
    format!("{}-{}-", transaction_type.code_prefix(), date.format("%Y%m"))
}

/// Formats a full code. Sequences above 9999 simply grow wider.
#[must_use]
pub fn format_code(transaction_type: TransactionType, date: NaiveDate, sequence: u32) -> String {
    format!("{}{sequence:04}", code_prefix(transaction_type, date))
}

/// Next 1-based sequence given the codes already issued under `prefix`.
///
/// Codes that do not carry the prefix or a numeric tail are ignored.
#[must_use]
pub fn next_sequence<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> u32 {
    existing
        .into_iter()
        .filter_map(|code| code.strip_prefix(prefix))
        .filter_map(|tail| tail.parse::<u32>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1))
}
