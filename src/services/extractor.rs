// src/services/extractor.rs

//! Record extraction from `aaData` feed payloads.
//!
//! Feeds answer with `{"aaData": [[time, country, account, service, message, ...], ...]}`.
//! Rows are loosely typed; [`parse_row`] validates them into [`OtpRecord`]s
//! and nothing untyped leaves this module.

use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{OtpRecord, RowRejection};

/// Top-level field carrying the rows.
const ROWS_FIELD: &str = "aaData";

/// Minimum number of columns in a valid row.
const MIN_COLUMNS: usize = 5;

/// Account values feeds use for summary or placeholder rows.
const PLACEHOLDER_ACCOUNTS: &[&str] = &["0", "null", "none", "n/a", "-"];

/// Parse a payload, degrading every failure to "no records".
pub fn extract_records(body: &str) -> Vec<OtpRecord> {
    try_extract("payload", body).unwrap_or_default()
}

/// Parse a payload, reporting malformed input as an error.
///
/// Invalid rows are skipped, not reported.
pub fn try_extract(source_label: &str, body: &str) -> Result<Vec<OtpRecord>> {
    let payload: Value =
        serde_json::from_str(body).map_err(|e| AppError::malformed(source_label, e))?;

    let rows = payload
        .get(ROWS_FIELD)
        .ok_or_else(|| AppError::malformed(source_label, "missing aaData"))?
        .as_array()
        .ok_or_else(|| AppError::malformed(source_label, "aaData is not an array"))?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match parse_row(row) {
            Ok(record) => records.push(record),
            Err(reason) => log::debug!("{}: skipping row {}: {}", source_label, index, reason),
        }
    }
    Ok(records)
}

/// Validate one loosely-typed row.
pub fn parse_row(row: &Value) -> std::result::Result<OtpRecord, RowRejection> {
    let columns = row.as_array().ok_or(RowRejection::NotArray)?;
    if columns.len() < MIN_COLUMNS {
        return Err(RowRejection::TooShort(columns.len()));
    }

    let account = stringify(&columns[2]).trim().to_string();
    if is_placeholder_account(&account) {
        return Err(RowRejection::NoAccount);
    }

    let record = OtpRecord {
        timestamp: stringify(&columns[0]),
        country: stringify(&columns[1]),
        account,
        service: stringify(&columns[3]),
        message: stringify(&columns[4]),
    };

    for (name, value) in [
        ("timestamp", &record.timestamp),
        ("country", &record.country),
        ("service", &record.service),
        ("message", &record.message),
    ] {
        if value.trim().is_empty() {
            return Err(RowRejection::EmptyField(name));
        }
    }

    Ok(record)
}

/// Coerce a JSON value to its display string.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_placeholder_account(account: &str) -> bool {
    account.is_empty()
        || PLACEHOLDER_ACCOUNTS
            .iter()
            .any(|p| account.eq_ignore_ascii_case(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_valid_rows() {
        let body = json!({
            "aaData": [
                ["2024-01-01 10:00", "Pakistan-PTCL", "923001234567", "WhatsApp", "Your code is 4521"],
                ["2024-01-01 10:01", "India-Jio", "919812345678", "Telegram", "Code 88213", "extra"]
            ]
        })
        .to_string();

        let records = extract_records(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].account, "923001234567");
        assert_eq!(records[0].message, "Your code is 4521");
        assert_eq!(records[1].service, "Telegram");
    }

    #[test]
    fn test_malformed_json_yields_nothing() {
        assert!(extract_records("{ not json").is_empty());
        assert!(matches!(
            try_extract("API 1", "{ not json"),
            Err(AppError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_missing_or_wrong_typed_rows_field() {
        assert!(extract_records(r#"{"data": []}"#).is_empty());
        assert!(extract_records(r#"{"aaData": "nope"}"#).is_empty());
        assert!(extract_records(r#"[1, 2, 3]"#).is_empty());
        assert!(try_extract("API 1", r#"{"aaData": {}}"#).is_err());
    }

    #[test]
    fn test_empty_rows_is_ok() {
        assert!(try_extract("API 1", r#"{"aaData": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_short_and_non_array_rows_dropped() {
        let body = json!({
            "aaData": [
                ["2024-01-01 10:00", "Pakistan", "923001234567", "WhatsApp"],
                "not a row",
                {"a": 1},
                ["2024-01-01 10:00", "Pakistan", "923001234567", "WhatsApp", "Code 1234"]
            ]
        })
        .to_string();

        assert_eq!(extract_records(&body).len(), 1);
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let row = json!(["2024-01-01 10:00", "Pakistan", 923001234567u64, "WhatsApp", 4521]);
        let record = parse_row(&row).unwrap();
        assert_eq!(record.account, "923001234567");
        assert_eq!(record.message, "4521");
    }

    #[test]
    fn test_placeholder_accounts_dropped() {
        for account in [json!(0), json!("0"), json!(null), json!(""), json!("  "), json!("N/A")] {
            let row = json!(["2024-01-01", "Pakistan", account, "WhatsApp", "Code 1234"]);
            assert_eq!(parse_row(&row), Err(RowRejection::NoAccount));
        }
    }

    #[test]
    fn test_summary_row_dropped() {
        let row = json!(["0,0,0,12", 0, 0, 0, "", "$", 0, 0]);
        assert!(parse_row(&row).is_err());
    }

    #[test]
    fn test_empty_field_rejected() {
        let row = json!(["2024-01-01", "Pakistan", "923001234567", "", "Code 1234"]);
        assert_eq!(parse_row(&row), Err(RowRejection::EmptyField("service")));
    }

    #[test]
    fn test_every_emitted_record_is_fully_populated() {
        let body = json!({
            "aaData": [
                ["", "Pakistan", "923001234567", "WhatsApp", "x"],
                ["t", null, "923001234567", "WhatsApp", "x"],
                ["t", "Pakistan", "923001234567", "WhatsApp", null],
                ["t", "Pakistan", "923001234567", "WhatsApp", "ok 1234"],
                [1, 2, 3, 4, 5]
            ]
        })
        .to_string();

        let records = extract_records(&body);
        assert_eq!(records.len(), 2);
        for r in records {
            for field in [&r.timestamp, &r.country, &r.account, &r.service, &r.message] {
                assert!(!field.trim().is_empty());
            }
        }
    }

    #[test]
    fn test_message_kept_verbatim() {
        let row = json!(["t", "Pakistan", "923001234567", "WhatsApp", "  Line 1\nLine 2  "]);
        assert_eq!(parse_row(&row).unwrap().message, "  Line 1\nLine 2  ");
    }
}
