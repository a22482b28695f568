//! Normalize decoded model JSON into a `ResultRecord`
//!
//! Normalization never fails. Wrong-typed fields fall back to empty values,
//! unknown confidence labels become `low`, and `verified` is never taken
//! from the model.

use explainer_domain::{Confidence, EvidenceClaim, ResultRecord};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Text of a scalar field: strings as-is, null as empty, anything else as JSON text
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Offset supplied by the model, kept only when it is a non-negative integer
///
/// Offsets index characters of the source, so a negative integer is dropped
/// like any other non-offset value. Verification overwrites both offsets.
fn offset(value: Option<&Value>) -> Option<usize> {
    value
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

/// Coerce a list field: arrays keep their non-empty items, a scalar becomes a
/// one-item list, null or a missing field becomes an empty list
pub fn to_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| field_text(Some(item)))
            .filter(|s| !s.is_empty())
            .collect(),
        other => {
            let text = field_text(other);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![text]
            }
        }
    }
}

/// Order-preserving union of two lists, dropping blanks and case-insensitive duplicates
///
/// # Examples
///
/// ```
/// use explainer_pipeline::merge_unique;
///
/// let base = vec!["Cache is warm".to_string()];
/// let extra = vec!["cache is WARM".to_string(), " Disk is full ".to_string()];
/// assert_eq!(merge_unique(&base, &extra), vec!["Cache is warm", "Disk is full"]);
/// ```
pub fn merge_unique(base: &[String], extra: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    base.iter()
        .chain(extra)
        .map(|item| item.trim())
        .filter(|text| !text.is_empty() && seen.insert(text.to_lowercase()))
        .map(str::to_string)
        .collect()
}

fn normalize_claim(item: &Value) -> Option<EvidenceClaim> {
    let obj = item.as_object()?;
    let mut claim = EvidenceClaim::new(
        field_text(obj.get("claim")),
        field_text(obj.get("support_reason")),
        field_text(obj.get("quote")),
    );
    if claim.is_blank() {
        return None;
    }
    claim.start = offset(obj.get("start"));
    claim.end = offset(obj.get("end"));
    claim.verified = false;
    Some(claim)
}

/// Build a canonical record from a decoded JSON object
pub fn normalize_result(raw: &Map<String, Value>) -> ResultRecord {
    let confidence = match raw.get("confidence") {
        None => Confidence::Low,
        value => Confidence::coerce(&field_text(value)),
    };

    let evidence_claims = match raw.get("evidence_claims") {
        Some(Value::Array(items)) => items.iter().filter_map(normalize_claim).collect(),
        _ => Vec::new(),
    };

    ResultRecord {
        answer: field_text(raw.get("answer")),
        black_box_explanation: field_text(raw.get("black_box_explanation")),
        assumptions: to_string_list(raw.get("assumptions")),
        evidence_claims,
        uncertainty: to_string_list(raw.get("uncertainty")),
        confidence,
        confidence_reason: field_text(raw.get("confidence_reason")),
        followups: to_string_list(raw.get("followups")),
        ..ResultRecord::default()
    }
}

/// Confidence label of a raw object, only if it is one of the valid labels
pub fn valid_confidence(raw: &Map<String, Value>) -> Option<Confidence> {
    raw.get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::parse)
}
