//! Highlighting of verified evidence spans
//!
//! Spans are merged when they overlap or touch, then the source text is
//! rendered as HTML with each merged span wrapped in `<mark>`. Everything
//! else is escaped.

use explainer_domain::{EvidenceClaim, Span};

/// Opening highlight marker
pub const MARK_OPEN: &str = "<mark>";

/// Closing highlight marker
pub const MARK_CLOSE: &str = "</mark>";

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Sort spans and coalesce any that overlap or touch
///
/// # Examples
///
/// ```
/// use explainer_domain::Span;
/// use explainer_verifier::merge_spans;
///
/// let merged = merge_spans(vec![Span::new(3, 8), Span::new(0, 5), Span::new(10, 12)]);
/// assert_eq!(merged, vec![Span::new(0, 8), Span::new(10, 12)]);
/// ```
pub fn merge_spans(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort();
    let mut merged: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

/// Spans of claims that fit inside a text of `len` characters
fn valid_spans(claims: &[EvidenceClaim], len: usize) -> Vec<Span> {
    claims
        .iter()
        .filter_map(EvidenceClaim::span)
        .filter(|s| s.start < s.end && s.end <= len)
        .collect()
}

/// Render `source` as HTML with the claims' spans marked
pub fn render_highlighted(source: &str, claims: &[EvidenceClaim]) -> String {
    let chars: Vec<char> = source.chars().collect();
    let spans = merge_spans(valid_spans(claims, chars.len()));
    if spans.is_empty() {
        return escape_html(source);
    }

    let slice = |start: usize, end: usize| chars[start..end].iter().collect::<String>();
    let mut out = String::with_capacity(source.len() + spans.len() * 16);
    let mut cursor = 0;
    for span in spans {
        out.push_str(&escape_html(&slice(cursor, span.start)));
        out.push_str(MARK_OPEN);
        out.push_str(&escape_html(&slice(span.start, span.end)));
        out.push_str(MARK_CLOSE);
        cursor = span.end;
    }
    out.push_str(&escape_html(&slice(cursor, chars.len())));
    out
}
