//! Evidence claims and their verification state

use serde::{Deserialize, Serialize};

/// Sentinel surfaced in place of a quote that could not be found in the source text
pub const EVIDENCE_NOT_FOUND: &str = "EVIDENCE_NOT_FOUND";

/// Half-open character range `[start, end)` into the source text.
///
/// Offsets count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: usize,
    /// Exclusive end offset
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True when the span covers no characters
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Whether a piece of evidence addresses the question that was asked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    /// Shares at least one keyword with the question
    Relevant,
    /// Shares no keyword with the question
    Weak,
}

impl Relevance {
    /// Get the relevance as a lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Relevance::Relevant => "relevant",
            Relevance::Weak => "weak",
        }
    }
}

/// A model-asserted fact paired with the quotation it claims appears in the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceClaim {
    /// The asserted behavior or fact
    pub claim: String,

    /// The model's stated justification
    pub support_reason: String,

    /// Literal text claimed to appear in the source
    pub quote: String,

    /// Start offset once localized
    pub start: Option<usize>,

    /// End offset (exclusive) once localized
    pub end: Option<usize>,

    /// True iff the quote was located in the source text
    pub verified: bool,

    /// Relevance to the question, attached after localization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_relevance: Option<Relevance>,

    /// Human-readable explanation of the relevance label
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub relevance_reason: String,
}

impl EvidenceClaim {
    /// Create an unverified claim
    pub fn new(
        claim: impl Into<String>,
        support_reason: impl Into<String>,
        quote: impl Into<String>,
    ) -> Self {
        Self {
            claim: claim.into(),
            support_reason: support_reason.into(),
            quote: quote.into(),
            ..Self::default()
        }
    }

    /// The localized span, if both offsets are present
    pub fn span(&self) -> Option<Span> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(Span::new(start, end)),
            _ => None,
        }
    }

    /// Record a successful localization, replacing the quote with the source text it covers
    pub fn mark_verified(&mut self, span: Span, located_text: String) {
        self.start = Some(span.start);
        self.end = Some(span.end);
        self.quote = located_text;
        self.verified = true;
    }

    /// Record a failed localization
    pub fn mark_not_found(&mut self) {
        self.start = None;
        self.end = None;
        self.quote = EVIDENCE_NOT_FOUND.to_string();
        self.verified = false;
    }

    /// True when claim, quote and support reason are all empty
    pub fn is_blank(&self) -> bool {
        self.claim.is_empty() && self.quote.is_empty() && self.support_reason.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_requires_both_offsets() {
        let mut claim = EvidenceClaim::new("c", "r", "q");
        assert_eq!(claim.span(), None);

        claim.start = Some(3);
        assert_eq!(claim.span(), None);

        claim.end = Some(7);
        assert_eq!(claim.span(), Some(Span::new(3, 7)));
    }

    #[test]
    fn test_mark_verified() {
        let mut claim = EvidenceClaim::new("sky", "", "SKY IS BLUE");
        claim.mark_verified(Span::new(4, 15), "sky is blue".to_string());

        assert!(claim.verified);
        assert_eq!(claim.quote, "sky is blue");
        assert_eq!(claim.span(), Some(Span::new(4, 15)));
    }

    #[test]
    fn test_mark_not_found_clears_offsets() {
        let mut claim = EvidenceClaim::new("c", "r", "q");
        claim.start = Some(1);
        claim.end = Some(2);
        claim.mark_not_found();

        assert!(!claim.verified);
        assert_eq!(claim.quote, EVIDENCE_NOT_FOUND);
        assert_eq!(claim.start, None);
        assert_eq!(claim.end, None);
    }

    #[test]
    fn test_is_blank() {
        assert!(EvidenceClaim::default().is_blank());
        assert!(!EvidenceClaim::new("", "", "quote").is_blank());
    }

    #[test]
    fn test_relevance_serializes_lowercase() {
        let mut claim = EvidenceClaim::new("c", "r", "q");
        claim.question_relevance = Some(Relevance::Weak);
        let json = serde_json::to_value(&claim).unwrap();
        assert_eq!(json["question_relevance"], "weak");
    }
}
