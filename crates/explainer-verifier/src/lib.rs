//! Explainer Verifier
//!
//! Deterministic checks applied to a model's answer after it has been parsed.
//! Nothing in this crate calls a model.
//!
//! The verifier provides:
//! - Quote localization against the source text (exact, case-insensitive,
//!   normalized and fuzzy tiers)
//! - Keyword-overlap relevance of each quote to the question
//! - Rule-based confidence downgrade
//! - HTML highlighting of located quotes
//!
//! # Examples
//!
//! ```
//! use explainer_domain::{Confidence, EvidenceClaim, ResultRecord};
//! use explainer_verifier::Verifier;
//!
//! let mut record = ResultRecord::default();
//! record.confidence = Confidence::High;
//! record.evidence_claims = vec![EvidenceClaim::new("The sky is blue", "stated", "sky is blue")];
//!
//! let verifier = Verifier::default();
//! let context = "The sky is blue.";
//! let record = verifier.verify(record, context, "What colour is the sky?");
//!
//! assert!(record.evidence_claims[0].verified);
//! assert_eq!(record.confidence, Confidence::High);
//! assert_eq!(verifier.highlight(&record, context), "The <mark>sky is blue</mark>.");
//! ```

#![warn(missing_docs)]

mod config;
mod confidence;
mod error;
pub mod fuzzy;
mod highlight;
mod locate;
mod relevance;

pub use config::{VerifierConfig, DEFAULT_FUZZY_MIN_SCORE, DEFAULT_MIN_TOKEN_LEN};
pub use confidence::{adjust_confidence, ALL_WEAK_NOTE, NONE_VERIFIED_NOTE, NO_CLAIMS_NOTE, PARTIAL_NOTE};
pub use error::VerifierError;
pub use fuzzy::{Alignment, FuzzyMatcher, PartialRatioMatcher};
pub use highlight::{escape_html, merge_spans, render_highlighted, MARK_CLOSE, MARK_OPEN};
pub use locate::{normalize_text, EvidenceLocator, Located, MatchTier};
pub use relevance::{keyword_tokens, RelevanceScorer, RELEVANT_REASON, STOPWORDS, WEAK_REASON};

use explainer_domain::ResultRecord;

/// Runs localization, relevance scoring and confidence adjustment
pub struct Verifier {
    config: VerifierConfig,
    locator: EvidenceLocator,
    scorer: RelevanceScorer,
}

impl Verifier {
    /// Create a verifier with the given configuration
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        config.validate()?;
        Ok(Self {
            locator: EvidenceLocator::new(&config),
            scorer: RelevanceScorer::new(config.min_token_len),
            config,
        })
    }

    /// Replace the fuzzy matching strategy
    pub fn with_matcher(mut self, matcher: impl FuzzyMatcher + 'static) -> Self {
        self.locator = self.locator.with_matcher(matcher);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Localize every claim's quote in `context`
    pub fn locate_evidence(&self, record: ResultRecord, context: &str) -> ResultRecord {
        self.locator.verify_claims(record, context)
    }

    /// Label every claim as relevant or weak for `question`
    pub fn score_relevance(&self, record: ResultRecord, question: &str) -> ResultRecord {
        self.scorer.score_record(record, question)
    }

    /// Downgrade the confidence label where evidence is missing or weak
    pub fn adjust_confidence(&self, record: ResultRecord) -> ResultRecord {
        adjust_confidence(record)
    }

    /// All three checks in their required order
    pub fn verify(&self, record: ResultRecord, context: &str, question: &str) -> ResultRecord {
        let record = self.locate_evidence(record, context);
        let record = self.score_relevance(record, question);
        self.adjust_confidence(record)
    }

    /// Render the context with the record's located quotes marked
    pub fn highlight(&self, record: &ResultRecord, context: &str) -> String {
        render_highlighted(context, &record.evidence_claims)
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self {
            config: VerifierConfig::default(),
            locator: EvidenceLocator::default(),
            scorer: RelevanceScorer::default(),
        }
    }
}
