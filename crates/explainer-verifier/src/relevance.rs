//! Keyword-overlap relevance between evidence and the question
//!
//! Lexical only: two texts are related when they share a content word.
//! Synonyms and paraphrases are not detected.

use explainer_domain::{Relevance, ResultRecord};
use std::collections::HashSet;

/// Function words ignored when comparing texts
pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "to", "of", "in", "on", "for", "and",
    "or", "it", "this", "that", "with", "as", "at", "by", "from", "why", "what", "how", "when",
    "where", "who", "which", "does", "do", "did", "can", "could", "would", "should", "will",
    "you", "your", "i", "we", "they", "he", "she", "them", "his", "her",
];

/// Reason attached to relevant evidence
pub const RELEVANT_REASON: &str = "This evidence shares key terms with your question.";

/// Reason attached to weak evidence
pub const WEAK_REASON: &str =
    "This evidence may be true, but it does not clearly address your question.";

/// Extract the content words of `text`
///
/// # Examples
///
/// ```
/// use explainer_verifier::keyword_tokens;
///
/// let tokens = keyword_tokens("Why does the cache expire?", 3);
/// assert!(tokens.contains("cache"));
/// assert!(tokens.contains("expire"));
/// assert!(!tokens.contains("why"));
/// ```
pub fn keyword_tokens(text: &str, min_len: usize) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|raw| raw.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| word.chars().count() >= min_len && !STOPWORDS.contains(&word.as_str()))
        .collect()
}

/// Scores evidence claims against the question
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    min_token_len: usize,
}

impl RelevanceScorer {
    /// Create a scorer keeping tokens of at least `min_token_len` characters
    pub fn new(min_token_len: usize) -> Self {
        Self { min_token_len }
    }

    /// Relevance of `text` to `question`
    pub fn score(&self, text: &str, question: &str) -> Relevance {
        let question_tokens = keyword_tokens(question, self.min_token_len);
        self.score_against(text, &question_tokens)
    }

    fn score_against(&self, text: &str, question_tokens: &HashSet<String>) -> Relevance {
        let tokens = keyword_tokens(text, self.min_token_len);
        if tokens.is_disjoint(question_tokens) {
            Relevance::Weak
        } else {
            Relevance::Relevant
        }
    }

    /// Label every claim of the record, reading its claim and quote text
    pub fn score_record(&self, mut record: ResultRecord, question: &str) -> ResultRecord {
        let question_tokens = keyword_tokens(question, self.min_token_len);

        for claim in &mut record.evidence_claims {
            let text = format!("{} {}", claim.claim, claim.quote);
            let relevance = self.score_against(&text, &question_tokens);
            claim.relevance_reason = match relevance {
                Relevance::Relevant => RELEVANT_REASON,
                Relevance::Weak => WEAK_REASON,
            }
            .to_string();
            claim.question_relevance = Some(relevance);
        }

        record
    }
}

impl Default for RelevanceScorer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_TOKEN_LEN)
    }
}
