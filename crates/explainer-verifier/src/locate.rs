//! Evidence localization
//!
//! Finds where a quoted piece of evidence occurs in the source text. Tiers
//! are tried in order and the first hit wins:
//!
//! 1. exact substring
//! 2. case-insensitive substring
//! 3. match after folding curly quotes and collapsing whitespace, with an
//!    approximate span recovered from the quote's first word
//! 4. fuzzy alignment (optional)
//!
//! All offsets are character offsets into the source text.

use crate::fuzzy::{FuzzyMatcher, PartialRatioMatcher};
use crate::VerifierConfig;
use explainer_domain::{ResultRecord, Span};
use tracing::debug;

/// Which localization tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    /// Exact substring
    Exact,
    /// Substring ignoring letter case
    CaseInsensitive,
    /// Substring after quote folding and whitespace collapsing
    Normalized,
    /// Fuzzy alignment above the score threshold
    Fuzzy,
}

/// A located quote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    /// Character range in the source text
    pub span: Span,
    /// Tier that matched
    pub tier: MatchTier,
}

/// Multi-tier quote locator
pub struct EvidenceLocator {
    fuzzy: Option<Box<dyn FuzzyMatcher>>,
    fuzzy_min_score: f64,
}

impl EvidenceLocator {
    /// Create a locator from configuration
    pub fn new(config: &VerifierConfig) -> Self {
        let fuzzy: Option<Box<dyn FuzzyMatcher>> = if config.fuzzy_enabled {
            Some(Box::new(PartialRatioMatcher))
        } else {
            None
        };
        Self {
            fuzzy,
            fuzzy_min_score: config.fuzzy_min_score,
        }
    }

    /// Replace the fuzzy matcher
    pub fn with_matcher(mut self, matcher: impl FuzzyMatcher + 'static) -> Self {
        self.fuzzy = Some(Box::new(matcher));
        self
    }

    /// Disable the fuzzy tier
    pub fn without_fuzzy(mut self) -> Self {
        self.fuzzy = None;
        self
    }

    /// Locate `quote` in `source`
    ///
    /// # Examples
    ///
    /// ```
    /// use explainer_verifier::{EvidenceLocator, MatchTier, VerifierConfig};
    /// use explainer_domain::Span;
    ///
    /// let locator = EvidenceLocator::new(&VerifierConfig::default());
    /// let found = locator.locate("The sky is blue.", "SKY IS BLUE").unwrap();
    /// assert_eq!(found.span, Span::new(4, 15));
    /// assert_eq!(found.tier, MatchTier::CaseInsensitive);
    /// ```
    pub fn locate(&self, source: &str, quote: &str) -> Option<Located> {
        if quote.is_empty() {
            return None;
        }
        let quote_len = quote.chars().count();

        if let Some(byte_start) = source.find(quote) {
            let start = source[..byte_start].chars().count();
            return Some(Located {
                span: Span::new(start, start + quote_len),
                tier: MatchTier::Exact,
            });
        }

        let folded_source = fold_case(source);
        if let Some(start) = find_chars(&folded_source, &fold_case(quote)) {
            return Some(Located {
                span: Span::new(start, start + quote_len),
                tier: MatchTier::CaseInsensitive,
            });
        }

        if let Some(span) = normalized_span(source, &folded_source, quote, quote_len) {
            return Some(Located {
                span,
                tier: MatchTier::Normalized,
            });
        }

        let matcher = self.fuzzy.as_ref()?;
        matcher
            .align(quote, source, self.fuzzy_min_score)
            .map(|alignment| Located {
                span: alignment.span,
                tier: MatchTier::Fuzzy,
            })
    }

    /// Localize every evidence claim, replacing each quote with the source
    /// text it covers or with the not-found sentinel
    pub fn verify_claims(&self, mut record: ResultRecord, source: &str) -> ResultRecord {
        let source_chars: Vec<char> = source.chars().collect();

        for claim in &mut record.evidence_claims {
            claim.question_relevance = None;
            claim.relevance_reason.clear();

            let quote = claim.quote.trim().to_string();
            let located = self.locate(source, &quote).and_then(|found| {
                source_chars
                    .get(found.span.start..found.span.end)
                    .map(|chars| (found, chars.iter().collect::<String>()))
            });

            match located {
                Some((found, text)) => {
                    debug!(tier = ?found.tier, start = found.span.start, end = found.span.end, "Evidence located");
                    claim.mark_verified(found.span, text);
                }
                None => {
                    debug!(quote = %quote, "Evidence not found in context");
                    claim.mark_not_found();
                }
            }
        }

        record
    }
}

impl Default for EvidenceLocator {
    fn default() -> Self {
        Self::new(&VerifierConfig::default())
    }
}

/// Lowercase one char at a time so positions line up with the original text
fn fold_case(text: &str) -> Vec<char> {
    text.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) => l,
                _ => c,
            }
        })
        .collect()
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Fold curly quotes to straight ones and collapse whitespace runs
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalized_span(source: &str, folded_source: &[char], quote: &str, quote_len: usize) -> Option<Span> {
    let norm_quote = normalize_text(quote);
    let first_word = norm_quote.split(' ').find(|w| !w.is_empty())?;

    let norm_source = normalize_text(source);
    find_chars(&fold_case(&norm_source), &fold_case(&norm_quote))?;

    // Approximate: window forward from the first word's position in the raw text
    let raw_start = find_chars(folded_source, &fold_case(first_word))?;
    let end = (raw_start + quote_len).min(folded_source.len());
    Some(Span::new(raw_start, end))
}
