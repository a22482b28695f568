//! Fuzzy quote alignment
//!
//! The last localization tier. A quote that drifted from the source by a few
//! characters (a dropped letter, a changed punctuation mark) is aligned
//! against every window of the source with the same length, and against the
//! shorter windows that touch either end of the source, so a quote running
//! past an edge can still match. The best window wins if its similarity
//! reaches the configured score. A quote longer than the source is scored
//! the other way round, with the whole source as the span.

use explainer_domain::Span;
use similar::TextDiff;
use std::collections::HashMap;

/// Best alignment of a needle inside a haystack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    /// Similarity score (0-100)
    pub score: f64,
    /// Aligned character range in the haystack
    pub span: Span,
}

/// Strategy for approximate substring alignment
pub trait FuzzyMatcher: Send + Sync {
    /// Find the best alignment of `needle` in `haystack` scoring at least `min_score`
    fn align(&self, needle: &str, haystack: &str, min_score: f64) -> Option<Alignment>;
}

/// Partial-ratio alignment using character-level diff similarity
///
/// Case-sensitive. Offsets are character offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartialRatioMatcher;

/// Similarity of two strings as `2 * matches / total_len * 100`
pub fn ratio(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio()) * 100.0
}

/// Character counts of a sliding window and how many of them the needle shares
struct WindowCounts<'a> {
    wanted: &'a HashMap<char, usize>,
    seen: HashMap<char, usize>,
    common: usize,
}

impl<'a> WindowCounts<'a> {
    fn new(wanted: &'a HashMap<char, usize>) -> Self {
        Self {
            wanted,
            seen: HashMap::new(),
            common: 0,
        }
    }

    fn add(&mut self, c: char) {
        let seen = self.seen.entry(c).or_insert(0);
        if *seen < self.wanted.get(&c).copied().unwrap_or(0) {
            self.common += 1;
        }
        *seen += 1;
    }

    fn remove(&mut self, c: char) {
        if let Some(seen) = self.seen.get_mut(&c) {
            *seen -= 1;
            if *seen < self.wanted.get(&c).copied().unwrap_or(0) {
                self.common -= 1;
            }
        }
    }
}

/// Running best alignment over candidate windows of `hay`
struct Search<'a> {
    needle: &'a str,
    needle_len: usize,
    hay: &'a str,
    bounds: Vec<usize>,
    min_score: f64,
    best: Option<Alignment>,
}

impl Search<'_> {
    fn done(&self) -> bool {
        self.best.is_some_and(|b| b.score >= 100.0)
    }

    /// Score the window `start..end` unless shared characters rule it out
    fn consider(&mut self, start: usize, end: usize, common: usize) {
        let total = (self.needle_len + end - start) as f64;
        let upper = 2.0 * common as f64 / total * 100.0;
        let best_score = self.best.map(|b| b.score).unwrap_or(f64::MIN);
        if upper < self.min_score || upper <= best_score {
            return;
        }

        let score = ratio(self.needle, &self.hay[self.bounds[start]..self.bounds[end]]);
        if score >= self.min_score && score > best_score {
            self.best = Some(Alignment {
                score,
                span: Span::new(start, end),
            });
        }
    }
}

/// Best window of `hay` for a needle no longer than it
///
/// Windows are tried as prefixes shorter than the needle, then every
/// needle-length window, then suffixes shorter than the needle. Earlier
/// windows win ties.
fn best_window(needle: &str, hay: &str, min_score: f64) -> Option<Alignment> {
    let needle_len = needle.chars().count();
    let hay_chars: Vec<char> = hay.chars().collect();
    let hay_len = hay_chars.len();

    let mut wanted: HashMap<char, usize> = HashMap::new();
    for c in needle.chars() {
        *wanted.entry(c).or_insert(0) += 1;
    }

    let mut search = Search {
        needle,
        needle_len,
        hay,
        bounds: hay
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(hay.len()))
            .collect(),
        min_score,
        best: None,
    };

    // Prefixes shorter than the needle, grown one character at a time
    let mut counts = WindowCounts::new(&wanted);
    for end in 1..needle_len {
        let c = hay_chars[end - 1];
        counts.add(c);
        if wanted.contains_key(&c) {
            search.consider(0, end, counts.common);
            if search.done() {
                return search.best;
            }
        }
    }

    // Full-length windows
    counts.add(hay_chars[needle_len - 1]);
    for start in 0..=(hay_len - needle_len) {
        let end = start + needle_len;
        if start > 0 {
            counts.remove(hay_chars[start - 1]);
            counts.add(hay_chars[end - 1]);
        }
        if wanted.contains_key(&hay_chars[end - 1]) {
            search.consider(start, end, counts.common);
            if search.done() {
                return search.best;
            }
        }
    }

    // Suffixes shorter than the needle, shrunk from the front
    for start in (hay_len - needle_len + 1)..hay_len {
        counts.remove(hay_chars[start - 1]);
        if wanted.contains_key(&hay_chars[start]) {
            search.consider(start, hay_len, counts.common);
            if search.done() {
                return search.best;
            }
        }
    }

    search.best
}

impl FuzzyMatcher for PartialRatioMatcher {
    fn align(&self, needle: &str, haystack: &str, min_score: f64) -> Option<Alignment> {
        if needle.is_empty() || haystack.is_empty() {
            return None;
        }

        let needle_len = needle.chars().count();
        let hay_len = haystack.chars().count();

        if needle_len > hay_len {
            // Align the source inside the quote; the match covers the whole source
            return best_window(haystack, needle, min_score).map(|found| Alignment {
                score: found.score,
                span: Span::new(0, hay_len),
            });
        }

        best_window(needle, haystack, min_score)
    }
}
