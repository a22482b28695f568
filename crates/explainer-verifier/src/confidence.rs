//! Rule-based confidence downgrade
//!
//! Rules run in order and can only lower the label. Each rule that fires
//! appends its note to the confidence reason.

use explainer_domain::{Confidence, Relevance, ResultRecord};
use tracing::debug;

/// Note for a record without evidence
pub const NO_CLAIMS_NOTE: &str = "No evidence claims were provided.";

/// Note when no quote was located
pub const NONE_VERIFIED_NOTE: &str = "None of the evidence quotes were found in context.";

/// Note when only some quotes were located
pub const PARTIAL_NOTE: &str = "Some evidence quotes could not be verified.";

/// Note when no evidence addresses the question
pub const ALL_WEAK_NOTE: &str =
    "Evidence quotes were found, but they do not clearly answer the question.";

/// Downgrade the confidence label from verification and relevance outcomes
///
/// # Examples
///
/// ```
/// use explainer_domain::{Confidence, ResultRecord};
/// use explainer_verifier::adjust_confidence;
///
/// let mut record = ResultRecord::default();
/// record.confidence = Confidence::High;
/// let record = adjust_confidence(record);
/// assert_eq!(record.confidence, Confidence::Low);
/// ```
pub fn adjust_confidence(mut record: ResultRecord) -> ResultRecord {
    let before = record.confidence;
    let total = record.evidence_claims.len();

    if total == 0 {
        record.confidence = Confidence::Low;
        record.append_reason(NO_CLAIMS_NOTE);
        return record;
    }

    let verified = record.verified_count();
    if verified == 0 {
        record.confidence = Confidence::Low;
        record.append_reason(NONE_VERIFIED_NOTE);
    } else if verified < total && record.confidence == Confidence::High {
        record.confidence = Confidence::Medium;
        record.append_reason(PARTIAL_NOTE);
    }

    let all_weak = record
        .evidence_claims
        .iter()
        .all(|c| c.question_relevance == Some(Relevance::Weak));
    if all_weak {
        record.confidence = Confidence::Low;
        record.append_reason(ALL_WEAK_NOTE);
    }

    if record.confidence != before {
        debug!(from = %before, to = %record.confidence, "Confidence downgraded");
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use explainer_domain::{EvidenceClaim, Span};
    use proptest::prelude::*;

    fn claim(verified: bool, relevance: Relevance) -> EvidenceClaim {
        let mut c = EvidenceClaim::new("claim", "reason", "quote");
        if verified {
            c.mark_verified(Span::new(0, 5), "quote".to_string());
        } else {
            c.mark_not_found();
        }
        c.question_relevance = Some(relevance);
        c
    }

    fn record(confidence: Confidence, reason: &str, claims: Vec<EvidenceClaim>) -> ResultRecord {
        ResultRecord {
            confidence,
            confidence_reason: reason.to_string(),
            evidence_claims: claims,
            ..ResultRecord::default()
        }
    }

    #[test]
    fn test_no_claims_forces_low() {
        let out = adjust_confidence(record(Confidence::High, "Looks solid.", vec![]));
        assert_eq!(out.confidence, Confidence::Low);
        assert_eq!(out.confidence_reason, "Looks solid. No evidence claims were provided.");
    }

    #[test]
    fn test_none_verified_forces_low() {
        let claims = vec![claim(false, Relevance::Relevant)];
        let out = adjust_confidence(record(Confidence::Medium, "", claims));
        assert_eq!(out.confidence, Confidence::Low);
        assert_eq!(out.confidence_reason, NONE_VERIFIED_NOTE);
    }

    #[test]
    fn test_partial_verification_caps_high_at_medium() {
        let claims = vec![claim(true, Relevance::Relevant), claim(false, Relevance::Relevant)];
        let out = adjust_confidence(record(Confidence::High, "Stated.", claims));
        assert_eq!(out.confidence, Confidence::Medium);
        assert_eq!(out.confidence_reason, "Stated. Some evidence quotes could not be verified.");
    }

    #[test]
    fn test_partial_verification_leaves_medium_alone() {
        let claims = vec![claim(true, Relevance::Relevant), claim(false, Relevance::Relevant)];
        let out = adjust_confidence(record(Confidence::Medium, "Stated.", claims));
        assert_eq!(out.confidence, Confidence::Medium);
        assert_eq!(out.confidence_reason, "Stated.");
    }

    #[test]
    fn test_all_weak_forces_low_and_accumulates_notes() {
        let claims = vec![claim(false, Relevance::Weak)];
        let out = adjust_confidence(record(Confidence::High, "", claims));
        assert_eq!(out.confidence, Confidence::Low);
        assert_eq!(
            out.confidence_reason,
            format!("{} {}", NONE_VERIFIED_NOTE, ALL_WEAK_NOTE)
        );
    }

    #[test]
    fn test_fully_verified_relevant_keeps_high() {
        let claims = vec![claim(true, Relevance::Relevant), claim(true, Relevance::Weak)];
        let out = adjust_confidence(record(Confidence::High, "Good.", claims));
        assert_eq!(out.confidence, Confidence::High);
        assert_eq!(out.confidence_reason, "Good.");
    }

    fn confidence_strategy() -> impl Strategy<Value = Confidence> {
        prop_oneof![Just(Confidence::Low), Just(Confidence::Medium), Just(Confidence::High)]
    }

    proptest! {
        #[test]
        fn prop_confidence_never_increases(
            start in confidence_strategy(),
            flags in proptest::collection::vec((any::<bool>(), any::<bool>()), 0..6),
        ) {
            let claims = flags
                .into_iter()
                .map(|(verified, relevant)| {
                    claim(verified, if relevant { Relevance::Relevant } else { Relevance::Weak })
                })
                .collect::<Vec<_>>();
            let empty = claims.is_empty();

            let out = adjust_confidence(record(start, "", claims));
            prop_assert!(out.confidence <= start);
            if empty {
                prop_assert_eq!(out.confidence, Confidence::Low);
            }
        }
    }
}
