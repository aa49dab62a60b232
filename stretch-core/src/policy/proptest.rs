//! Property-based tests for the relevance decision table.
//!
//! - The label depends only on keyword presence and the threshold side
//! - Keyword evidence below the threshold is always relevant
//! - Decisive verdicts without keywords mirror the endpoint
//! - Decisions are deterministic

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::policy::{RelevancePolicy, DEFAULT_CONFIDENCE_THRESHOLD};
    use crate::types::{ClassificationLabel, Verdict, VerificationResult};

    fn below_threshold() -> impl Strategy<Value = f64> {
        prop_oneof![Just(0.0), Just(0.9499), 0.0f64..DEFAULT_CONFIDENCE_THRESHOLD]
    }

    fn at_or_above_threshold() -> impl Strategy<Value = f64> {
        prop_oneof![Just(DEFAULT_CONFIDENCE_THRESHOLD), Just(1.0), DEFAULT_CONFIDENCE_THRESHOLD..=1.0f64]
    }

    fn any_text() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("정적 스트레칭은 근육을 천천히 늘려 15-30초 동안 유지하는 방법입니다.".to_string()),
            Just("Posture correction for desk workers".to_string()),
            Just("MRI is useful for diagnosis".to_string()),
            "[a-z가-힣 ]{0,40}",
        ]
    }

    proptest! {
        #[test]
        fn keyword_below_threshold_is_always_relevant(
            text in any_text(),
            supported in any::<bool>(),
            confidence in below_threshold()
        ) {
            let d = RelevancePolicy::new().decide(&text, true, supported, confidence);
            prop_assert!(d.is_relevant);
            prop_assert_eq!(d.label, ClassificationLabel::KeywordBased);
        }

        #[test]
        fn keyword_at_threshold_defers_to_context(
            text in any_text(),
            supported in any::<bool>(),
            confidence in at_or_above_threshold()
        ) {
            let policy = RelevancePolicy::new();
            let d = policy.decide(&text, true, supported, confidence);
            prop_assert_eq!(d.label, ClassificationLabel::HighConfidenceWithContext);
            prop_assert_eq!(d.is_relevant, policy.keyword_context_matches(&text));
        }

        #[test]
        fn decisive_without_keyword_mirrors_api(
            text in any_text(),
            supported in any::<bool>(),
            confidence in at_or_above_threshold()
        ) {
            let d = RelevancePolicy::new().decide(&text, false, supported, confidence);
            prop_assert_eq!(d.label, ClassificationLabel::ApiBased);
            prop_assert_eq!(d.is_relevant, supported);
        }

        #[test]
        fn indecisive_without_keyword_uses_general_patterns(
            text in any_text(),
            supported in any::<bool>(),
            confidence in below_threshold()
        ) {
            let policy = RelevancePolicy::new();
            let d = policy.decide(&text, false, supported, confidence);
            prop_assert_eq!(d.label, ClassificationLabel::ContextBased);
            prop_assert_eq!(d.is_relevant, policy.general_context_matches(&text));
        }

        #[test]
        fn decide_is_deterministic(
            text in any_text(),
            has_keyword in any::<bool>(),
            supported in any::<bool>(),
            confidence in 0.0f64..=1.0
        ) {
            let policy = RelevancePolicy::new();
            let first = policy.decide(&text, has_keyword, supported, confidence);
            let second = policy.decide(&text, has_keyword, supported, confidence);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn outcome_label_never_error_on_success(
            text in any_text(),
            supported in any::<bool>(),
            confidence in 0.0f64..=1.0
        ) {
            let outcome = RelevancePolicy::new()
                .outcome(&text, &VerificationResult::success(Verdict::new(supported, confidence)));
            prop_assert_ne!(outcome.classification_label, ClassificationLabel::Error);
            prop_assert!(outcome.error.is_none());
        }
    }
}
