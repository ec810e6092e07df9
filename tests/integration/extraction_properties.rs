use chrono::NaiveDate;
use marketbrief::models::{CitationRef, RawResponse};
use marketbrief::services::dedup::dedupe_citations;
use marketbrief::services::extraction::{ResponseExtractor, PARSE_FAILED_MARKER};
use proptest::prelude::*;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
}

fn citation() -> impl Strategy<Value = CitationRef> {
    (
        prop_oneof![Just(String::new()), "https://[a-c]\\.example/[0-3]"],
        proptest::option::of("[a-z ]{0,8}"),
    )
        .prop_map(|(uri, title)| CitationRef::new(uri, title))
}

proptest! {
    #[test]
    fn extraction_is_total(text in any::<String>()) {
        let out = ResponseExtractor::new().extract_on(&RawResponse::new(text, Vec::new()), day());
        prop_assert_eq!(&out.report.summary, &out.narrative);
        prop_assert!(!out.narrative.is_empty() || out.is_fallback());
    }

    #[test]
    fn text_without_fences_becomes_the_narrative(text in "[^`]{0,200}") {
        let out = ResponseExtractor::new().extract_on(&RawResponse::new(text.clone(), Vec::new()), day());
        prop_assert!(out.is_fallback());
        prop_assert_eq!(&out.narrative, &text);
        prop_assert_eq!(out.report.sentiment.up_count, 0);
        prop_assert_eq!(out.report.sentiment.limit_down_count, 0);
        prop_assert_eq!(out.report.sentiment.sentiment_description.as_str(), PARSE_FAILED_MARKER);
        prop_assert_eq!(out.report.date.as_str(), "2024-02-29");
    }

    #[test]
    fn dedupe_keeps_first_of_each_uri(input in proptest::collection::vec(citation(), 0..24)) {
        let once = dedupe_citations(&input);
        prop_assert_eq!(dedupe_citations(&once), once.clone());

        let mut expected: Vec<&CitationRef> = Vec::new();
        for candidate in input.iter().filter(|c| !c.uri.is_empty()) {
            if expected.iter().all(|kept| kept.uri != candidate.uri) {
                expected.push(candidate);
            }
        }
        prop_assert_eq!(once.iter().collect::<Vec<_>>(), expected);
    }
}
