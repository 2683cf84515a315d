use super::*;
use std::collections::HashSet;
use test_case::test_case;

#[test_case("11.0-SNAPSHOT" => Some(vec![11, 0]); "snapshot qualifier")]
#[test_case("22.0.5" => Some(vec![22, 0, 5]); "three groups")]
#[test_case("  10 " => Some(vec![10]); "single group with padding")]
#[test_case("1.2.3.Final" => Some(vec![1, 2, 3]); "final qualifier group")]
#[test_case("4.1.2.4.5.6" => Some(vec![4, 1, 2, 4, 5, 6]); "many groups")]
#[test_case("" => None; "empty")]
#[test_case("   " => None; "blank")]
#[test_case("SNAPSHOT" => None; "no digits")]
fn parse_version(text: &str) -> Option<Vec<u32>> {
    ApiVersion::parse(text).map(|version| version.segments().to_vec())
}

#[test]
fn parse_of_absent_text_is_absent() {
    let absent: Option<&str> = None;
    assert!(absent.and_then(ApiVersion::parse).is_none());
}

#[test]
fn missing_segments_compare_as_zero() {
    let short = ApiVersion::new([11]);
    let long = ApiVersion::new([11, 0, 0]);
    assert_eq!(short, long);

    let mut set = HashSet::new();
    set.insert(short);
    assert!(set.contains(&long));

    assert!(ApiVersion::new([11, 0, 1]) > ApiVersion::new([11]));
    assert!(ApiVersion::new([10, 9]) < ApiVersion::new([11]));
    assert!(ApiVersion::new([2]) < ApiVersion::new([10]));
}

#[test]
fn canonical_string_form() {
    let version = ApiVersion::parse("22.0.5-RC1").expect("version");
    assert_eq!(version.to_string(), "22.0.5");
    assert_eq!(version.major(), 22);
    assert_eq!(version.segment(7), 0);
}

#[test]
fn facet_set_reports_membership() {
    trait Greeting: Send + Sync {
        fn greet(&self) -> String;
    }
    struct English;
    impl Greeting for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    let mut facets = FacetSet::new();
    assert!(facets.is_empty());
    facets.insert::<dyn Greeting>(std::sync::Arc::new(English));
    assert!(facets.contains::<dyn Greeting>());
    assert!(!facets.contains::<String>());
    assert_eq!(facets.len(), 1);
    let greeting = facets.get::<dyn Greeting>().expect("facet");
    assert_eq!(greeting.greet(), "hello");
}
