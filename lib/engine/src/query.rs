//! Party size inference and query expansion for free-text queries

use hyurim_core::capacity_band;
use regex::Regex;
use std::sync::LazyLock;

/// Largest party size accepted from query text
const MAX_INFERRED_CAPACITY: u32 = 99;

/// `4인`, `4명`, `4인용`
static KOREAN_COUNT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\d{1,3})\s*(?:인용|인|명)").ok());

/// `4-person`, `4 people`, `4 guests`, `4 pax`
static ENGLISH_COUNT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,3})[\s-]*(?:persons?|people|guests?|pax)\b").ok());

/// `for 4`, with the word after the number captured so durations can be told apart
static FOR_COUNT_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\bfor\s+(\d{1,3})\b(?:\s*(\p{L}+))?").ok());

/// Words that make `for N` a length of stay rather than a party size
const DURATION_UNITS: &[&str] = &[
    "night", "nights", "day", "days", "week", "weeks", "hour", "hours", "박", "일", "주", "시간",
];

/// Party size mentioned in `query`, if any
pub fn infer_capacity(query: &str) -> Option<u32> {
    [&KOREAN_COUNT_RE, &ENGLISH_COUNT_RE]
        .into_iter()
        .filter_map(|re| re.as_ref())
        .find_map(|re| {
            let caps = re.captures(query)?;
            caps.get(1)?.as_str().parse::<u32>().ok()
        })
        .or_else(|| for_count(query))
        .filter(|n| (1..=MAX_INFERRED_CAPACITY).contains(n))
}

/// Query text to embed: the party-size phrase facility documents carry is
/// appended when a capacity is known.
pub fn expand_query(query: &str, capacity: Option<u32>) -> String {
    match capacity {
        Some(capacity) => format!("{} {}", query, capacity_band(capacity)),
        None => query.to_string(),
    }
}

fn for_count(query: &str) -> Option<u32> {
    let re = FOR_COUNT_RE.as_ref()?;
    re.captures_iter(query).find_map(|caps| {
        let is_duration = caps
            .get(2)
            .is_some_and(|unit| DURATION_UNITS.contains(&unit.as_str().to_lowercase().as_str()));
        if is_duration {
            return None;
        }
        caps.get(1)?.as_str().parse::<u32>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_korean_counts() {
        assert_eq!(infer_capacity("4인 가족 숙소"), Some(4));
        assert_eq!(infer_capacity("6명이 묵을 방"), Some(6));
        assert_eq!(infer_capacity("2인용 객실"), Some(2));
    }

    #[test]
    fn test_english_counts() {
        assert_eq!(infer_capacity("4-person family room"), Some(4));
        assert_eq!(infer_capacity("cabin for 3 People"), Some(3));
        assert_eq!(infer_capacity("room for 5"), Some(5));
        assert_eq!(infer_capacity("8 guests near the beach"), Some(8));
    }

    #[test]
    fn test_no_count() {
        assert_eq!(infer_capacity("quiet cabin with a view"), None);
        assert_eq!(infer_capacity("open 24 hours"), None);
        assert_eq!(infer_capacity("0 people"), None);
    }

    #[test]
    fn test_expand_query() {
        assert_eq!(expand_query("family room", Some(4)), "family room 소규모가족 커플여행");
        assert_eq!(expand_query("lodge", Some(12)), "lodge 대가족 단체여행");
        assert_eq!(expand_query("lodge", None), "lodge");
    }

    #[test]
    fn test_durations_are_not_party_sizes() {
        assert_eq!(infer_capacity("cabin for 3 nights"), None);
        assert_eq!(infer_capacity("lodge for 2 weeks"), None);
        assert_eq!(infer_capacity("room for 2 Days in july"), None);
        assert_eq!(infer_capacity("숲속 숙소 for 2 박"), None);
        assert_eq!(infer_capacity("for 3박"), None);
        // a duration does not hide a party size elsewhere in the query
        assert_eq!(infer_capacity("4 people for 2 nights"), Some(4));
        assert_eq!(infer_capacity("room for 2 adults"), Some(2));
    }
}
