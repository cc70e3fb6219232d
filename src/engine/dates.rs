use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());
static MONTH_DAY_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTHS})\s+(\d{{1,2}}),?\s+(\d{{4}})\b")).unwrap()
});
static MONTH_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)\b({MONTHS})\s+(\d{{4}})\b")).unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

/// Field values that mean "no date recorded".
const SENTINELS: &[&str] = &["not announced", "limited data", "limited mandate"];

/// Year-only mentions land mid-year.
const YEAR_ONLY_MONTH: u32 = 6;

/// Parse a free-text date field. `None` means unknown; this never fails.
///
/// Tried in order after dropping `( … )` notes:
/// "January 2, 2025" → exact day, "March 2020" → first of month,
/// any `20xx` → June 1 of that year.
pub fn parse(text: &str) -> Option<NaiveDate> {
    let cleaned = PAREN_RE.replace_all(text, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || is_sentinel(cleaned) {
        return None;
    }

    let parsed = month_day_year(cleaned)
        .or_else(|| month_year(cleaned))
        .or_else(|| year_only(cleaned));
    if parsed.is_none() {
        debug!(text, "unparsable date, treating as unknown");
    }
    parsed
}

/// Parse an optional field; absent text is unknown.
pub fn parse_opt(text: Option<&str>) -> Option<NaiveDate> {
    text.and_then(parse)
}

fn is_sentinel(cleaned: &str) -> bool {
    let lower = cleaned.to_lowercase();
    lower.starts_with("n/a") || SENTINELS.contains(&lower.as_str())
}

fn month_day_year(text: &str) -> Option<NaiveDate> {
    MONTH_DAY_YEAR_RE.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn month_year(text: &str) -> Option<NaiveDate> {
    MONTH_YEAR_RE.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let year = caps[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, 1)
    })
}

fn year_only(text: &str) -> Option<NaiveDate> {
    let caps = YEAR_RE.captures(text)?;
    let year = caps[1].parse().ok()?;
    NaiveDate::from_ymd_opt(year, YEAR_ONLY_MONTH, 1)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .split('|')
        .position(|m| m == lower)
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    #[test]
    fn month_and_year() {
        assert_eq!(parse("March 2020"), d(2020, 3, 1));
        assert_eq!(parse("september 2021"), d(2021, 9, 1));
    }

    #[test]
    fn full_date_with_and_without_comma() {
        assert_eq!(parse("January 2, 2025"), d(2025, 1, 2));
        assert_eq!(parse("January 2 2025"), d(2025, 1, 2));
        assert_eq!(parse("Effective October 14, 2024 for most teams"), d(2024, 10, 14));
    }

    #[test]
    fn year_only_defaults_to_june() {
        assert_eq!(parse("2022 (post-Musk acquisition)"), d(2022, 6, 1));
        assert_eq!(parse("Early 2023"), d(2023, 6, 1));
    }

    #[test]
    fn parenthetical_is_stripped_before_matching() {
        assert_eq!(parse("April 2022 (3 days/week)"), d(2022, 4, 1));
        // a date inside the note is ignored
        assert_eq!(parse("Q2 (June 5, 2023)"), None);
    }

    #[test]
    fn sentinels_are_unknown() {
        assert_eq!(parse("Not announced"), None);
        assert_eq!(parse("  limited DATA "), None);
        assert_eq!(parse("Limited mandate"), None);
        assert_eq!(parse("N/A — fully remote"), None);
        assert_eq!(parse("N/A (skipped) 2021"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse_opt(None), None);
    }

    #[test]
    fn impossible_day_falls_through() {
        // no "Month YYYY" match, so the bare year wins
        assert_eq!(parse("February 30, 2021"), d(2021, 6, 1));
    }

    #[test]
    fn unrecognized_text_is_unknown() {
        assert_eq!(parse("TBD"), None);
        assert_eq!(parse("Sometime in 1999"), None);
    }

    #[test]
    fn abbreviated_month_is_year_only() {
        assert_eq!(parse("Mar 2021"), d(2021, 6, 1));
    }

    #[test]
    fn full_date_beats_month_year_and_year() {
        // "March 2020" appears first in the text but the full date has priority
        assert_eq!(parse("March 2020 announced, June 6, 2022 enforced"), d(2022, 6, 6));
    }

    #[test]
    fn later_month_name_beats_earlier_bare_year() {
        // every "Month YYYY" in the text is tried before the bare-year fallback
        assert_eq!(parse("by end of 2022, fully in March 2023"), d(2023, 3, 1));
    }
}
