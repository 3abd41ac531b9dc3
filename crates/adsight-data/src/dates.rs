//! Free-text date range resolution.
//!
//! Queries arrive in Vietnamese, English, or a mix of both; the resolver
//! maps whatever phrase it finds to a concrete inclusive date range and
//! silently falls back to the trailing 30 days when nothing matches.

use std::sync::LazyLock;

use chrono::{Datelike, Days, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

/// An inclusive date range, serialized as `{"start": "YYYY-MM-DD", "end": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// Accepts "ngảy" alongside "ngày": a common typo in real queries.
static LAST_N_DAYS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(days?|ngay|ngày|ngảy)").expect("static regex must compile")
});

/// Resolves a free-text phrase against `today`.
///
/// Resolution order, first match wins:
/// 1. `"<N> days"` / `"<N> ngày"` → trailing N days ending today.
/// 2. A Vietnamese month token (`"tháng 11"`) → that full calendar month,
///    rolled back a year when the month has not happened yet.
/// 3. `"this week"` / `"tuần này"` → Monday through today;
///    `"this month"` / `"tháng này"` → first of month through today.
/// 4. Anything else → trailing 30 days.
#[must_use]
pub fn parse_date_range(phrase: &str, today: NaiveDate) -> DateRange {
    let lower = phrase.to_lowercase();

    if let Some(caps) = LAST_N_DAYS.captures(&lower) {
        // Day counts past the calendar's edge fall through to the default
        // window instead of overflowing the date arithmetic.
        let start = caps[1]
            .parse::<u64>()
            .ok()
            .and_then(|days| today.checked_sub_days(Days::new(days)));
        if let Some(start) = start {
            return DateRange { start, end: today };
        }
    }

    if let Some(range) = match_named_month(&lower, today) {
        return range;
    }

    if lower.contains("this week") || lower.contains("tuần này") {
        let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        return DateRange {
            start: monday,
            end: today,
        };
    }

    if lower.contains("this month") || lower.contains("tháng này") {
        if let Some(first) = today.with_day(1) {
            return DateRange {
                start: first,
                end: today,
            };
        }
    }

    DateRange {
        start: today - Duration::days(30),
        end: today,
    }
}

/// Convenience wrapper resolving against the current UTC date.
#[must_use]
pub fn parse_date_range_now(phrase: &str) -> DateRange {
    parse_date_range(phrase, Utc::now().date_naive())
}

/// Matches Vietnamese month tokens: `tháng 11`, `thang 11`, `tháng 03`, ...
///
/// Months are checked from 12 down to 1 so that `"tháng 1"` does not
/// shadow `"tháng 11"` / `"tháng 12"`.
fn match_named_month(lower: &str, today: NaiveDate) -> Option<DateRange> {
    for month in (1..=12u32).rev() {
        let mut tokens = vec![format!("tháng {month}"), format!("thang {month}")];
        if month < 10 {
            tokens.push(format!("tháng {month:02}"));
        }

        let hit = tokens.iter().any(|token| {
            // Reject prefix matches such as "tháng 1" inside "tháng 10".
            lower.find(token.as_str()).is_some_and(|pos| {
                lower[pos + token.len()..]
                    .chars()
                    .next()
                    .is_none_or(|next| !next.is_ascii_digit())
            })
        });
        if !hit {
            continue;
        }

        let year = if month > today.month() {
            today.year() - 1
        } else {
            today.year()
        };

        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let first_of_next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };

        return Some(DateRange {
            start,
            end: first_of_next - Duration::days(1),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Thursday in late November.
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn last_n_days_english() {
        let range = parse_date_range("last 5 days", today());
        assert_eq!(range.start, d(2025, 11, 15));
        assert_eq!(range.end, today());
    }

    #[test]
    fn last_n_days_vietnamese() {
        let range = parse_date_range("7 ngày qua", today());
        assert_eq!(range.start, d(2025, 11, 13));
        assert_eq!(range.end, today());
    }

    #[test]
    fn named_month_in_current_year() {
        let range = parse_date_range("chi phí tháng 11", today());
        assert_eq!(range.start, d(2025, 11, 1));
        assert_eq!(range.end, d(2025, 11, 30));
    }

    #[test]
    fn named_month_resolution_ignores_today() {
        // Same month phrase, different "today" values in the same year:
        // the resolved month boundaries must not change.
        for day in [1, 15, 30] {
            let range = parse_date_range("tháng 11", d(2025, 11, day));
            assert_eq!(range.start, d(2025, 11, 1));
            assert_eq!(range.end, d(2025, 11, 30));
        }
    }

    #[test]
    fn future_month_rolls_back_a_year() {
        let range = parse_date_range("tháng 12", d(2025, 11, 20));
        assert_eq!(range.start, d(2024, 12, 1));
        assert_eq!(range.end, d(2024, 12, 31));
    }

    #[test]
    fn december_spans_to_year_end() {
        let range = parse_date_range("tháng 12", d(2025, 12, 10));
        assert_eq!(range.start, d(2025, 12, 1));
        assert_eq!(range.end, d(2025, 12, 31));
    }

    #[test]
    fn two_digit_month_not_shadowed_by_one_digit() {
        let range = parse_date_range("tháng 10", today());
        assert_eq!(range.start, d(2025, 10, 1));
        assert_eq!(range.end, d(2025, 10, 31));
    }

    #[test]
    fn zero_padded_month_token() {
        let range = parse_date_range("tháng 03", today());
        assert_eq!(range.start, d(2025, 3, 1));
        assert_eq!(range.end, d(2025, 3, 31));
    }

    #[test]
    fn this_week_starts_monday() {
        let range = parse_date_range("this week", today());
        assert_eq!(range.start, d(2025, 11, 17)); // the Monday before
        assert_eq!(range.end, today());
    }

    #[test]
    fn this_month_starts_on_the_first() {
        let range = parse_date_range("tháng này", today());
        assert_eq!(range.start, d(2025, 11, 1));
        assert_eq!(range.end, today());
    }

    #[test]
    fn absurd_day_count_falls_back_to_default_window() {
        // Large enough to walk off the calendar; must not panic.
        let range = parse_date_range("999999999 ngày", today());
        assert_eq!(range.start, d(2025, 10, 21));
        assert_eq!(range.end, today());

        // Too large even for the integer parse.
        let range = parse_date_range("99999999999999999999999 days", today());
        assert_eq!(range.start, d(2025, 10, 21));
    }

    #[test]
    fn unmatched_text_defaults_to_trailing_30_days() {
        let range = parse_date_range("how is everything going", today());
        assert_eq!(range.start, d(2025, 10, 21));
        assert_eq!(range.end, today());
    }

    #[test]
    fn empty_phrase_defaults_too() {
        let range = parse_date_range("", today());
        assert_eq!(range.start, today() - Duration::days(30));
    }

    #[test]
    fn serializes_to_iso_strings() {
        let range = parse_date_range("tháng 11", today());
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json["start"], "2025-11-01");
        assert_eq!(json["end"], "2025-11-30");
    }
}
