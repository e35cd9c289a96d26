//! Skill and monthly upload aggregation
//!
//! Pure transforms from a certificate sequence to chart-ready histograms.
//! No I/O and no shared state: safe to call repeatedly and concurrently,
//! and the same input always yields the same output.
//!
//! # Skill tokens
//!
//! A certificate's `skills` field is split on commas, each token trimmed and
//! lower-cased for grouping; empty tokens are dropped. A token repeated
//! within one certificate counts once per occurrence, so the sum of all
//! counts equals the total number of non-empty tokens in the input.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::Certificate;

/// One bar/slice of the skill chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillCount {
    /// Display name: first character upper-cased, remainder lower-cased
    pub name: String,
    pub count: usize,
}

/// One point of the uploads-per-month chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// Short month name and year, e.g. `Mar 2024`
    pub month: String,
    pub count: usize,
}

/// Normalized skill tokens of one raw skills field, in order of appearance
pub fn skill_tokens(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Count skill tokens across all certificates
///
/// Entries are emitted in first-seen order across the input sequence.
pub fn skill_histogram(certificates: &[Certificate]) -> Vec<SkillCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for certificate in certificates {
        for token in skill_tokens(&certificate.skills) {
            match counts.get_mut(&token) {
                Some(count) => *count += 1,
                None => {
                    counts.insert(token.clone(), 1);
                    order.push(token);
                }
            }
        }
    }

    order
        .into_iter()
        .map(|token| SkillCount {
            name: capitalize(&token),
            count: counts[&token],
        })
        .collect()
}

/// Count uploads per calendar month, bucketing creation timestamps in UTC
pub fn monthly_histogram(certificates: &[Certificate]) -> Vec<MonthlyCount> {
    monthly_histogram_in(certificates, &Utc)
}

/// Count uploads per calendar month in the given display time zone
///
/// Entries are sorted ascending by (year, month); label strings are not
/// used for ordering since they do not sort chronologically.
pub fn monthly_histogram_in<Tz: TimeZone>(certificates: &[Certificate], tz: &Tz) -> Vec<MonthlyCount> {
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();

    for certificate in certificates {
        *buckets.entry(month_key(&certificate.created_at, tz)).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), count)| MonthlyCount {
            month: month_label(year, month),
            count,
        })
        .collect()
}

fn month_key<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> (i32, u32) {
    let local = timestamp.with_timezone(tz);
    (local.year(), local.month())
}

fn month_label(year: i32, month: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(date) => date.format("%b %Y").to_string(),
        None => format!("{:02} {}", month, year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_tokens_trim_lowercase_and_drop_empty() {
        let tokens: Vec<String> = skill_tokens(" AWS ,, Networking,  ,docker").collect();
        assert_eq!(tokens, vec!["aws", "networking", "docker"]);
    }

    #[test]
    fn test_skill_tokens_empty_field() {
        assert_eq!(skill_tokens("").count(), 0);
        assert_eq!(skill_tokens(" , ,").count(), 0);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("aws"), "Aws");
        assert_eq!(capitalize("MACHINE learning"), "Machine learning");
        assert_eq!(capitalize("é"), "É");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_month_label_format() {
        assert_eq!(month_label(2024, 3), "Mar 2024");
        assert_eq!(month_label(1999, 12), "Dec 1999");
    }
}
