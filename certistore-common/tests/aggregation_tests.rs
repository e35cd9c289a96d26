//! Tests for skill and monthly aggregation

use certistore_common::aggregation::{
    monthly_histogram, monthly_histogram_in, skill_histogram, skill_tokens, MonthlyCount, SkillCount,
};
use certistore_common::{Certificate, CertificateId, PrincipalId};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};

fn certificate(skills: &str, created_at: DateTime<Utc>) -> Certificate {
    Certificate {
        id: CertificateId::generate(),
        owner_id: PrincipalId::new("user-1"),
        title: "Cert".to_string(),
        company: "Acme".to_string(),
        skills: skills.to_string(),
        file_url: "http://localhost/files/certificates/user-1/x.pdf".to_string(),
        created_at,
    }
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

fn skill(name: &str, count: usize) -> SkillCount {
    SkillCount {
        name: name.to_string(),
        count,
    }
}

fn month(label: &str, count: usize) -> MonthlyCount {
    MonthlyCount {
        month: label.to_string(),
        count,
    }
}

#[test]
fn test_skill_histogram_groups_case_and_whitespace() {
    let records = vec![
        certificate("AWS, Networking", at(2024, 1, 1)),
        certificate("aws,networking", at(2024, 1, 2)),
        certificate("Docker", at(2024, 1, 3)),
    ];

    assert_eq!(
        skill_histogram(&records),
        vec![skill("Aws", 2), skill("Networking", 2), skill("Docker", 1)]
    );
}

#[test]
fn test_skill_histogram_first_seen_order_not_count_order() {
    let records = vec![
        certificate("rust", at(2024, 1, 1)),
        certificate("go, python", at(2024, 1, 1)),
        certificate("python, python, go", at(2024, 1, 1)),
    ];

    let names: Vec<String> = skill_histogram(&records).into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Rust", "Go", "Python"]);
}

#[test]
fn test_skill_histogram_counts_each_occurrence() {
    let records = vec![certificate("SQL, sql , Sql", at(2024, 5, 1))];
    assert_eq!(skill_histogram(&records), vec![skill("Sql", 3)]);
}

#[test]
fn test_skill_histogram_sum_equals_token_count() {
    let records = vec![
        certificate(" a, b ,, c", at(2024, 1, 1)),
        certificate("", at(2024, 1, 1)),
        certificate("B, b, d,", at(2024, 2, 1)),
        certificate(" , ", at(2024, 3, 1)),
    ];

    let total_tokens: usize = records.iter().map(|r| skill_tokens(&r.skills).count()).sum();
    let histogram_total: usize = skill_histogram(&records).iter().map(|s| s.count).sum();

    assert_eq!(total_tokens, 6);
    assert_eq!(histogram_total, total_tokens);
}

#[test]
fn test_monthly_histogram_chronological_not_alphabetical() {
    let records = vec![
        certificate("x", at(2024, 3, 10)),
        certificate("x", at(2024, 3, 20)),
        certificate("x", at(2024, 1, 5)),
    ];

    assert_eq!(
        monthly_histogram(&records),
        vec![month("Jan 2024", 1), month("Mar 2024", 2)]
    );
}

#[test]
fn test_monthly_histogram_orders_across_years() {
    let records = vec![
        certificate("x", at(2024, 2, 1)),
        certificate("x", at(2023, 12, 1)),
        certificate("x", at(2023, 4, 1)),
        certificate("x", at(2025, 1, 1)),
        certificate("x", at(2023, 12, 31)),
    ];

    let histogram = monthly_histogram(&records);
    let labels: Vec<&str> = histogram.iter().map(|m| m.month.as_str()).collect();

    // "Apr" < "Dec" < "Feb" < "Jan" alphabetically; chronology differs
    assert_eq!(labels, vec!["Apr 2023", "Dec 2023", "Feb 2024", "Jan 2025"]);
    assert_eq!(histogram[1].count, 2);
}

#[test]
fn test_monthly_histogram_strictly_ascending() {
    let records: Vec<Certificate> = (0..40)
        .map(|i| certificate("x", at(2020 + (i * 7 % 5), (i * 5 % 12 + 1) as u32, 1)))
        .collect();

    let histogram = monthly_histogram(&records);
    let parsed: Vec<chrono::NaiveDate> = histogram
        .iter()
        .map(|m| chrono::NaiveDate::parse_from_str(&format!("01 {}", m.month), "%d %b %Y").unwrap())
        .collect();

    assert!(parsed.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(histogram.iter().map(|m| m.count).sum::<usize>(), records.len());
}

#[test]
fn test_monthly_histogram_uses_display_time_zone() {
    // 2024-02-01 02:00 UTC is still January in UTC-5
    let records = vec![certificate("x", Utc.with_ymd_and_hms(2024, 2, 1, 2, 0, 0).unwrap())];

    assert_eq!(monthly_histogram(&records), vec![month("Feb 2024", 1)]);

    let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
    assert_eq!(monthly_histogram_in(&records, &eastern), vec![month("Jan 2024", 1)]);
}

#[test]
fn test_aggregations_are_idempotent() {
    let records = vec![
        certificate("Kubernetes, Helm", at(2024, 6, 1)),
        certificate("helm", at(2024, 7, 1)),
    ];

    assert_eq!(skill_histogram(&records), skill_histogram(&records));
    assert_eq!(monthly_histogram(&records), monthly_histogram(&records));
}

#[test]
fn test_empty_input_yields_empty_output() {
    assert!(skill_histogram(&[]).is_empty());
    assert!(monthly_histogram(&[]).is_empty());
}
