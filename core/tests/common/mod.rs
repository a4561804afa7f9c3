#![allow(dead_code)]

use tractlens_core::{
    income::EncodingScheme,
    record::{TractGroup, TractRecord},
    types::GroupKey,
};

/// A record in `county`/`year` for `institution`.
pub fn tract(
    institution: &str,
    county: &str,
    year: u16,
    geoid: &str,
    code: u32,
    minority_pct: f64,
    loan_count: u64,
    loan_amount: f64,
) -> TractRecord {
    TractRecord {
        institution_id: institution.into(),
        county_fips: county.into(),
        year,
        tract_geoid: geoid.into(),
        raw_income_code: code,
        minority_percentage: minority_pct,
        loan_count,
        loan_amount,
    }
}

pub fn group(
    institution: &str,
    county: &str,
    year: u16,
    scheme: EncodingScheme,
    rows: &[(&str, u32, f64, u64, f64)],
) -> TractGroup {
    let records = rows.iter().map(|(geoid, code, pct, count, amount)| {
        tract(institution, county, year, geoid, *code, *pct, *count, *amount)
    });
    TractGroup::from_records(GroupKey::new(institution, county, year), scheme, records)
        .expect("fixture group")
}

/// Two lenders in county 12086 for 2023 sharing tract T1:
///
/// | tract | minority % | BANK_A (summary)    | BANK_B (single digit) |
/// |-------|-----------:|---------------------|-----------------------|
/// | T1    | 80         | 101 Low, 10 / 100   | 1 Low, 5 / 50         |
/// | T2    | 20         | 104 Upper, 10 / 300 |                       |
/// | T3    | 50         |                     | 15 Unknown, 5 / 50    |
///
/// plus BANK_A activity in another county and another year that must stay
/// out of scope.
pub fn two_lender_fixture() -> Vec<TractGroup> {
    vec![
        group(
            "BANK_A",
            "12086",
            2023,
            EncodingScheme::Summary,
            &[("T1", 101, 80.0, 10, 100.0), ("T2", 104, 20.0, 10, 300.0)],
        ),
        group(
            "BANK_B",
            "12086",
            2023,
            EncodingScheme::SingleDigit,
            &[("T1", 1, 80.0, 5, 50.0), ("T3", 15, 50.0, 5, 50.0)],
        ),
        group(
            "BANK_A",
            "12011",
            2023,
            EncodingScheme::Summary,
            &[("T9", 101, 99.0, 1_000, 9_000.0)],
        ),
        group(
            "BANK_A",
            "12086",
            2022,
            EncodingScheme::SubcategoryUnpadded,
            &[("T1", 5, 80.0, 1_000, 9_000.0)],
        ),
    ]
}

pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected} (±{tolerance}), got {actual}"
    );
}
