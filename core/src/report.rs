//! Scope report assembly.
//!
//! A report covers exactly one geography (one or more counties) for one
//! year. Building it is two-pass:
//!   1. geography statistics over the distinct in-scope tracts
//!   2. per-record income bucket, minority band and MMCT flag, tallied per
//!      institution and for the scope as a whole
//!
//! Statistics are never reused across scopes.

use crate::{
    config::{DashboardFilters, ReportConfig},
    error::{ClassifyError, ClassifyResult},
    income::IncomeBucket,
    minority::{
        bucket_minority, compute_geography_stats, is_mmct, BandRange, GeographyStats,
        MinorityAggregate, MinorityBucket,
    },
    percentage::IncomeAggregate,
    record::{TractGroup, TractRecord},
    types::{CountyFips, InstitutionId, TractGeoid, Year},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

// ── Scope ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub county_fips: Vec<CountyFips>,
    pub year: Year,
}

impl Scope {
    pub fn new(mut county_fips: Vec<CountyFips>, year: Year) -> Self {
        county_fips.sort();
        county_fips.dedup();
        Self { county_fips, year }
    }

    pub fn county(county_fips: impl Into<String>, year: Year) -> Self {
        Self::new(vec![county_fips.into()], year)
    }

    /// One scope per selected year, each over all selected counties.
    pub fn from_filters(filters: &DashboardFilters) -> Vec<Scope> {
        filters
            .years
            .iter()
            .map(|year| Scope::new(filters.county_fips.clone(), *year))
            .collect()
    }

    pub fn contains_group(&self, group: &TractGroup) -> bool {
        let key = group.key();
        key.year == self.year && self.county_fips.iter().any(|c| *c == key.county_fips)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.year, self.county_fips.join(", "))
    }
}

// ── Summaries ────────────────────────────────────────────────────────────────

/// Loans (or branches) in majority-minority tracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MmctShare {
    pub mmct_count: f64,
    pub mmct_amount: f64,
    pub total_count: f64,
    pub total_amount: f64,
}

impl MmctShare {
    pub fn record(&mut self, mmct: bool, loan_count: u64, loan_amount: f64) {
        self.total_count += loan_count as f64;
        self.total_amount += loan_amount;
        if mmct {
            self.mmct_count += loan_count as f64;
            self.mmct_amount += loan_amount;
        }
    }

    pub fn merge(&mut self, other: &MmctShare) {
        self.mmct_count += other.mmct_count;
        self.mmct_amount += other.mmct_amount;
        self.total_count += other.total_count;
        self.total_amount += other.total_amount;
    }

    pub fn count_pct(&self) -> f64 {
        share_pct(self.mmct_count, self.total_count)
    }

    pub fn amount_pct(&self) -> f64 {
        share_pct(self.mmct_amount, self.total_amount)
    }
}

fn share_pct(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Everything reported for one set of loans: income, minority and MMCT
/// breakdowns, each by count and by amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LendingSummary {
    pub loan_count: u64,
    pub loan_amount: f64,
    pub income: IncomeAggregate,
    pub minority: MinorityAggregate,
    pub mmct: MmctShare,
}

impl LendingSummary {
    pub fn record(&mut self, tract: &ClassifiedTract) {
        self.loan_count += tract.loan_count;
        self.loan_amount += tract.loan_amount;
        self.income.record(tract.income, tract.loan_count, tract.loan_amount);
        self.minority.record(tract.minority, tract.loan_count, tract.loan_amount);
        self.mmct.record(tract.mmct, tract.loan_count, tract.loan_amount);
    }

    pub fn merge(&mut self, other: &LendingSummary) {
        self.loan_count += other.loan_count;
        self.loan_amount += other.loan_amount;
        self.income.merge(&other.income);
        self.minority.merge(&other.minority);
        self.mmct.merge(&other.mmct);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionSummary {
    pub institution_id: InstitutionId,
    pub summary: LendingSummary,
}

/// One record after both passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTract {
    pub institution_id: InstitutionId,
    pub tract_geoid: TractGeoid,
    pub income: IncomeBucket,
    pub minority: MinorityBucket,
    pub mmct: bool,
    pub minority_percentage: f64,
    pub loan_count: u64,
    pub loan_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeReport {
    pub scope: Scope,
    pub stats: GeographyStats,
    pub bands: [BandRange; 4],
    /// Sorted by institution id.
    pub institutions: Vec<InstitutionSummary>,
    pub total: LendingSummary,
    pub tracts: Vec<ClassifiedTract>,
}

impl ScopeReport {
    pub fn institution(&self, institution_id: &str) -> Option<&InstitutionSummary> {
        self.institutions
            .iter()
            .find(|i| i.institution_id == institution_id)
    }
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// One record per tract GEOID, first occurrence wins. The same tract shows
/// up once per institution lending in it, but counts once in the stats.
fn distinct_tracts<'a>(groups: &[&'a TractGroup]) -> Vec<&'a TractRecord> {
    let mut seen: BTreeMap<&str, &TractRecord> = BTreeMap::new();
    for group in groups.iter().copied() {
        for record in group.records() {
            seen.entry(record.tract_geoid.as_str()).or_insert(record);
        }
    }
    seen.into_values().collect()
}

/// Build the report for `scope` from whichever of `groups` fall inside it.
///
/// Fails with `InsufficientData` when the scope holds no tracts.
pub fn build_scope_report(
    groups: &[TractGroup],
    scope: &Scope,
    config: &ReportConfig,
) -> ClassifyResult<ScopeReport> {
    let in_scope: Vec<&TractGroup> = groups.iter().filter(|g| scope.contains_group(g)).collect();

    // Pass 1
    let tracts = distinct_tracts(&in_scope);
    let stats = compute_geography_stats(tracts.iter().copied())?;
    log::debug!(
        "scope {scope}: {} tracts, mean minority {:.2}%, sd {:.2}",
        stats.tract_count,
        stats.mean_minority_pct,
        stats.stddev_minority_pct,
    );

    // Pass 2
    let mut per_institution: BTreeMap<InstitutionId, LendingSummary> = BTreeMap::new();
    let mut classified = Vec::new();

    for group in &in_scope {
        let income = group.income_aggregate();
        let total = income.counts.total();
        if total > 0.0 {
            let unknown_share = income.counts.unknown() / total;
            if unknown_share > config.unknown_share_warning {
                log::warn!(
                    "group {} ({}): {:.0}% of loans have an unrecognised income code",
                    group.key(),
                    group.scheme(),
                    unknown_share * 100.0,
                );
            }
        }

        let summary = per_institution
            .entry(group.key().institution_id.clone())
            .or_default();

        for (record, income_bucket) in group.classify() {
            let tract = ClassifiedTract {
                institution_id: record.institution_id.clone(),
                tract_geoid: record.tract_geoid.clone(),
                income: income_bucket,
                minority: bucket_minority(record.minority_percentage, &stats),
                mmct: is_mmct(record.minority_percentage, config.mmct_threshold_pct),
                minority_percentage: record.minority_percentage,
                loan_count: record.loan_count,
                loan_amount: record.loan_amount,
            };
            summary.record(&tract);
            classified.push(tract);
        }
    }

    let mut total = LendingSummary::default();
    let institutions: Vec<InstitutionSummary> = per_institution
        .into_iter()
        .map(|(institution_id, summary)| {
            total.merge(&summary);
            InstitutionSummary {
                institution_id,
                summary,
            }
        })
        .collect();

    log::info!(
        "scope {scope}: report built for {} institutions, {} loans",
        institutions.len(),
        total.loan_count,
    );

    Ok(ScopeReport {
        scope: scope.clone(),
        bands: stats.display_bands(),
        stats,
        institutions,
        total,
        tracts: classified,
    })
}

/// A report, or an explicit "no data for this selection". Keeps an empty
/// selection distinct from a selection whose percentages are all zero.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Ready(Box<ScopeReport>),
    NoData { scope: Scope },
}

pub fn report_or_no_data(
    groups: &[TractGroup],
    scope: &Scope,
    config: &ReportConfig,
) -> ClassifyResult<ReportOutcome> {
    match build_scope_report(groups, scope, config) {
        Ok(report) => Ok(ReportOutcome::Ready(Box::new(report))),
        Err(ClassifyError::InsufficientData) => {
            log::info!("scope {scope}: no tracts, reporting no data");
            Ok(ReportOutcome::NoData {
                scope: scope.clone(),
            })
        }
        Err(e) => Err(e),
    }
}
