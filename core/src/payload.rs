//! JSON payloads served to the dashboard sections.
//!
//! One variant per data product, each with an explicit optional-field
//! contract: `subject` is present only when a subject institution was
//! selected, `peers` only for lending products with a peer comparison.

use crate::{
    config::DataKind,
    income::IncomeBucket,
    minority::{BandRange, GeographyStats, MinorityBucket},
    peer::PeerComparison,
    report::{LendingSummary, Scope, ScopeReport},
    types::InstitutionId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<InstitutionId>,
    pub loan_count: u64,
    pub loan_amount: f64,
    pub income_count_pct: BTreeMap<IncomeBucket, f64>,
    pub income_amount_pct: BTreeMap<IncomeBucket, f64>,
    pub lmi_count_pct: f64,
    pub lmi_amount_pct: f64,
    pub minority_count_pct: BTreeMap<MinorityBucket, f64>,
    pub minority_amount_pct: BTreeMap<MinorityBucket, f64>,
    pub mmct_count_pct: f64,
    pub mmct_amount_pct: f64,
}

impl SectionSummary {
    pub fn from_summary(institution_id: Option<InstitutionId>, summary: &LendingSummary) -> Self {
        Self {
            institution_id,
            loan_count: summary.loan_count,
            loan_amount: summary.loan_amount,
            income_count_pct: IncomeBucket::CLASSIFIED
                .into_iter()
                .map(|b| (b, summary.income.count_pct(b)))
                .collect(),
            income_amount_pct: IncomeBucket::CLASSIFIED
                .into_iter()
                .map(|b| (b, summary.income.amount_pct(b)))
                .collect(),
            lmi_count_pct: summary.income.lmi_count_pct(),
            lmi_amount_pct: summary.income.lmi_amount_pct(),
            minority_count_pct: MinorityBucket::ALL
                .into_iter()
                .map(|b| (b, summary.minority.count_pct(b)))
                .collect(),
            minority_amount_pct: MinorityBucket::ALL
                .into_iter()
                .map(|b| (b, summary.minority.amount_pct(b)))
                .collect(),
            mmct_count_pct: summary.mmct.count_pct(),
            mmct_amount_pct: summary.mmct.amount_pct(),
        }
    }
}

/// Branch sections count branches and sum deposits instead of loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<InstitutionId>,
    pub branch_count: u64,
    pub deposits: f64,
    pub income_pct: BTreeMap<IncomeBucket, f64>,
    pub lmi_pct: f64,
    pub minority_pct: BTreeMap<MinorityBucket, f64>,
    pub mmct_pct: f64,
}

impl BranchSummary {
    pub fn from_summary(institution_id: Option<InstitutionId>, summary: &LendingSummary) -> Self {
        Self {
            institution_id,
            branch_count: summary.loan_count,
            deposits: summary.loan_amount,
            income_pct: IncomeBucket::CLASSIFIED
                .into_iter()
                .map(|b| (b, summary.income.count_pct(b)))
                .collect(),
            lmi_pct: summary.income.lmi_count_pct(),
            minority_pct: MinorityBucket::ALL
                .into_iter()
                .map(|b| (b, summary.minority.count_pct(b)))
                .collect(),
            mmct_pct: summary.mmct.count_pct(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionPayload {
    Hmda {
        scope: Scope,
        stats: GeographyStats,
        bands: [BandRange; 4],
        market: SectionSummary,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<SectionSummary>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peers: Option<SectionSummary>,
    },
    SmallBusiness {
        scope: Scope,
        stats: GeographyStats,
        bands: [BandRange; 4],
        market: SectionSummary,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<SectionSummary>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        peers: Option<SectionSummary>,
    },
    Branches {
        scope: Scope,
        stats: GeographyStats,
        bands: [BandRange; 4],
        market: BranchSummary,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subject: Option<BranchSummary>,
    },
    /// The selection matched no tracts.
    NoData { scope: Scope },
}

impl SectionPayload {
    pub fn build(
        kind: DataKind,
        report: &ScopeReport,
        comparison: Option<&PeerComparison>,
    ) -> Self {
        let scope = report.scope.clone();
        let stats = report.stats;
        let bands = report.bands;

        match kind {
            DataKind::Hmda | DataKind::SmallBusiness => {
                let market = SectionSummary::from_summary(None, &report.total);
                let subject = comparison.map(|c| {
                    SectionSummary::from_summary(
                        Some(c.subject.institution_id.clone()),
                        &c.subject.summary,
                    )
                });
                let peers = comparison.map(|c| SectionSummary::from_summary(None, &c.peers));
                if kind == DataKind::Hmda {
                    SectionPayload::Hmda { scope, stats, bands, market, subject, peers }
                } else {
                    SectionPayload::SmallBusiness { scope, stats, bands, market, subject, peers }
                }
            }
            DataKind::Branches => SectionPayload::Branches {
                scope,
                stats,
                bands,
                market: BranchSummary::from_summary(None, &report.total),
                subject: comparison.map(|c| {
                    BranchSummary::from_summary(
                        Some(c.subject.institution_id.clone()),
                        &c.subject.summary,
                    )
                }),
            },
        }
    }

    pub fn no_data(scope: Scope) -> Self {
        SectionPayload::NoData { scope }
    }
}
