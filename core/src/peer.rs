//! Subject-versus-peer comparison.
//!
//! Peers are the other institutions active in the same scope whose volume
//! falls inside the configured band around the subject's (50%–200% by
//! default). Their activity is pooled and percentaged with the same rules
//! as the subject's.

use crate::{
    config::{PeerBand, PeerVolume},
    error::{ClassifyError, ClassifyResult},
    report::{InstitutionSummary, LendingSummary, ScopeReport},
    types::InstitutionId,
};
use serde::{Deserialize, Serialize};

fn volume(summary: &InstitutionSummary, measure: PeerVolume) -> f64 {
    match measure {
        PeerVolume::LoanCount => summary.summary.loan_count as f64,
        PeerVolume::LoanAmount => summary.summary.loan_amount,
    }
}

/// Institutions within `band` of the subject's volume, subject excluded.
/// A subject with no volume has no peers.
pub fn select_peers<'a>(
    subject: &InstitutionSummary,
    candidates: &'a [InstitutionSummary],
    band: &PeerBand,
) -> Vec<&'a InstitutionSummary> {
    let subject_volume = volume(subject, band.volume);
    candidates
        .iter()
        .filter(|c| c.institution_id != subject.institution_id)
        .filter(|c| band.contains(subject_volume, volume(c, band.volume)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerComparison {
    pub subject: InstitutionSummary,
    pub peer_ids: Vec<InstitutionId>,
    /// Pooled activity of all peers.
    pub peers: LendingSummary,
}

impl PeerComparison {
    pub fn build(
        report: &ScopeReport,
        subject_id: &str,
        band: &PeerBand,
    ) -> ClassifyResult<Self> {
        let subject = report
            .institution(subject_id)
            .ok_or_else(|| ClassifyError::SubjectNotFound {
                institution_id: subject_id.to_string(),
            })?;

        let selected = select_peers(subject, &report.institutions, band);
        let mut peers = LendingSummary::default();
        for peer in &selected {
            peers.merge(&peer.summary);
        }

        if selected.is_empty() {
            log::warn!("scope {}: no peers in band for {subject_id}", report.scope);
        }

        Ok(Self {
            subject: subject.clone(),
            peer_ids: selected.iter().map(|p| p.institution_id.clone()).collect(),
            peers,
        })
    }
}
