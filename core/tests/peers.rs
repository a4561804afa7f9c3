mod common;

use common::{assert_close, group};
use tractlens_core::{
    config::{PeerBand, PeerVolume, ReportConfig},
    error::ClassifyError,
    income::EncodingScheme,
    peer::{select_peers, PeerComparison},
    report::{build_scope_report, InstitutionSummary, LendingSummary, Scope},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn summary(id: &str, loan_count: u64, loan_amount: f64) -> InstitutionSummary {
    InstitutionSummary {
        institution_id: id.into(),
        summary: LendingSummary {
            loan_count,
            loan_amount,
            ..LendingSummary::default()
        },
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// 50%–200% of the subject's volume, both ends inclusive, subject excluded.
#[test]
fn peers_fall_within_the_volume_band() {
    let subject = summary("SUBJ", 100, 0.0);
    let candidates = vec![
        summary("SUBJ", 100, 0.0),
        summary("HALF", 50, 0.0),
        summary("DOUBLE", 200, 0.0),
        summary("SMALL", 49, 0.0),
        summary("LARGE", 201, 0.0),
        summary("SAME", 100, 0.0),
    ];

    let peers: Vec<_> = select_peers(&subject, &candidates, &PeerBand::default())
        .into_iter()
        .map(|p| p.institution_id.as_str())
        .collect();

    assert_eq!(peers, vec!["HALF", "DOUBLE", "SAME"]);
}

#[test]
fn zero_volume_subject_has_no_peers() {
    let subject = summary("SUBJ", 0, 0.0);
    let candidates = vec![summary("ZERO", 0, 0.0), summary("ANY", 10, 0.0)];

    assert!(select_peers(&subject, &candidates, &PeerBand::default()).is_empty());
}

#[test]
fn band_can_measure_loan_amount() {
    let band = PeerBand {
        volume: PeerVolume::LoanAmount,
        ..PeerBand::default()
    };
    let subject = summary("SUBJ", 1, 1_000.0);
    let candidates = vec![summary("BIG_COUNT", 1_000, 900.0), summary("TINY", 1, 10.0)];

    let peers = select_peers(&subject, &candidates, &band);
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].institution_id, "BIG_COUNT");
}

/// Peer activity is pooled before percentages are taken.
#[test]
fn comparison_pools_peer_activity() {
    let groups = vec![
        group("SUBJ", "12086", 2023, EncodingScheme::Summary, &[("T1", 101, 60.0, 10, 100.0)]),
        group("P1", "12086", 2023, EncodingScheme::Summary, &[("T1", 101, 60.0, 6, 60.0)]),
        group("P2", "12086", 2023, EncodingScheme::Summary, &[("T2", 104, 10.0, 14, 140.0)]),
        group("GIANT", "12086", 2023, EncodingScheme::Summary, &[("T2", 104, 10.0, 500, 5_000.0)]),
    ];
    let scope = Scope::county("12086", 2023);
    let report = build_scope_report(&groups, &scope, &ReportConfig::default_test()).unwrap();

    let cmp = PeerComparison::build(&report, "SUBJ", &PeerBand::default()).unwrap();

    assert_eq!(cmp.peer_ids, vec!["P1".to_string(), "P2".to_string()]);
    assert_eq!(cmp.peers.loan_count, 20);
    assert_close(cmp.peers.income.lmi_count_pct(), 30.0, 1e-9);
    assert_close(cmp.subject.summary.income.lmi_count_pct(), 100.0, 1e-9);
}

#[test]
fn unknown_subject_is_an_error() {
    let groups = vec![group("P1", "12086", 2023, EncodingScheme::Summary, &[("T1", 101, 60.0, 6, 60.0)])];
    let scope = Scope::county("12086", 2023);
    let report = build_scope_report(&groups, &scope, &ReportConfig::default_test()).unwrap();

    let err = PeerComparison::build(&report, "NOPE", &PeerBand::default()).unwrap_err();
    assert!(matches!(err, ClassifyError::SubjectNotFound { .. }));
}
