mod common;

use common::two_lender_fixture;
use tractlens_core::{
    config::{DataKind, PeerBand, ReportConfig},
    income::IncomeBucket,
    payload::SectionPayload,
    peer::PeerComparison,
    report::{build_scope_report, Scope, ScopeReport},
};

fn report() -> ScopeReport {
    build_scope_report(
        &two_lender_fixture(),
        &Scope::county("12086", 2023),
        &ReportConfig::default_test(),
    )
    .unwrap()
}

/// Without a subject the optional sections are absent from the JSON.
#[test]
fn market_only_payload_omits_subject_and_peers() {
    let payload = SectionPayload::build(DataKind::Hmda, &report(), None);
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["type"], "hmda");
    assert!(json.get("subject").is_none());
    assert!(json.get("peers").is_none());
    assert_eq!(json["market"]["loan_count"], 30);
    assert_eq!(json["market"]["lmi_count_pct"], 60.0);
}

#[test]
fn small_business_payload_carries_peer_comparison() {
    let report = report();
    let cmp = PeerComparison::build(&report, "BANK_A", &PeerBand::default()).unwrap();
    let payload = SectionPayload::build(DataKind::SmallBusiness, &report, Some(&cmp));

    match &payload {
        SectionPayload::SmallBusiness { subject, peers, .. } => {
            let subject = subject.as_ref().expect("subject section");
            assert_eq!(subject.institution_id.as_deref(), Some("BANK_A"));
            assert_eq!(subject.income_count_pct[&IncomeBucket::Low], 50.0);
            assert_eq!(peers.as_ref().expect("peer section").loan_count, 10);
        }
        other => panic!("expected small business payload, got {other:?}"),
    }

    let round_trip: SectionPayload =
        serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();
    assert!(matches!(round_trip, SectionPayload::SmallBusiness { subject: Some(_), peers: Some(_), .. }));
}

#[test]
fn branch_payload_reports_branches_and_deposits() {
    let payload = SectionPayload::build(DataKind::Branches, &report(), None);

    match payload {
        SectionPayload::Branches { market, subject, .. } => {
            assert_eq!(market.branch_count, 30);
            assert_eq!(market.deposits, 500.0);
            assert!(subject.is_none());
        }
        other => panic!("expected branches payload, got {other:?}"),
    }
}

#[test]
fn no_data_payload_is_tagged() {
    let json = serde_json::to_value(SectionPayload::no_data(Scope::county("99999", 2023))).unwrap();
    assert_eq!(json["type"], "no_data");
    assert_eq!(json["scope"]["year"], 2023);
}
