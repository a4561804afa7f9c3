//! tract-report: headless tract classification report runner.
//!
//! Usage:
//!   tract-report --db tracts.db --import data/sample_tracts.json
//!   tract-report --db tracts.db --county 12086,12011 --year 2023 --subject BANK1
//!   tract-report --db tracts.db --filters filters.json --kind branches --json

use anyhow::{Context, Result};
use std::env;
use std::path::Path;
use tractlens_core::{
    config::{DashboardFilters, DataKind, PeerBand, ReportConfig},
    error::ClassifyError,
    payload::SectionPayload,
    peer::PeerComparison,
    record::load_import_file,
    report::{report_or_no_data, ReportOutcome, Scope, ScopeReport},
    store::TractStore,
};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let db = arg_value(&args, "--db").unwrap_or("tracts.db");
    let data_dir = arg_value(&args, "--data-dir").unwrap_or("./data");
    let as_json = args.iter().any(|a| a == "--json");

    let store = TractStore::open(db)?;
    store.migrate()?;

    if let Some(import) = arg_value(&args, "--import") {
        let groups = load_import_file(Path::new(import))?;
        for group in &groups {
            store.insert_group(group)?;
        }
        println!("Imported {} groups into {db}", groups.len());
    }

    // Saved filters first, command-line flags on top.
    let filters_path = arg_value(&args, "--filters");
    let mut filters = match filters_path {
        Some(p) => DashboardFilters::load(Path::new(p))?,
        None => DashboardFilters::default(),
    };
    if let Some(counties) = arg_value(&args, "--county") {
        filters.county_fips = counties.split(',').map(|c| c.trim().to_string()).collect();
    }
    if let Some(year) = arg_value(&args, "--year") {
        filters.years = vec![parse_year(year)?];
    }
    if let Some(subject) = arg_value(&args, "--subject") {
        filters.subject_institution = Some(subject.to_string());
    }
    if let Some(kind) = arg_value(&args, "--kind") {
        filters.data_kind = parse_kind(kind)?;
    }
    if let (Some(p), true) = (filters_path, args.iter().any(|a| a == "--save-filters")) {
        filters.save(Path::new(p))?;
    }

    let scopes = Scope::from_filters(&filters);
    if scopes.is_empty() || filters.county_fips.is_empty() {
        if arg_value(&args, "--import").is_none() {
            log::warn!("No scope selected: pass --county and --year (or --filters)");
        }
        return Ok(());
    }

    let config = ReportConfig::load(data_dir).unwrap_or_else(|e| {
        log::warn!("{e}; using built-in report defaults");
        ReportConfig::default_test()
    });

    for scope in scopes {
        let groups = store.groups_for_scope(&scope)?;
        match report_or_no_data(&groups, &scope, &config)? {
            ReportOutcome::NoData { scope } => {
                if as_json {
                    let payload = SectionPayload::no_data(scope);
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                } else {
                    println!("{scope}: No data available for this selection.");
                }
            }
            ReportOutcome::Ready(report) => {
                let comparison = match &filters.subject_institution {
                    Some(subject) => peer_comparison(&report, subject, &config.peer_band)?,
                    None => None,
                };
                store.insert_report(&report)?;
                if as_json {
                    let payload = SectionPayload::build(filters.data_kind, &report, comparison.as_ref());
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                } else {
                    print_summary(&report, comparison.as_ref());
                }
            }
        }
    }

    Ok(())
}

/// A subject that did not lend in this scope still gets the market view.
fn peer_comparison(
    report: &ScopeReport,
    subject: &str,
    band: &PeerBand,
) -> Result<Option<PeerComparison>> {
    match PeerComparison::build(report, subject, band) {
        Ok(c) => Ok(Some(c)),
        Err(ClassifyError::SubjectNotFound { institution_id }) => {
            log::warn!(
                "scope {}: {institution_id} has no activity here, showing market only",
                report.scope
            );
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(report: &ScopeReport, comparison: Option<&PeerComparison>) {
    let stats = &report.stats;
    println!("=== SCOPE {} ===", report.scope);
    println!("  tracts:          {}", stats.tract_count);
    println!("  mean minority:   {:.2}%", stats.mean_minority_pct);
    println!("  sd minority:     {:.2}", stats.stddev_minority_pct);
    for band in &report.bands {
        println!(
            "  {:<18} {:>6.2}% - {:>6.2}%",
            band.bucket.label(),
            band.lower_pct,
            band.upper_pct
        );
    }
    println!();
    println!(
        "  {:<14} {:>8} {:>12} {:>8} {:>8} {:>8}",
        "institution", "loans", "amount", "LMI %", "LMI $%", "MMCT %"
    );
    for inst in &report.institutions {
        let s = &inst.summary;
        println!(
            "  {:<14} {:>8} {:>12.0} {:>8.1} {:>8.1} {:>8.1}",
            inst.institution_id,
            s.loan_count,
            s.loan_amount,
            s.income.lmi_count_pct(),
            s.income.lmi_amount_pct(),
            s.mmct.count_pct(),
        );
    }
    let t = &report.total;
    println!(
        "  {:<14} {:>8} {:>12.0} {:>8.1} {:>8.1} {:>8.1}",
        "ALL",
        t.loan_count,
        t.loan_amount,
        t.income.lmi_count_pct(),
        t.income.lmi_amount_pct(),
        t.mmct.count_pct(),
    );

    if let Some(c) = comparison {
        println!();
        println!("=== PEER COMPARISON: {} ===", c.subject.institution_id);
        if c.peer_ids.is_empty() {
            println!("  (No peers within the volume band)");
        } else {
            println!("  peers:   {}", c.peer_ids.join(", "));
            println!(
                "  LMI %    subject {:>6.1} | peers {:>6.1}",
                c.subject.summary.income.lmi_count_pct(),
                c.peers.income.lmi_count_pct()
            );
            println!(
                "  MMCT %   subject {:>6.1} | peers {:>6.1}",
                c.subject.summary.mmct.count_pct(),
                c.peers.mmct.count_pct()
            );
        }
    }
}

fn parse_kind(kind: &str) -> Result<DataKind> {
    match kind {
        "hmda" => Ok(DataKind::Hmda),
        "sb" | "small_business" => Ok(DataKind::SmallBusiness),
        "branches" => Ok(DataKind::Branches),
        other => anyhow::bail!("Unknown --kind '{other}' (expected hmda, sb or branches)"),
    }
}

fn parse_year(raw: &str) -> Result<u16> {
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid --year '{raw}' (expected e.g. 2023)"))
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
