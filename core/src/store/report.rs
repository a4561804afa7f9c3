//! Store methods for generated scope reports.

use crate::{
    error::{ClassifyError, ClassifyResult},
    report::ScopeReport,
};
use rusqlite::params;
use uuid::Uuid;

use super::TractStore;

impl TractStore {
    /// Persist a report's headline figures. Returns the new report id.
    pub fn insert_report(&self, report: &ScopeReport) -> ClassifyResult<String> {
        let report_id = Uuid::new_v4().to_string();
        let generated_at = chrono::Utc::now().to_rfc3339();
        let tract_count = to_sql_count(report.stats.tract_count as u64, "tract count")?;
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO scope_report
                (report_id, year, counties, generated_at, tract_count,
                 mean_minority_pct, stddev_minority_pct, total_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                report_id,
                report.scope.year,
                report.scope.county_fips.join(","),
                generated_at,
                tract_count,
                report.stats.mean_minority_pct,
                report.stats.stddev_minority_pct,
                serde_json::to_string(&report.total)?,
            ],
        )?;

        for inst in &report.institutions {
            let s = &inst.summary;
            let loan_count = to_sql_count(s.loan_count, "loan count")?;
            tx.execute(
                "INSERT INTO report_institution
                    (report_id, institution_id, loan_count, loan_amount,
                     lmi_count_pct, lmi_amount_pct, mmct_count_pct, summary_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    report_id,
                    inst.institution_id,
                    loan_count,
                    s.loan_amount,
                    s.income.lmi_count_pct(),
                    s.income.lmi_amount_pct(),
                    s.mmct.count_pct(),
                    serde_json::to_string(s)?,
                ],
            )?;
        }

        tx.commit()?;
        log::info!(
            "store: report {report_id} saved for {} ({} institutions)",
            report.scope,
            report.institutions.len()
        );
        Ok(report_id)
    }

    pub fn report_count(&self) -> ClassifyResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scope_report", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Stored LMI share of loan count for one institution in one report.
    pub fn report_lmi_count_pct(
        &self,
        report_id: &str,
        institution_id: &str,
    ) -> ClassifyResult<f64> {
        let pct: f64 = self.conn.query_row(
            "SELECT lmi_count_pct FROM report_institution
             WHERE report_id = ?1 AND institution_id = ?2",
            params![report_id, institution_id],
            |row| row.get(0),
        )?;
        Ok(pct)
    }
}

fn to_sql_count(value: u64, what: &str) -> ClassifyResult<i64> {
    i64::try_from(value)
        .map_err(|_| ClassifyError::Other(anyhow::anyhow!("{what} {value} does not fit the store")))
}
