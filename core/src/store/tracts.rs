//! Store methods for tract groups and their activity rows.

use crate::{
    error::{ClassifyError, ClassifyResult},
    income::EncodingScheme,
    record::{TractGroup, TractRecord},
    report::Scope,
    types::GroupKey,
};
use rusqlite::{params, OptionalExtension};

use super::TractStore;

impl TractStore {
    /// Persist a group and its records.
    ///
    /// A group holds one row per tract: re-importing a tract replaces its
    /// row, new tracts are added. The scheme must match what is stored; one
    /// group never holds two encodings.
    pub fn insert_group(&self, group: &TractGroup) -> ClassifyResult<()> {
        let key = group.key();
        let tx = self.conn.unchecked_transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT scheme FROM tract_group
                 WHERE institution_id = ?1 AND county_fips = ?2 AND year = ?3",
                params![key.institution_id, key.county_fips, key.year],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(stored) if stored != group.scheme().as_str() => {
                return Err(ClassifyError::SchemeConflict {
                    key: key.clone(),
                    existing: stored,
                    incoming: group.scheme().to_string(),
                });
            }
            Some(_) => {}
            None => {
                tx.execute(
                    "INSERT INTO tract_group (institution_id, county_fips, year, scheme)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        key.institution_id,
                        key.county_fips,
                        key.year,
                        group.scheme().as_str(),
                    ],
                )?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tract_activity
                    (institution_id, county_fips, year, tract_geoid, raw_income_code,
                     minority_pct, loan_count, loan_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT (institution_id, county_fips, year, tract_geoid) DO UPDATE SET
                    raw_income_code = excluded.raw_income_code,
                    minority_pct    = excluded.minority_pct,
                    loan_count      = excluded.loan_count,
                    loan_amount     = excluded.loan_amount",
            )?;
            for r in group.records() {
                let loan_count =
                    i64::try_from(r.loan_count).map_err(|_| ClassifyError::InvalidRecord {
                        tract_geoid: r.tract_geoid.clone(),
                        reason: format!("loan count {} does not fit the store", r.loan_count),
                    })?;
                stmt.execute(params![
                    r.institution_id,
                    r.county_fips,
                    r.year,
                    r.tract_geoid,
                    r.raw_income_code,
                    r.minority_percentage,
                    loan_count,
                    r.loan_amount,
                ])?;
            }
        }

        tx.commit()?;
        log::debug!(
            "store: {} rows for group {key} ({})",
            group.records().len(),
            group.scheme()
        );
        Ok(())
    }

    /// Every group inside `scope`, with its scheme reattached.
    pub fn groups_for_scope(&self, scope: &Scope) -> ClassifyResult<Vec<TractGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT institution_id, county_fips, scheme FROM tract_group
             WHERE year = ?1
             ORDER BY institution_id ASC, county_fips ASC",
        )?;
        let rows = stmt
            .query_map(params![scope.year], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut groups = Vec::new();
        for (institution_id, county_fips, scheme) in rows {
            if !scope.county_fips.contains(&county_fips) {
                continue;
            }
            let key = GroupKey::new(institution_id, county_fips, scope.year);
            let scheme: EncodingScheme = scheme.parse()?;
            let records = self.records_for_group(&key)?;
            groups.push(TractGroup::from_records(key, scheme, records)?);
        }
        Ok(groups)
    }

    /// Flat in-scope records, e.g. for geography statistics.
    pub fn tracts_for_scope(&self, scope: &Scope) -> ClassifyResult<Vec<TractRecord>> {
        Ok(self
            .groups_for_scope(scope)?
            .iter()
            .flat_map(|g| g.records().iter().cloned())
            .collect())
    }

    fn records_for_group(&self, key: &GroupKey) -> ClassifyResult<Vec<TractRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT tract_geoid, raw_income_code, minority_pct, loan_count, loan_amount
             FROM tract_activity
             WHERE institution_id = ?1 AND county_fips = ?2 AND year = ?3
             ORDER BY id ASC",
        )?;
        let records = stmt
            .query_map(
                params![key.institution_id, key.county_fips, key.year],
                |row| {
                    Ok(TractRecord {
                        institution_id: key.institution_id.clone(),
                        county_fips: key.county_fips.clone(),
                        year: key.year,
                        tract_geoid: row.get(0)?,
                        raw_income_code: row.get(1)?,
                        minority_percentage: row.get(2)?,
                        loan_count: {
                            let v: i64 = row.get(3)?;
                            u64::try_from(v)
                                .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(3, v))?
                        },
                        loan_amount: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    // ── Test / summary helpers ────────────────────────────────────────

    pub fn group_count(&self) -> ClassifyResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tract_group", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn activity_count(&self) -> ClassifyResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tract_activity", [], |row| row.get(0))?;
        Ok(count)
    }
}
