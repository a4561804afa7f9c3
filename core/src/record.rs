//! Tract activity records and the per-context groups that carry a scheme.

use crate::{
    error::{ClassifyError, ClassifyResult},
    income::{normalize_income_code, EncodingScheme, IncomeBucket},
    percentage::IncomeAggregate,
    types::{CountyFips, GroupKey, InstitutionId, TractGeoid, Year},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One row of lending or branch activity tied to a census tract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractRecord {
    pub institution_id: InstitutionId,
    pub county_fips: CountyFips,
    pub year: Year,
    pub tract_geoid: TractGeoid,
    /// Meaning depends on the group's [`EncodingScheme`].
    pub raw_income_code: u32,
    /// Minority share of the tract population, 0–100.
    pub minority_percentage: f64,
    pub loan_count: u64,
    /// Thousands of dollars (deposits, for branch data).
    pub loan_amount: f64,
}

impl TractRecord {
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(self.institution_id.clone(), self.county_fips.clone(), self.year)
    }

    fn validate(&self) -> ClassifyResult<()> {
        if !(0.0..=100.0).contains(&self.minority_percentage) {
            return Err(ClassifyError::InvalidRecord {
                tract_geoid: self.tract_geoid.clone(),
                reason: format!(
                    "minority percentage {} outside [0, 100]",
                    self.minority_percentage
                ),
            });
        }
        if !self.loan_amount.is_finite() || self.loan_amount < 0.0 {
            return Err(ClassifyError::InvalidRecord {
                tract_geoid: self.tract_geoid.clone(),
                reason: format!("loan amount {} is not a non-negative number", self.loan_amount),
            });
        }
        Ok(())
    }
}

/// All records for one `(institution, county, year)` with the single
/// encoding scheme they are written in.
#[derive(Debug, Clone, PartialEq)]
pub struct TractGroup {
    key: GroupKey,
    scheme: EncodingScheme,
    records: Vec<TractRecord>,
}

impl TractGroup {
    pub fn new(key: GroupKey, scheme: EncodingScheme) -> Self {
        Self {
            key,
            scheme,
            records: Vec::new(),
        }
    }

    pub fn from_records(
        key: GroupKey,
        scheme: EncodingScheme,
        records: impl IntoIterator<Item = TractRecord>,
    ) -> ClassifyResult<Self> {
        let mut group = Self::new(key, scheme);
        for record in records {
            group.push(record)?;
        }
        Ok(group)
    }

    /// Add a record. Rejects records from another reporting context, which
    /// would otherwise be read under a scheme that is not theirs.
    pub fn push(&mut self, record: TractRecord) -> ClassifyResult<()> {
        let found = record.group_key();
        if found != self.key {
            return Err(ClassifyError::GroupMismatch {
                expected: self.key.clone(),
                found,
            });
        }
        record.validate()?;
        self.records.push(record);
        Ok(())
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn scheme(&self) -> EncodingScheme {
        self.scheme
    }

    pub fn records(&self) -> &[TractRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Each record paired with its income bucket under this group's scheme.
    pub fn classify(&self) -> impl Iterator<Item = (&TractRecord, IncomeBucket)> + '_ {
        self.records
            .iter()
            .map(move |r| (r, normalize_income_code(r.raw_income_code, self.scheme)))
    }

    pub fn income_aggregate(&self) -> IncomeAggregate {
        let mut agg = IncomeAggregate::new();
        for (record, bucket) in self.classify() {
            agg.record(bucket, record.loan_count, record.loan_amount);
        }
        agg
    }
}

// ── JSON import ──────────────────────────────────────────────────────────────

/// A tract row as it appears inside an import group; the reporting context
/// comes from the enclosing group.
#[derive(Debug, Clone, Deserialize)]
struct ImportTract {
    tract_geoid: TractGeoid,
    raw_income_code: u32,
    minority_percentage: f64,
    #[serde(default)]
    loan_count: u64,
    #[serde(default)]
    loan_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ImportGroup {
    institution_id: InstitutionId,
    county_fips: CountyFips,
    year: Year,
    scheme: EncodingScheme,
    tracts: Vec<ImportTract>,
}

#[derive(Debug, Clone, Deserialize)]
struct ImportFile {
    groups: Vec<ImportGroup>,
}

/// Parse a `{ "groups": [...] }` import document.
pub fn parse_import(json: &str) -> ClassifyResult<Vec<TractGroup>> {
    let file: ImportFile = serde_json::from_str(json)?;
    file.groups
        .into_iter()
        .map(|g| {
            let key = GroupKey::new(g.institution_id, g.county_fips, g.year);
            let records = g.tracts.into_iter().map(|t| TractRecord {
                institution_id: key.institution_id.clone(),
                county_fips: key.county_fips.clone(),
                year: key.year,
                tract_geoid: t.tract_geoid,
                raw_income_code: t.raw_income_code,
                minority_percentage: t.minority_percentage,
                loan_count: t.loan_count,
                loan_amount: t.loan_amount,
            });
            TractGroup::from_records(key.clone(), g.scheme, records)
        })
        .collect()
}

pub fn load_import_file(path: &Path) -> ClassifyResult<Vec<TractGroup>> {
    let content = std::fs::read_to_string(path)?;
    let groups = parse_import(&content)?;
    log::info!(
        "import: parsed {} groups from {}",
        groups.len(),
        path.display()
    );
    Ok(groups)
}
