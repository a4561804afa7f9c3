//! Shared primitive types used across the classification pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reporting institution (LEI, RSSD or FDIC cert, as supplied upstream).
pub type InstitutionId = String;

/// Five-digit state+county FIPS code.
pub type CountyFips = String;

/// Eleven-digit census tract GEOID.
pub type TractGeoid = String;

/// Activity / reporting year.
pub type Year = u16;

/// The reporting context that fixes one income encoding scheme.
///
/// Every record in a `(institution, county, year)` group shares a scheme;
/// schemes are never mixed inside one group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    pub institution_id: InstitutionId,
    pub county_fips: CountyFips,
    pub year: Year,
}

impl GroupKey {
    pub fn new(institution_id: impl Into<String>, county_fips: impl Into<String>, year: Year) -> Self {
        Self {
            institution_id: institution_id.into(),
            county_fips: county_fips.into(),
            year,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.institution_id, self.county_fips, self.year)
    }
}
