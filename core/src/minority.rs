//! Relative minority-population banding of census tracts.
//!
//! Bands are not fixed thresholds: they are cut at the geography's mean
//! minority share plus/minus one population standard deviation. Computing
//! them is strictly two-pass. Statistics over every in-scope tract come
//! first; only then can an individual tract be bucketed.
//!
//! The Majority-Minority Census Tract flag (MMCT, minority share >= 50%)
//! is a separate fixed test and is reported next to the band, never in
//! place of it.

use crate::{
    error::{ClassifyError, ClassifyResult},
    percentage::{Aggregate, Bucket},
    record::TractRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MMCT_THRESHOLD_PCT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinorityBucket {
    Low,
    Moderate,
    Middle,
    High,
}

impl MinorityBucket {
    pub const ALL: [MinorityBucket; 4] = [
        MinorityBucket::Low,
        MinorityBucket::Moderate,
        MinorityBucket::Middle,
        MinorityBucket::High,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MinorityBucket::Low => "Low Minority",
            MinorityBucket::Moderate => "Moderate Minority",
            MinorityBucket::Middle => "Middle Minority",
            MinorityBucket::High => "High Minority",
        }
    }
}

impl fmt::Display for MinorityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Bucket for MinorityBucket {
    fn is_unknown(self) -> bool {
        false
    }
}

pub type MinorityAggregate = Aggregate<MinorityBucket>;

// ── Geography statistics ─────────────────────────────────────────────────────

/// Mean and population standard deviation of tract minority share over one
/// `(geography, year)` scope. Valid only for the scope it was computed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographyStats {
    pub mean_minority_pct: f64,
    pub stddev_minority_pct: f64,
    pub tract_count: usize,
}

/// Pass 1: statistics over every tract in scope.
///
/// The standard deviation is the population form (divide by N). An empty
/// scope is `InsufficientData`: there is nothing to band against.
pub fn compute_geography_stats<'a, I>(tracts: I) -> ClassifyResult<GeographyStats>
where
    I: IntoIterator<Item = &'a TractRecord>,
{
    let pcts: Vec<f64> = tracts.into_iter().map(|t| t.minority_percentage).collect();
    if pcts.is_empty() {
        return Err(ClassifyError::InsufficientData);
    }

    // Uniform scope: summing can drift the mean off the shared value.
    let first = pcts[0];
    if pcts.iter().all(|p| *p == first) {
        return Ok(GeographyStats {
            mean_minority_pct: first,
            stddev_minority_pct: 0.0,
            tract_count: pcts.len(),
        });
    }

    let n = pcts.len() as f64;
    let mean = pcts.iter().sum::<f64>() / n;
    let variance = pcts.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;

    Ok(GeographyStats {
        mean_minority_pct: mean,
        stddev_minority_pct: variance.sqrt(),
        tract_count: pcts.len(),
    })
}

/// Pass 2: place one tract into its band.
///
/// - Low:      `pct <  mean - sd`
/// - Moderate: `mean - sd <= pct < mean`
/// - Middle:   `mean <= pct < mean + sd`
/// - High:     `pct >= mean + sd`
///
/// When the scope has no dispersion (sd == 0, e.g. a single tract) the
/// Middle band is empty; a tract sitting exactly on the mean is Middle.
pub fn bucket_minority(pct: f64, stats: &GeographyStats) -> MinorityBucket {
    let mean = stats.mean_minority_pct;
    let sd = stats.stddev_minority_pct;

    if pct < mean - sd {
        MinorityBucket::Low
    } else if pct < mean {
        MinorityBucket::Moderate
    } else if pct < mean + sd || pct == mean {
        MinorityBucket::Middle
    } else {
        MinorityBucket::High
    }
}

/// Fixed majority-minority test, independent of the relative bands.
pub fn is_mmct(pct: f64, threshold_pct: f64) -> bool {
    pct >= threshold_pct
}

// ── Display bands ────────────────────────────────────────────────────────────

/// A band's bounds as shown to a user, clamped to [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandRange {
    pub bucket: MinorityBucket,
    pub lower_pct: f64,
    pub upper_pct: f64,
}

impl GeographyStats {
    /// Band bounds for presentation. Bucketing itself uses the unclamped
    /// `mean ± sd` values.
    pub fn display_bands(&self) -> [BandRange; 4] {
        let clamp = |v: f64| v.clamp(0.0, 100.0);
        let mean = self.mean_minority_pct;
        let lo = mean - self.stddev_minority_pct;
        let hi = mean + self.stddev_minority_pct;

        [
            BandRange { bucket: MinorityBucket::Low, lower_pct: 0.0, upper_pct: clamp(lo) },
            BandRange { bucket: MinorityBucket::Moderate, lower_pct: clamp(lo), upper_pct: clamp(mean) },
            BandRange { bucket: MinorityBucket::Middle, lower_pct: clamp(mean), upper_pct: clamp(hi) },
            BandRange { bucket: MinorityBucket::High, lower_pct: clamp(hi), upper_pct: 100.0 },
        ]
    }
}
