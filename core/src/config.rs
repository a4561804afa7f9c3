use crate::{
    error::ClassifyResult,
    minority::DEFAULT_MMCT_THRESHOLD_PCT,
    types::{CountyFips, InstitutionId, Year},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Peer band ──────────────────────────────────────────────────────

/// Which volume measure decides peer eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerVolume {
    LoanCount,
    LoanAmount,
}

/// Peers are institutions whose volume lies within
/// `[lower_ratio * subject, upper_ratio * subject]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeerBand {
    pub lower_ratio: f64,
    pub upper_ratio: f64,
    pub volume: PeerVolume,
}

impl Default for PeerBand {
    fn default() -> Self {
        Self {
            lower_ratio: 0.5,
            upper_ratio: 2.0,
            volume: PeerVolume::LoanCount,
        }
    }
}

impl PeerBand {
    pub fn contains(&self, subject_volume: f64, candidate_volume: f64) -> bool {
        subject_volume > 0.0
            && candidate_volume >= subject_volume * self.lower_ratio
            && candidate_volume <= subject_volume * self.upper_ratio
    }
}

// ── Report config ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Majority-minority threshold, percent.
    #[serde(default = "default_mmct_threshold")]
    pub mmct_threshold_pct: f64,
    #[serde(default)]
    pub peer_band: PeerBand,
    /// Warn when a group's unknown-income share of loans exceeds this fraction.
    #[serde(default = "default_unknown_share_warning")]
    pub unknown_share_warning: f64,
}

fn default_mmct_threshold() -> f64 {
    DEFAULT_MMCT_THRESHOLD_PCT
}

fn default_unknown_share_warning() -> f64 {
    0.25
}

impl ReportConfig {
    /// Load from the data/ directory.
    /// In tests, use ReportConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/report_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        anyhow::ensure!(
            config.peer_band.lower_ratio > 0.0
                && config.peer_band.lower_ratio <= config.peer_band.upper_ratio,
            "Invalid peer band in {path}: lower {} / upper {}",
            config.peer_band.lower_ratio,
            config.peer_band.upper_ratio,
        );
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            mmct_threshold_pct: DEFAULT_MMCT_THRESHOLD_PCT,
            peer_band: PeerBand::default(),
            unknown_share_warning: default_unknown_share_warning(),
        }
    }
}

// ── Dashboard filters ──────────────────────────────────────────────

/// The data product a dashboard section reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    #[default]
    Hmda,
    SmallBusiness,
    Branches,
}

/// Persisted filter selection of a dashboard session.
///
/// Loaded once at start, mutated by user actions, written back on save.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardFilters {
    #[serde(default)]
    pub data_kind: DataKind,
    #[serde(default)]
    pub years: Vec<Year>,
    #[serde(default)]
    pub county_fips: Vec<CountyFips>,
    #[serde(default)]
    pub subject_institution: Option<InstitutionId>,
}

impl DashboardFilters {
    /// A missing file yields the default selection.
    pub fn load(path: &Path) -> ClassifyResult<Self> {
        if !path.exists() {
            log::debug!("filters: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> ClassifyResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::debug!("filters: saved to {}", path.display());
        Ok(())
    }
}
