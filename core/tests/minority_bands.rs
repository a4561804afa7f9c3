mod common;

use common::{assert_close, tract};
use tractlens_core::{
    error::ClassifyError,
    minority::{bucket_minority, compute_geography_stats, is_mmct, GeographyStats, MinorityBucket},
    record::TractRecord,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn tracts_with(pcts: &[f64]) -> Vec<TractRecord> {
    pcts.iter()
        .enumerate()
        .map(|(i, pct)| tract("BANK_A", "12086", 2023, &format!("T{i}"), 101, *pct, 1, 1.0))
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// [10, 20, 30, 40, 50]: mean 30, population sd sqrt(200) ≈ 14.14.
#[test]
fn stats_use_population_standard_deviation() {
    let stats = compute_geography_stats(&tracts_with(&[10.0, 20.0, 30.0, 40.0, 50.0])).unwrap();

    assert_close(stats.mean_minority_pct, 30.0, 1e-9);
    assert_close(stats.stddev_minority_pct, 200f64.sqrt(), 1e-9);
    assert_eq!(stats.tract_count, 5);
}

#[test]
fn worked_example_buckets() {
    let stats = compute_geography_stats(&tracts_with(&[10.0, 20.0, 30.0, 40.0, 50.0])).unwrap();

    // 15 < 30 - 14.14 = 15.86
    assert_eq!(bucket_minority(15.0, &stats), MinorityBucket::Low);
    assert_eq!(bucket_minority(25.0, &stats), MinorityBucket::Moderate);
    assert_eq!(bucket_minority(35.0, &stats), MinorityBucket::Middle);
    assert_eq!(bucket_minority(50.0, &stats), MinorityBucket::High);
}

/// Lower edges are inclusive, upper edges exclusive.
#[test]
fn band_edges() {
    let stats = GeographyStats {
        mean_minority_pct: 40.0,
        stddev_minority_pct: 10.0,
        tract_count: 10,
    };

    assert_eq!(bucket_minority(29.999, &stats), MinorityBucket::Low);
    assert_eq!(bucket_minority(30.0, &stats), MinorityBucket::Moderate);
    assert_eq!(bucket_minority(39.999, &stats), MinorityBucket::Moderate);
    assert_eq!(bucket_minority(40.0, &stats), MinorityBucket::Middle);
    assert_eq!(bucket_minority(49.999, &stats), MinorityBucket::Middle);
    assert_eq!(bucket_minority(50.0, &stats), MinorityBucket::High);
}

/// One tract: sd is 0, mean is its own share, and it is banded Middle.
#[test]
fn single_tract_is_middle() {
    let stats = compute_geography_stats(&tracts_with(&[37.5])).unwrap();

    assert_eq!(stats.stddev_minority_pct, 0.0);
    assert_eq!(stats.mean_minority_pct, 37.5);
    assert_eq!(bucket_minority(37.5, &stats), MinorityBucket::Middle);

    // Off-mean shares in a zero-dispersion scope still split around the mean.
    assert_eq!(bucket_minority(37.0, &stats), MinorityBucket::Low);
    assert_eq!(bucket_minority(38.0, &stats), MinorityBucket::High);
}

/// Several tracts with the same share have no dispersion either; rounding
/// in the mean must not push them out of Middle.
#[test]
fn identical_tracts_are_middle() {
    for pct in [12.7, 0.1, 33.3] {
        let stats = compute_geography_stats(&tracts_with(&[pct, pct, pct])).unwrap();

        assert_eq!(stats.mean_minority_pct, pct);
        assert_eq!(stats.stddev_minority_pct, 0.0);
        assert_eq!(stats.tract_count, 3);
        assert_eq!(bucket_minority(pct, &stats), MinorityBucket::Middle, "share {pct}");
    }
}

#[test]
fn empty_scope_is_insufficient_data() {
    let err = compute_geography_stats(&Vec::<TractRecord>::new()).unwrap_err();
    assert!(matches!(err, ClassifyError::InsufficientData), "got {err:?}");
}

/// Display bands clamp to [0, 100]; bucketing keeps the raw bounds.
#[test]
fn display_bands_are_clamped() {
    let stats = GeographyStats {
        mean_minority_pct: 8.0,
        stddev_minority_pct: 12.0,
        tract_count: 3,
    };
    let bands = stats.display_bands();

    assert_eq!(bands[0].bucket, MinorityBucket::Low);
    assert_eq!(bands[0].lower_pct, 0.0);
    assert_eq!(bands[0].upper_pct, 0.0);
    assert_eq!(bands[1].lower_pct, 0.0);
    assert_eq!(bands[1].upper_pct, 8.0);
    assert_eq!(bands[2].upper_pct, 20.0);
    assert_eq!(bands[3].upper_pct, 100.0);

    let wide = GeographyStats {
        mean_minority_pct: 90.0,
        stddev_minority_pct: 20.0,
        tract_count: 3,
    };
    assert_eq!(wide.display_bands()[2].upper_pct, 100.0);
    assert_eq!(wide.display_bands()[3].lower_pct, 100.0);

    // No tract can be below -4, but a share of 0 is still Moderate, not Low.
    assert_eq!(bucket_minority(0.0, &stats), MinorityBucket::Moderate);
}

/// MMCT is a fixed 50% test, independent of the relative band.
#[test]
fn mmct_is_independent_of_bands() {
    let stats = compute_geography_stats(&tracts_with(&[70.0, 80.0, 90.0])).unwrap();

    // 60% is a Low-minority tract in this geography, yet still an MMCT.
    assert_eq!(bucket_minority(60.0, &stats), MinorityBucket::Low);
    assert!(is_mmct(60.0, 50.0));
    assert!(is_mmct(50.0, 50.0));
    assert!(!is_mmct(49.99, 50.0));
}
