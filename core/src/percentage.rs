//! Bucket tallies and share-of-total percentages.
//!
//! A percentage is always `target / (total - unknown) * 100`: records whose
//! classification is unknown still count toward totals, but never toward
//! the denominator. Loan counts and loan amounts are tallied side by side
//! and each gets its own, independent percentage.

use crate::income::IncomeBucket;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A classification outcome that can be tallied.
pub trait Bucket: Copy + Ord {
    /// Whether this outcome is excluded from percentage denominators.
    fn is_unknown(self) -> bool;
}

impl Bucket for IncomeBucket {
    fn is_unknown(self) -> bool {
        self == IncomeBucket::Unknown
    }
}

/// Per-bucket totals of one quantity (loan count or loan amount).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct BucketTally<K: Ord> {
    values: BTreeMap<K, f64>,
}

/// Income-bucket totals, the input of [`bucket_percentage`].
pub type BucketCounts = BucketTally<IncomeBucket>;

impl<K: Ord> Default for BucketTally<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Bucket> BucketTally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bucket: K, value: f64) {
        *self.values.entry(bucket).or_insert(0.0) += value;
    }

    pub fn get(&self, bucket: K) -> f64 {
        self.values.get(&bucket).copied().unwrap_or(0.0)
    }

    /// Sum over every bucket, unknown included.
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    pub fn unknown(&self) -> f64 {
        self.values
            .iter()
            .filter(|(bucket, _)| bucket.is_unknown())
            .map(|(_, value)| value)
            .sum()
    }

    /// The percentage denominator: `total - unknown`.
    pub fn classified_total(&self) -> f64 {
        self.total() - self.unknown()
    }

    pub fn merge(&mut self, other: &BucketTally<K>) {
        for (bucket, value) in &other.values {
            self.add(*bucket, *value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.values.iter().map(|(bucket, value)| (*bucket, *value))
    }
}

impl<K: Bucket> FromIterator<(K, f64)> for BucketTally<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut tally = BucketTally::new();
        for (bucket, value) in iter {
            tally.add(bucket, value);
        }
        tally
    }
}

/// Share of `target` among the classified (non-unknown) records, in percent.
///
/// Returns `0.0` when nothing is classified (no records, or all unknown).
/// Never returns NaN and never panics.
pub fn bucket_percentage<K: Bucket>(bucket_counts: &BucketTally<K>, target: K) -> f64 {
    let denominator = bucket_counts.classified_total();
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    let pct = bucket_counts.get(target) / denominator * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

/// Low + Moderate share over the same denominator.
pub fn lmi_percentage(bucket_counts: &BucketCounts) -> f64 {
    bucket_percentage(bucket_counts, IncomeBucket::Low)
        + bucket_percentage(bucket_counts, IncomeBucket::Moderate)
}

// ── Parallel count/amount aggregation ────────────────────────────────────────

/// Loan counts and loan amounts tallied per bucket, side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize",
    deserialize = "K: Deserialize<'de> + Ord"
))]
pub struct Aggregate<K: Ord> {
    pub counts: BucketTally<K>,
    pub amounts: BucketTally<K>,
}

pub type IncomeAggregate = Aggregate<IncomeBucket>;

impl<K: Ord> Default for Aggregate<K> {
    fn default() -> Self {
        Self {
            counts: BucketTally::default(),
            amounts: BucketTally::default(),
        }
    }
}

impl<K: Bucket> Aggregate<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, bucket: K, loan_count: u64, loan_amount: f64) {
        self.counts.add(bucket, loan_count as f64);
        self.amounts.add(bucket, loan_amount);
    }

    pub fn merge(&mut self, other: &Aggregate<K>) {
        self.counts.merge(&other.counts);
        self.amounts.merge(&other.amounts);
    }

    pub fn count_pct(&self, bucket: K) -> f64 {
        bucket_percentage(&self.counts, bucket)
    }

    pub fn amount_pct(&self, bucket: K) -> f64 {
        bucket_percentage(&self.amounts, bucket)
    }
}

impl IncomeAggregate {
    pub fn lmi_count_pct(&self) -> f64 {
        lmi_percentage(&self.counts)
    }

    pub fn lmi_amount_pct(&self) -> f64 {
        lmi_percentage(&self.amounts)
    }
}
