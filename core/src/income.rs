//! Census-tract income classification.
//!
//! Upstream tables carry the tract income level in one of four historical
//! numeric encodings. This module maps a raw code, under a scheme chosen by
//! the caller, onto the canonical {Low, Moderate, Middle, Upper} buckets.
//! Anything the active scheme does not document degrades to `Unknown`.

use crate::error::ClassifyError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

// ── Buckets ──────────────────────────────────────────────────────────────────

/// Tract income level relative to area median income (AMI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBucket {
    Low,
    Moderate,
    Middle,
    Upper,
    Unknown,
}

impl IncomeBucket {
    /// Every outcome, in display order.
    pub const ALL: [IncomeBucket; 5] = [
        IncomeBucket::Low,
        IncomeBucket::Moderate,
        IncomeBucket::Middle,
        IncomeBucket::Upper,
        IncomeBucket::Unknown,
    ];

    /// The four buckets that take part in percentage denominators.
    pub const CLASSIFIED: [IncomeBucket; 4] = [
        IncomeBucket::Low,
        IncomeBucket::Moderate,
        IncomeBucket::Middle,
        IncomeBucket::Upper,
    ];

    /// Low-to-moderate income: tract MFI below 80% of AMI.
    pub fn is_lmi(self) -> bool {
        matches!(self, IncomeBucket::Low | IncomeBucket::Moderate)
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeBucket::Low => "Low",
            IncomeBucket::Moderate => "Moderate",
            IncomeBucket::Middle => "Middle",
            IncomeBucket::Upper => "Upper",
            IncomeBucket::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for IncomeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Encoding schemes ─────────────────────────────────────────────────────────

/// The numeric encoding a group's raw income codes are written in.
///
/// Raw ranges overlap between schemes (`5` is Low under
/// `SubcategoryUnpadded` and meaningless under `Summary`), so the scheme is
/// always an input, never inferred from a single code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingScheme {
    /// 101 Low, 102 Moderate, 103 Middle, 104 Upper, 105/106 unknown.
    Summary,
    /// Zero-padded subcategories 001–015.
    SubcategoryPadded,
    /// 1–4, with 14/15 as unknown.
    SingleDigit,
    /// 2019 subcategories with the padding stripped (5–13).
    SubcategoryUnpadded,
}

impl EncodingScheme {
    pub const ALL: [EncodingScheme; 4] = [
        EncodingScheme::Summary,
        EncodingScheme::SubcategoryPadded,
        EncodingScheme::SingleDigit,
        EncodingScheme::SubcategoryUnpadded,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EncodingScheme::Summary => "summary",
            EncodingScheme::SubcategoryPadded => "subcategory_padded",
            EncodingScheme::SingleDigit => "single_digit",
            EncodingScheme::SubcategoryUnpadded => "subcategory_unpadded",
        }
    }
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingScheme {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EncodingScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s.trim())
            .ok_or_else(|| ClassifyError::UnknownScheme { name: s.to_string() })
    }
}

// ── Normalizer ───────────────────────────────────────────────────────────────

/// Map a raw tract income code onto its canonical bucket.
///
/// PRECONDITION: `scheme` must be the encoding actually used by the
/// `(institution, county, year)` group the code came from. No detection
/// happens here; a code read under the wrong scheme is silently
/// misclassified (or lands in `Unknown`), and that is a caller error.
///
/// Codes the scheme does not document map to `Unknown` rather than
/// failing, so one malformed row never aborts an aggregation.
pub fn normalize_income_code(raw_code: u32, scheme: EncodingScheme) -> IncomeBucket {
    use IncomeBucket::*;

    match scheme {
        EncodingScheme::Summary => match raw_code {
            101 => Low,
            102 => Moderate,
            103 => Middle,
            104 => Upper,
            _ => Unknown, // 105, 106 and anything unseen
        },
        EncodingScheme::SubcategoryPadded => match raw_code {
            1..=5 => Low,
            6..=8 => Moderate,
            9..=10 => Middle,
            11..=13 => Upper,
            _ => Unknown, // 14, 15 and anything unseen
        },
        EncodingScheme::SingleDigit => match raw_code {
            1 => Low,
            2 => Moderate,
            3 => Middle,
            4 => Upper,
            _ => Unknown, // 14, 15 and anything unseen
        },
        EncodingScheme::SubcategoryUnpadded => match raw_code {
            5 => Low,
            6..=8 => Moderate,
            9..=10 => Middle,
            11..=13 => Upper,
            _ => Unknown,
        },
    }
}
