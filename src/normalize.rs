//! Post-scoring normalization shared by both rankers.
//!
//! Raw scores grow with document length and vocabulary size; the flags here
//! divide that growth back out. Flags combine with `|` and apply in a fixed
//! order so the same mask always produces the same number.

use crate::vector::LexemeVector;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask selecting score normalizations.
///
/// Flag values are stable and intended to round-trip through hosts that pass
/// raw integer masks; see [`Normalization::bits`] / [`Normalization::from_bits`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Normalization(u32);

impl Normalization {
    /// No normalization; the raw score passes through.
    pub const NONE: Normalization = Normalization(0);
    /// Divide by `log2(occurrence count + 1)`.
    pub const LOG_LENGTH: Normalization = Normalization(0x01);
    /// Divide by the occurrence count.
    pub const LENGTH: Normalization = Normalization(0x02);
    /// Cover-density only: divide by the mean distance between covers.
    pub const EXTENT_DIST: Normalization = Normalization(0x04);
    /// Divide by the number of distinct lexemes.
    pub const UNIQ: Normalization = Normalization(0x08);
    /// Divide by `log2(distinct lexemes + 1)`.
    pub const LOG_UNIQ: Normalization = Normalization(0x10);
    /// Rescale into `[0, 1)` via `r / (r + 1)`.
    pub const SELF_NORM: Normalization = Normalization(0x20);

    /// Whether every flag of `other` is set in `self`.
    pub const fn contains(self, other: Normalization) -> bool {
        self.0 & other.0 == other.0
    }

    /// The raw mask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Adopt a raw mask from a host; unknown bits are kept but have no effect.
    pub const fn from_bits(bits: u32) -> Normalization {
        Normalization(bits)
    }
}

impl BitOr for Normalization {
    type Output = Normalization;

    fn bitor(self, rhs: Normalization) -> Normalization {
        Normalization(self.0 | rhs.0)
    }
}

impl BitOrAssign for Normalization {
    fn bitor_assign(&mut self, rhs: Normalization) {
        self.0 |= rhs.0;
    }
}

/// Cover statistics feeding [`Normalization::EXTENT_DIST`].
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExtentStats {
    /// Number of covers found.
    pub extents: u32,
    /// Sum of inverse distances between consecutive cover midpoints.
    pub sum_dist: f64,
}

/// Apply the selected normalizations in flag order.
///
/// `covers` is present only on the cover-density path; without it
/// `EXTENT_DIST` is a no-op, as are the length/uniqueness flags on an empty
/// vector.
pub(crate) fn apply(
    method: Normalization,
    mut res: f64,
    vector: &LexemeVector,
    covers: Option<&ExtentStats>,
) -> f64 {
    if method.contains(Normalization::LOG_LENGTH) && !vector.is_empty() {
        res /= ((vector.occurrence_count() + 1) as f64).log2();
    }
    if method.contains(Normalization::LENGTH) {
        let len = vector.occurrence_count();
        if len > 0 {
            res /= len as f64;
        }
    }
    if method.contains(Normalization::EXTENT_DIST) {
        if let Some(stats) = covers {
            if stats.extents > 0 && stats.sum_dist > 0.0 {
                res /= f64::from(stats.extents) / stats.sum_dist;
            }
        }
    }
    if method.contains(Normalization::UNIQ) && !vector.is_empty() {
        res /= vector.len() as f64;
    }
    if method.contains(Normalization::LOG_UNIQ) && !vector.is_empty() {
        res /= ((vector.len() + 1) as f64).log2();
    }
    if method.contains(Normalization::SELF_NORM) {
        res /= res + 1.0;
    }
    res
}
