//! Per-class weight tables and the caller-supplied weight contract.
//!
//! Each of the four weight classes maps to a multiplier in `(0, 1]`. Callers
//! may override the defaults per class; `None` elements model nulls from
//! dynamically-typed hosts and are rejected, negative elements mean "keep the
//! default".

use crate::Error;

/// Default per-class weights, indexed by [`crate::WeightClass::index`].
///
/// Process-wide read-only constant; never mutated.
pub const DEFAULT_WEIGHTS: [f32; 4] = [0.1, 0.2, 0.4, 1.0];

/// Resolve an optional caller-supplied weight array against the defaults.
///
/// Check order: length, nulls, range. Negative elements keep the per-class
/// default; anything above `1.0` is rejected. Extra elements beyond the
/// fourth are ignored (but still checked for nulls).
pub(crate) fn resolve(supplied: Option<&[Option<f32>]>) -> Result<[f32; 4], Error> {
    let Some(arr) = supplied else {
        return Ok(DEFAULT_WEIGHTS);
    };
    if arr.len() < DEFAULT_WEIGHTS.len() {
        return Err(Error::WeightArrayTooShort);
    }
    if arr.iter().any(Option::is_none) {
        return Err(Error::WeightArrayNull);
    }
    let mut ws = DEFAULT_WEIGHTS;
    for (slot, supplied) in ws.iter_mut().zip(arr) {
        let w = supplied.ok_or(Error::WeightArrayNull)?;
        if w >= 0.0 {
            *slot = w;
        }
        if *slot > 1.0 {
            return Err(Error::WeightOutOfRange);
        }
    }
    Ok(ws)
}

/// Inverse weights for the cover-density ranker.
///
/// A zero weight would make the inverse infinite and poison every density it
/// touches, so non-positive weights are rejected here rather than propagated.
pub(crate) fn inverses(ws: &[f32; 4]) -> Result<[f64; 4], Error> {
    let mut inv = [0.0f64; 4];
    for (slot, &w) in inv.iter_mut().zip(ws) {
        if !(w > 0.0 && w <= 1.0) {
            return Err(Error::WeightOutOfRange);
        }
        *slot = 1.0 / f64::from(w);
    }
    Ok(inv)
}
