//! Standard ranker: occurrence weights and term proximity.
//!
//! Every unique query term contributes a decaying series over its occurrence
//! list; conjunctive queries additionally weigh how close the terms sit to
//! each other. The two paths are dispatched on the query root: an `And` root
//! ranks by pairwise proximity, everything else — `Or`, bare terms, and also
//! `Not` roots, which have no dedicated treatment — ranks by per-term
//! occurrence weight alone.

use crate::normalize::{self, Normalization};
use crate::query::{Operator, Query, QueryNode};
use crate::vector::{LexemeVector, Position, MAX_POS};
use crate::{weights, Error};

/// Asymptotic sum of `1/i^2` (pi^2/6), truncated.
///
/// Dividing a term's occurrence series by this constant makes a single
/// occurrence of the top weight class trend to 1. The truncated value is part
/// of the score contract; keep it bit-for-bit.
const OCCURRENCE_SERIES_LIMIT: f64 = 1.64493406685;

/// Rank `vector` against `query` with the default class weights.
///
/// Pass [`Normalization::NONE`] for the raw score.
pub fn rank_standard(
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
) -> Result<f32, Error> {
    Ok(calc(&weights::resolve(None)?, vector, query, method))
}

/// Rank `vector` against `query` with caller-supplied class weights.
///
/// `weights` follows the weight-array contract: at least four elements, no
/// `None`s, values at most `1.0`; negative values keep the per-class default.
pub fn rank_standard_weighted(
    weights: &[Option<f32>],
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
) -> Result<f32, Error> {
    Ok(calc(&weights::resolve(Some(weights))?, vector, query, method))
}

pub(crate) fn calc(
    w: &[f32; 4],
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
) -> f32 {
    if vector.is_empty() || query.is_empty() {
        return 0.0;
    }
    let raw = match query.root() {
        Some(QueryNode::Operator {
            op: Operator::And, ..
        }) => rank_and(w, vector, query),
        _ => rank_or(w, vector, query),
    };
    // Negative means no pair ever scored; keep a tiny positive floor so
    // downstream ordering still treats the document as a (barely) matching one.
    let raw = if raw < 0.0 { 1e-20 } else { raw };
    normalize::apply(method, f64::from(raw), vector, None) as f32
}

/// Weight of a word collocation at the given distance.
fn collocation_weight(dist: u32) -> f32 {
    if dist > 100 {
        return 1e-30;
    }
    (1.0 / (1.005 + 0.05 * (f64::from(dist) / 1.5 - 2.0).exp())) as f32
}

/// Occurrence positions resolved for one query operand.
#[derive(Clone, Copy)]
struct OperandPositions<'a> {
    list: &'a [Position],
    synthetic: bool,
}

impl<'a> OperandPositions<'a> {
    fn for_entry(positions: &'a [Position]) -> Self {
        if positions.is_empty() {
            Self {
                list: std::slice::from_ref(&Position::UNKNOWN),
                synthetic: true,
            }
        } else {
            Self {
                list: positions,
                synthetic: false,
            }
        }
    }
}

fn rank_or(w: &[f32; 4], vector: &LexemeVector, query: &Query) -> f32 {
    let items = query.unique_operands();
    let mut res = 0.0f32;

    for operand in &items {
        for entry in vector.matching(operand) {
            let posv = OperandPositions::for_entry(&entry.positions);

            // Decaying series over the occurrence list, with the peak weight
            // factored out of its own slot so it contributes at full value.
            let mut resj = 0.0f32;
            let mut wjm = -1.0f32;
            let mut jm = 0usize;
            for (j, p) in posv.list.iter().enumerate() {
                let wp = w[p.class.index()];
                resj += wp / ((j + 1) * (j + 1)) as f32;
                if wp > wjm {
                    wjm = wp;
                    jm = j;
                }
            }
            let entry_score = wjm + resj - wjm / ((jm + 1) * (jm + 1)) as f32;
            res += (f64::from(entry_score) / OCCURRENCE_SERIES_LIMIT) as f32;
        }
    }

    if !items.is_empty() {
        res /= items.len() as f32;
    }
    res
}

fn rank_and(w: &[f32; 4], vector: &LexemeVector, query: &Query) -> f32 {
    let items = query.unique_operands();
    if items.len() < 2 {
        return rank_or(w, vector, query);
    }

    let mut pos: Vec<Option<OperandPositions>> = vec![None; items.len()];
    let mut res = -1.0f32;

    for (i, operand) in items.iter().enumerate() {
        for entry in vector.matching(operand) {
            let cur = OperandPositions::for_entry(&entry.positions);
            pos[i] = Some(cur);

            for prev in pos[..i].iter().flatten() {
                for a in cur.list {
                    for b in prev.list {
                        let dist = a.pos.abs_diff(b.pos);
                        if dist == 0 && !(cur.synthetic || prev.synthetic) {
                            // Same real position: the terms are alternatives
                            // for one token, not a co-occurrence.
                            continue;
                        }
                        let dist = if dist == 0 { MAX_POS } else { dist };
                        let curw = (w[a.class.index()]
                            * w[b.class.index()]
                            * collocation_weight(dist))
                        .sqrt();
                        res = if res < 0.0 {
                            curw
                        } else {
                            1.0 - (1.0 - res) * (1.0 - curw)
                        };
                    }
                }
            }
        }
    }
    res
}
