//! Cover-density ranker: minimal spans satisfying the query.
//!
//! The document is first flattened into a position-ordered list of
//! occurrences, each tagged with the query operands it satisfies. A
//! dual-direction scan then extracts *covers*: spans that satisfy the whole
//! query and cannot be shrunk at either end. Each cover contributes its
//! weighted density, discounted by the noise words inside it; the distances
//! between consecutive covers feed the optional
//! [`Normalization::EXTENT_DIST`] post-processing.
//!
//! The approach follows Clarke, Cormack & Tudhope (2000).

use crate::normalize::{self, ExtentStats, Normalization};
use crate::query::Query;
use crate::vector::{LexemeVector, Position, WeightClass};
use crate::{weights, Error};
use std::rc::Rc;

/// Cooperative interruption hook for long cover scans.
///
/// The host is consulted at the top of every cover attempt, including
/// retries after a rejected candidate. Returning an error aborts the ranking
/// call and surfaces at the boundary.
pub trait InterruptGuard {
    /// Return `Err` to abort the scan.
    fn check(&self) -> Result<(), Error>;
}

/// Guard that never interrupts; backs the unguarded entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverInterrupt;

impl InterruptGuard for NeverInterrupt {
    fn check(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Rank `vector` against `query` by cover density with default class weights.
pub fn rank_cover_density(
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
) -> Result<f32, Error> {
    calc(
        &weights::resolve(None)?,
        vector,
        query,
        method,
        &NeverInterrupt,
    )
}

/// Rank `vector` against `query` by cover density with caller-supplied weights.
///
/// `weights` follows the weight-array contract; additionally, zero weights
/// are rejected here because the density math divides by them.
pub fn rank_cover_density_weighted(
    weights: &[Option<f32>],
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
) -> Result<f32, Error> {
    calc(
        &weights::resolve(Some(weights))?,
        vector,
        query,
        method,
        &NeverInterrupt,
    )
}

/// Cover-density ranking with an explicit interruption guard.
pub fn rank_cover_density_guarded(
    weights: Option<&[Option<f32>]>,
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
    guard: &dyn InterruptGuard,
) -> Result<f32, Error> {
    calc(&weights::resolve(weights)?, vector, query, method, guard)
}

/// One document occurrence, tagged with the operand nodes it satisfies.
///
/// Consecutive occurrences emitted for one lexeme share their operand list.
/// A position-less entry contributes one occurrence at [`Position::UNKNOWN`].
struct Occurrence {
    pos: u32,
    class: WeightClass,
    nodes: Rc<[usize]>,
}

/// A minimal cover: doc-rep span `[begin, end]` with its position bounds,
/// plus the resume point for the next search.
#[derive(Debug, Default)]
struct Extent {
    next: usize,
    begin: usize,
    end: usize,
    p: u32,
    q: u32,
}

fn calc(
    w: &[f32; 4],
    vector: &LexemeVector,
    query: &Query,
    method: Normalization,
    guard: &dyn InterruptGuard,
) -> Result<f32, Error> {
    let invw = weights::inverses(w)?;
    if vector.is_empty() || query.is_empty() {
        return Ok(0.0);
    }
    let doc = build_occurrences(vector, query);
    if doc.is_empty() {
        return Ok(0.0);
    }

    let mut present = vec![false; query.len()];
    let mut ext = Extent::default();
    let mut wdoc = 0.0f64;
    let mut sum_dist = 0.0f64;
    let mut prev_mid = 0.0f64;
    let mut extents = 0u32;

    while next_cover(&doc, query, &mut present, &mut ext, guard)? {
        let span = &doc[ext.begin..=ext.end];
        let inv_sum: f64 = span.iter().map(|o| invw[o.class.index()]).sum();
        let cpos = span.len() as f64 / inv_sum;

        let span_len = (ext.end - ext.begin) as i64;
        let mut noise = i64::from(ext.q) - i64::from(ext.p) - span_len;
        if noise < 0 {
            // Position truncation in long documents can pull q down to p;
            // approximate the noise as half the cover length.
            noise = span_len / 2;
        }
        wdoc += cpos / (1 + noise) as f64;

        let mid = (f64::from(ext.p) + f64::from(ext.q)) / 2.0;
        if extents > 0 && mid > prev_mid {
            sum_dist += 1.0 / (mid - prev_mid);
        }
        prev_mid = mid;
        extents += 1;
    }

    let stats = ExtentStats { extents, sum_dist };
    Ok(normalize::apply(method, wdoc, vector, Some(&stats)) as f32)
}

/// Flatten the document into position-ordered occurrences.
///
/// Each query operand is looked up once; operands naming the same lexeme are
/// satisfied by the same occurrences, so they are emitted together and the
/// whole group is attached to every occurrence of the batch.
fn build_occurrences(vector: &LexemeVector, query: &Query) -> Vec<Occurrence> {
    let mut assigned = vec![false; query.len()];
    let mut doc: Vec<Occurrence> = Vec::with_capacity(4 * query.len());

    for (i, node) in query.nodes().iter().enumerate() {
        let Some(operand) = node.as_operand() else {
            continue;
        };
        if assigned[i] {
            continue;
        }
        let run = vector.matching(operand);
        if run.is_empty() {
            continue;
        }

        let group: Rc<[usize]> = query
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, n)| {
                n.as_operand()
                    .is_some_and(|other| other.lexeme == operand.lexeme)
            })
            .map(|(k, _)| k)
            .collect();
        for &k in group.iter() {
            assigned[k] = true;
        }

        for entry in run {
            if entry.positions.is_empty() {
                doc.push(Occurrence {
                    pos: Position::UNKNOWN.pos,
                    class: Position::UNKNOWN.class,
                    nodes: Rc::clone(&group),
                });
            } else {
                for p in &entry.positions {
                    doc.push(Occurrence {
                        pos: p.pos,
                        class: p.class,
                        nodes: Rc::clone(&group),
                    });
                }
            }
        }
    }

    // Stable: occurrences at equal positions keep their emission order.
    doc.sort_by_key(|o| o.pos);
    doc
}

/// Advance to the next minimal cover at or after `ext.next`.
///
/// Forward scan under lax evaluation finds the earliest span end that can
/// satisfy the query; a backward scan under strict evaluation then pulls the
/// span start as far right as possible. Neither endpoint can move inward
/// without breaking satisfiability, so the extent is minimal. A rejected
/// candidate restarts one occurrence later; this loops rather than recursing
/// because long noisy documents would otherwise exhaust the stack.
fn next_cover(
    doc: &[Occurrence],
    query: &Query,
    present: &mut [bool],
    ext: &mut Extent,
    guard: &dyn InterruptGuard,
) -> Result<bool, Error> {
    loop {
        guard.check()?;

        present.fill(false);
        let mut upper = None;
        for u in ext.next..doc.len() {
            for &n in doc[u].nodes.iter() {
                present[n] = true;
            }
            if query.execute(false, &mut |at, _| present[at]) {
                upper = Some(u);
                break;
            }
        }
        let Some(upper) = upper else {
            return Ok(false);
        };
        ext.q = doc[upper].pos;
        ext.end = upper;

        present.fill(false);
        let mut lower = None;
        for l in (ext.next..=upper).rev() {
            for &n in doc[l].nodes.iter() {
                present[n] = true;
            }
            if query.execute(true, &mut |at, _| present[at]) {
                lower = Some(l);
                break;
            }
        }

        if let Some(lower) = lower {
            let p = doc[lower].pos;
            if p <= ext.q {
                ext.p = p;
                ext.begin = lower;
                ext.next = lower + 1;
                return Ok(true);
            }
        }
        ext.next += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::LexemeEntry;

    fn entry(lexeme: &str, positions: &[(u32, WeightClass)]) -> LexemeEntry {
        LexemeEntry::new(
            lexeme,
            positions.iter().map(|&(p, c)| Position::new(p, c)).collect(),
        )
    }

    fn rank(vector: &LexemeVector, query: &Query, method: Normalization) -> f32 {
        rank_cover_density(vector, query, method).unwrap()
    }

    #[test]
    fn single_occurrence_scores_unit_density() {
        let v = LexemeVector::new(vec![entry("cat", &[(5, WeightClass::A)])]);
        let got = rank(&v, &Query::lexeme("cat"), Normalization::NONE);
        assert!((got - 1.0).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn position_less_entry_scores_unit_density() {
        let v = LexemeVector::new(vec![entry("cat", &[])]);
        let got = rank(&v, &Query::lexeme("cat"), Normalization::NONE);
        assert!((got - 1.0).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn adjacent_pairs_yield_bridged_covers() {
        // a..b at 1,2 and again at 10,11: the minimal covers are (1,2),
        // (2,10) — the bridge between the pairs — and (10,11).
        let v = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::A), (10, WeightClass::A)]),
            entry("b", &[(2, WeightClass::A), (11, WeightClass::A)]),
        ]);
        let q = Query::and(Query::lexeme("a"), Query::lexeme("b"));
        let got = rank(&v, &q, Normalization::NONE);
        // Tight covers contribute 1 each, the bridge 1 / (1 + 7 noise words).
        let expected = 1.0 + 1.0 / 8.0 + 1.0;
        assert!((got - expected).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn extent_distance_normalization_divides_by_mean_spacing() {
        let v = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::A), (10, WeightClass::A)]),
            entry("b", &[(2, WeightClass::A), (11, WeightClass::A)]),
        ]);
        let q = Query::and(Query::lexeme("a"), Query::lexeme("b"));
        let got = rank(&v, &q, Normalization::EXTENT_DIST);
        // Cover midpoints 1.5, 6.0, 10.5: sum_dist = 2/4.5, extents = 3.
        let sum_dist = 2.0 / 4.5;
        let expected = (1.0 + 1.0 / 8.0 + 1.0) / (3.0 / sum_dist);
        assert!((got - expected as f32).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn lower_class_occurrences_dilute_density() {
        let strong = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::A)]),
            entry("b", &[(2, WeightClass::A)]),
        ]);
        let weak = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::D)]),
            entry("b", &[(2, WeightClass::D)]),
        ]);
        let q = Query::and(Query::lexeme("a"), Query::lexeme("b"));
        let hi = rank(&strong, &q, Normalization::NONE);
        let lo = rank(&weak, &q, Normalization::NONE);
        assert!(hi > lo, "expected {hi} > {lo}");
        // Two occurrences at inverse weight 10 each: density 2/20.
        assert!((lo - 0.1).abs() < 1e-6, "got {lo}");
    }

    #[test]
    fn noise_words_discount_the_cover() {
        let tight = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::A)]),
            entry("b", &[(2, WeightClass::A)]),
        ]);
        let sparse = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::A)]),
            entry("b", &[(6, WeightClass::A)]),
        ]);
        let q = Query::and(Query::lexeme("a"), Query::lexeme("b"));
        let near = rank(&tight, &q, Normalization::NONE);
        let far = rank(&sparse, &q, Normalization::NONE);
        assert!((near - 1.0).abs() < 1e-6);
        // Four noise positions between 1 and 6.
        assert!((far - 1.0 / 5.0).abs() < 1e-6, "got {far}");
    }

    #[test]
    fn negated_term_shapes_the_cover() {
        let v = LexemeVector::new(vec![
            entry("a", &[(1, WeightClass::A), (10, WeightClass::A)]),
            entry("b", &[(2, WeightClass::A)]),
        ]);
        let q = Query::and(Query::lexeme("a"), Query::negate(Query::lexeme("b")));
        // Each `a` occurrence alone satisfies the query strictly.
        let got = rank(&v, &q, Normalization::NONE);
        assert!((got - 2.0).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn prefix_operand_covers_every_expansion() {
        let v = LexemeVector::new(vec![
            entry("cat", &[(1, WeightClass::A)]),
            entry("catch", &[(3, WeightClass::A)]),
            entry("dog", &[(9, WeightClass::A)]),
        ]);
        let got = rank(&v, &Query::prefix("cat"), Normalization::NONE);
        assert!((got - 2.0).abs() < 1e-6, "got {got}");
    }

    #[test]
    fn missing_term_ranks_zero() {
        let v = LexemeVector::new(vec![entry("cat", &[(5, WeightClass::A)])]);
        assert_eq!(rank(&v, &Query::lexeme("unicorn"), Normalization::NONE), 0.0);
    }

    #[test]
    fn empty_inputs_rank_zero() {
        let v = LexemeVector::new(vec![entry("cat", &[(5, WeightClass::A)])]);
        assert_eq!(
            rank(&LexemeVector::default(), &Query::lexeme("cat"), Normalization::NONE),
            0.0
        );
        assert_eq!(rank(&v, &Query::default(), Normalization::NONE), 0.0);
    }

    #[test]
    fn zero_weight_is_rejected_before_scoring() {
        let v = LexemeVector::new(vec![entry("cat", &[(5, WeightClass::A)])]);
        let err = rank_cover_density_weighted(
            &[Some(0.0), Some(0.2), Some(0.4), Some(1.0)],
            &v,
            &Query::lexeme("cat"),
            Normalization::NONE,
        )
        .unwrap_err();
        assert!(matches!(err, Error::WeightOutOfRange));
    }

    #[test]
    fn guard_interrupts_the_scan() {
        struct AlwaysInterrupt;
        impl InterruptGuard for AlwaysInterrupt {
            fn check(&self) -> Result<(), Error> {
                Err(Error::Interrupted)
            }
        }
        let v = LexemeVector::new(vec![entry("cat", &[(5, WeightClass::A)])]);
        let err = rank_cover_density_guarded(
            None,
            &v,
            &Query::lexeme("cat"),
            Normalization::NONE,
            &AlwaysInterrupt,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Interrupted));
    }

    #[test]
    fn repeated_operands_share_their_occurrences() {
        let v = LexemeVector::new(vec![entry("cat", &[(5, WeightClass::A)])]);
        let q = Query::and(Query::lexeme("cat"), Query::lexeme("cat"));
        // Both operand nodes attach to the single occurrence, so the
        // conjunction is satisfied by a one-occurrence cover.
        let got = rank(&v, &q, Normalization::NONE);
        assert!((got - 1.0).abs() < 1e-6, "got {got}");
    }
}
