//! `lexrank`: positional relevance ranking over parsed lexeme vectors.
//!
//! This crate is meant to be the **shared** Tekne "relevance ranking" building block
//! for boolean full-text queries:
//! - callers bring a parsed document vector (lexemes with occurrence positions and
//!   weight classes) and a parsed boolean query tree;
//! - `lexrank` turns the pair into a relevance score, either occurrence-weighted
//!   ([`rank_standard`]) or cover-density based ([`rank_cover_density`]).
//!
//! Scope:
//! - In-memory, borrowed inputs; all scratch state is scoped to one call
//! - Deterministic scoring (fixed series constants, stable tie-breaks)
//! - Caller-provided parsing (tokenization, stemming and query parsing live elsewhere)
//!
//! Non-goals:
//! - Indexing or persistence (score-only)
//! - Query parsing / boolean simplification
//! - Reranking by signals outside the document vector
//!
//! References:
//! - Clarke, Cormack & Tudhope (2000): "Relevance Ranking for One to Three Term
//!   Queries" — cover density ranking
//! - Salton & Buckley (1988): term-weighting foundations

#![warn(missing_docs)]

pub mod cover;
pub mod normalize;
pub mod query;
pub mod standard;
pub mod vector;
pub mod weights;

pub use cover::{
    rank_cover_density, rank_cover_density_guarded, rank_cover_density_weighted, InterruptGuard,
    NeverInterrupt,
};
pub use error::Error;
pub use normalize::Normalization;
pub use query::{Operator, Query, QueryNode, QueryOperand};
pub use standard::{rank_standard, rank_standard_weighted};
pub use vector::{LexemeEntry, LexemeVector, Position, WeightClass, MAX_POS};
pub use weights::DEFAULT_WEIGHTS;

mod error {
    /// Errors for relevance ranking.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        /// Caller-supplied weight array has fewer than four elements.
        #[error("array of weight is too short")]
        WeightArrayTooShort,
        /// Caller-supplied weight array contains a null element.
        #[error("array of weight must not contain nulls")]
        WeightArrayNull,
        /// A class weight falls outside the accepted `(0, 1]` range.
        #[error("weight out of range")]
        WeightOutOfRange,
        /// The host interrupted a long-running cover scan.
        #[error("ranking interrupted")]
        Interrupted,
    }
}
