//! Document-side data model: lexemes, occurrence positions, weight classes.
//!
//! A [`LexemeVector`] is the parsed, index-time representation of one document:
//! an ordered sequence of distinct lexemes, each carrying the positions at which
//! it occurs and a per-occurrence weight class. Construction normalizes the
//! sequence into the sorted, de-duplicated form the rankers' binary search
//! relies on; everything downstream borrows it read-only.

use crate::query::QueryOperand;

/// Largest storable occurrence position plus one.
///
/// Positions live in `0..MAX_POS`; the value `MAX_POS` itself is reserved to
/// mean "position unknown" and is substituted as the collocation distance when
/// a position-less entry collides with another occurrence.
pub const MAX_POS: u32 = 1 << 14;

/// Discrete weight tier assigned to an occurrence at indexing time.
///
/// Tiers map to the per-class weight table (default `[0.1, 0.2, 0.4, 1.0]`
/// for `D, C, B, A`): `A` marks the most prominent occurrences (e.g. titles),
/// `D` the least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeightClass {
    /// Lowest tier (index 0).
    D = 0,
    /// Index 1.
    C = 1,
    /// Index 2.
    B = 2,
    /// Highest tier (index 3).
    A = 3,
}

impl WeightClass {
    /// Index of this class into a weight table.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Class for a table index, if `ix < 4`.
    pub const fn from_index(ix: usize) -> Option<WeightClass> {
        match ix {
            0 => Some(WeightClass::D),
            1 => Some(WeightClass::C),
            2 => Some(WeightClass::B),
            3 => Some(WeightClass::A),
            _ => None,
        }
    }
}

/// One occurrence of a lexeme: an offset within the document plus its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Offset of the occurrence, `0..MAX_POS`.
    pub pos: u32,
    /// Weight tier of the occurrence.
    pub class: WeightClass,
}

impl Position {
    /// Create a position, clamping the offset into the storable range.
    pub fn new(pos: u32, class: WeightClass) -> Self {
        Self {
            pos: pos.min(MAX_POS - 1),
            class,
        }
    }

    /// Stand-in occurrence for entries stored without positional data.
    pub(crate) const UNKNOWN: Position = Position {
        pos: 0,
        class: WeightClass::A,
    };
}

/// A distinct lexeme of a document together with its occurrences.
///
/// `positions` may be empty: some producers strip positional data to save
/// space. The rankers then treat the entry as a single occurrence at the
/// synthetic [`Position::UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexemeEntry {
    /// The normalized token, compared bytewise.
    pub lexeme: String,
    /// Occurrences, ascending by offset.
    pub positions: Vec<Position>,
}

impl LexemeEntry {
    /// Create an entry, sorting occurrences ascending by offset.
    ///
    /// The OR ranker's decaying occurrence series assumes this storage order.
    pub fn new(lexeme: impl Into<String>, mut positions: Vec<Position>) -> Self {
        positions.sort_by_key(|p| p.pos);
        Self {
            lexeme: lexeme.into(),
            positions,
        }
    }
}

/// Parsed document vector: distinct lexemes sorted bytewise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexemeVector {
    entries: Vec<LexemeEntry>,
}

impl LexemeVector {
    /// Build a vector from entries in any order.
    ///
    /// Entries are sorted bytewise by lexeme; for duplicate lexemes the first
    /// occurrence wins. The resulting order is what [`LexemeVector::matching`]
    /// binary-searches over.
    pub fn new(mut entries: Vec<LexemeEntry>) -> Self {
        entries.sort_by(|a, b| a.lexeme.as_bytes().cmp(b.lexeme.as_bytes()));
        entries.dedup_by(|next, prev| next.lexeme == prev.lexeme);
        Self { entries }
    }

    /// Number of distinct lexemes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector holds no lexemes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The sorted entries.
    pub fn entries(&self) -> &[LexemeEntry] {
        &self.entries
    }

    /// Total occurrence count: entries without positional data count as one.
    ///
    /// This is the document "length" the length-based normalizations divide by.
    pub fn occurrence_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.positions.len().max(1))
            .sum()
    }

    /// Entries matching a query operand.
    ///
    /// Exact mode returns the unique entry (or nothing); prefix mode returns
    /// the full contiguous run of entries whose lexeme starts with the operand
    /// bytes. A miss is the empty slice, never an error.
    pub(crate) fn matching(&self, operand: &QueryOperand) -> &[LexemeEntry] {
        let term = operand.lexeme.as_bytes();
        if operand.prefix {
            let start = self
                .entries
                .partition_point(|e| e.lexeme.as_bytes() < term);
            let count = self.entries[start..]
                .iter()
                .take_while(|e| e.lexeme.as_bytes().starts_with(term))
                .count();
            &self.entries[start..start + count]
        } else {
            match self
                .entries
                .binary_search_by(|e| e.lexeme.as_bytes().cmp(term))
            {
                Ok(at) => &self.entries[at..=at],
                Err(_) => &[],
            }
        }
    }
}
