//! Analysis Module
//!
//! The three independent derivations over a validated chart: elemental tally,
//! Ten Relations, and star annotation.

mod tally;
mod relations;
mod stars;

pub use tally::{tally, ElementTally, HIDDEN_WEIGHT, PRIMARY_WEIGHT};
pub use relations::{derive_relations, relation_for, RelationEntry, RelationKind, RelationResult, TenRelation};
pub use stars::{annotate, triad_of, Star, StarFinding, StarKey, StarResult, Triad};
