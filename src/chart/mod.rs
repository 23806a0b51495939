//! Chart Module
//!
//! Static symbol tables, the sexagenary cycle, and chart validation.

mod symbols;
pub mod sexagenary;
mod pillars;

pub use symbols::{Branch, Element, Polarity, Stem};
pub(crate) use symbols::deserialize_named;
pub use sexagenary::{combination_at, position_of, year_to_combination, StemBranch};
pub use pillars::{parse_pillar, validate, Chart, PillarInput, PillarRole};
