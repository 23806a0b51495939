//! Sexagenary Table
//!
//! The 60-entry stem-branch cycle. Stem and branch both advance every step and
//! wrap together at position 60, so only same-parity pairings ever appear.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::symbols::{Branch, Stem};
use crate::error::ChartError;

pub const CYCLE_LEN: usize = 60;

/// Year known to map to position 0 (Giáp Tý).
pub const REFERENCE_YEAR: i32 = 1984;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// A (Stem, Branch) pairing. Only the 60 same-parity pairs are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StemBranch {
    pub stem: Stem,
    pub branch: Branch,
}

impl StemBranch {
    pub fn new(stem: Stem, branch: Branch) -> Self {
        Self { stem, branch }
    }

    /// Same-parity rule shared by every member of the cycle.
    pub fn is_valid(&self) -> bool {
        self.stem.index() % 2 == self.branch.index() % 2
    }
}

impl fmt::Display for StemBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.stem, self.branch)
    }
}

lazy_static! {
    static ref CYCLE: [StemBranch; CYCLE_LEN] = build_cycle();
}

fn build_cycle() -> [StemBranch; CYCLE_LEN] {
    let mut cycle = [StemBranch::new(Stem::Giap, Branch::Ty); CYCLE_LEN];
    for (position, slot) in cycle.iter_mut().enumerate() {
        *slot = StemBranch::new(Stem::from_index(position), Branch::from_index(position));
    }
    cycle
}

/// Combination at a cycle position; positions wrap modulo 60.
pub fn combination_at(position: usize) -> StemBranch {
    CYCLE[position % CYCLE_LEN]
}

/// Reverse lookup, `None` for the 60 invalid pairings.
pub fn position_of(pair: StemBranch) -> Option<usize> {
    CYCLE.iter().position(|candidate| *candidate == pair)
}

/// Stem-branch combination of a year, relative to `REFERENCE_YEAR`.
pub fn year_to_combination(year: i32) -> Result<StemBranch, ChartError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ChartError::InvalidRange { year });
    }
    let cycle = CYCLE_LEN as i32;
    // `%` keeps the dividend's sign, so normalise explicitly.
    let position = ((year - REFERENCE_YEAR) % cycle + cycle) % cycle;
    Ok(combination_at(position as usize))
}

/// Iterate the full cycle in order.
pub fn cycle() -> impl Iterator<Item = StemBranch> {
    CYCLE.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cycle_is_unique_and_valid() {
        let set: HashSet<StemBranch> = cycle().collect();
        assert_eq!(set.len(), CYCLE_LEN);
        assert!(cycle().all(|p| p.is_valid()));
        assert_eq!(combination_at(0), StemBranch::new(Stem::Giap, Branch::Ty));
        assert_eq!(combination_at(59), StemBranch::new(Stem::Quy, Branch::Hoi));
    }

    #[test]
    fn test_position_round_trip() {
        for position in 0..CYCLE_LEN {
            let pair = combination_at(position);
            assert_eq!(position_of(pair), Some(position));
        }
    }

    #[test]
    fn test_invalid_pair_has_no_position() {
        let pair = StemBranch::new(Stem::Giap, Branch::Suu);
        assert!(!pair.is_valid());
        assert_eq!(position_of(pair), None);
    }

    #[test]
    fn test_reference_year() {
        assert_eq!(year_to_combination(REFERENCE_YEAR).unwrap(), combination_at(0));
        // 1900 is 84 years before the reference: ((-84 % 60) + 60) % 60 = 36, Canh Tý.
        // Position 56 (Canh Thân) is sometimes quoted for 1900, but it does not
        // follow from 1984 = Giáp Tý; 56 is the position of 1980.
        let y1900 = year_to_combination(1900).unwrap();
        assert_eq!(y1900, combination_at(36));
        assert_eq!(y1900, StemBranch::new(Stem::Canh, Branch::Ty));
        assert_eq!(year_to_combination(1980).unwrap(), combination_at(56));
        assert_eq!(combination_at(56), StemBranch::new(Stem::Canh, Branch::Than));
        assert_eq!(year_to_combination(2024).unwrap(), StemBranch::new(Stem::Giap, Branch::Thin));
    }

    #[test]
    fn test_sixty_year_periodicity() {
        for year in MIN_YEAR..=(MAX_YEAR - 60) {
            assert_eq!(year_to_combination(year), year_to_combination(year + 60));
        }
    }

    #[test]
    fn test_year_out_of_range() {
        assert_eq!(year_to_combination(1899), Err(ChartError::InvalidRange { year: 1899 }));
        assert_eq!(year_to_combination(2101), Err(ChartError::InvalidRange { year: 2101 }));
        assert!(year_to_combination(2100).is_ok());
    }
}
