//! Elemental Tally
//!
//! Weighted distribution over the five elements: 1.0 per visible stem and
//! branch, 0.3 per hidden stem.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::chart::{Chart, Element};
use crate::error::ChartError;

pub const PRIMARY_WEIGHT: f64 = 1.0;
pub const HIDDEN_WEIGHT: f64 = 0.3;

/// Accumulated weight per element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementTally {
    weights: BTreeMap<Element, f64>,
}

impl ElementTally {
    fn empty() -> Self {
        Self {
            weights: Element::ALL.into_iter().map(|e| (e, 0.0)).collect(),
        }
    }

    fn add(&mut self, element: Element, weight: f64) {
        *self.weights.entry(element).or_insert(0.0) += weight;
    }

    pub fn weight(&self, element: Element) -> f64 {
        self.weights.get(&element).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Share of each element in [0, 1], divided by the actual total.
    pub fn shares(&self) -> BTreeMap<Element, f64> {
        let total = self.total();
        self.weights
            .iter()
            .map(|(element, weight)| {
                let share = if total > 0.0 { weight / total } else { 0.0 };
                (*element, share)
            })
            .collect()
    }

    /// Shares as percentages rounded to one decimal.
    pub fn percentages(&self) -> BTreeMap<Element, f64> {
        self.shares()
            .into_iter()
            .map(|(element, share)| (element, (share * 1000.0).round() / 10.0))
            .collect()
    }

    /// Highest-weighted element; ties go to the earlier element in cycle order.
    pub fn dominant(&self) -> Element {
        Element::ALL
            .into_iter()
            .fold(Element::Wood, |best, e| if self.weight(e) > self.weight(best) { e } else { best })
    }

    /// Lowest-weighted element; ties go to the earlier element in cycle order.
    pub fn weakest(&self) -> Element {
        Element::ALL
            .into_iter()
            .fold(Element::Wood, |low, e| if self.weight(e) < self.weight(low) { e } else { low })
    }

    pub fn weights(&self) -> &BTreeMap<Element, f64> {
        &self.weights
    }
}

/// Tally the chart's elements.
pub fn tally(chart: &Chart) -> Result<ElementTally, ChartError> {
    let pillars = chart.pillars();
    if pillars.len() < 4 {
        return Err(ChartError::IncompleteChart {
            found: pillars.len(),
            required: 4,
        });
    }

    let mut result = ElementTally::empty();
    for (_, pair) in pillars {
        result.add(pair.stem.element(), PRIMARY_WEIGHT);
        result.add(pair.branch.element(), PRIMARY_WEIGHT);
    }
    for (_, pair) in pillars {
        for hidden in pair.branch.hidden_stems() {
            result.add(hidden.element(), HIDDEN_WEIGHT);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{combination_at, validate, Chart};

    fn sample() -> Chart {
        validate("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ").unwrap()
    }

    fn expected_total(chart: &Chart) -> f64 {
        let hidden: usize = chart.branches().iter().map(|b| b.hidden_stems().len()).sum();
        8.0 + HIDDEN_WEIGHT * hidden as f64
    }

    #[test]
    fn test_sample_weights() {
        let t = tally(&sample()).unwrap();
        // Visible: Wood 2 (Giáp, Dần), Fire 2 (Bính, Ngọ), Earth 2 (Mậu, Thìn), Metal 1, Water 1.
        // Hidden: Tý[Quý] Dần[Giáp Bính Mậu] Thìn[Mậu Ất Quý] Ngọ[Đinh Kỷ].
        assert!((t.weight(Element::Wood) - 2.6).abs() < 1e-9);
        assert!((t.weight(Element::Fire) - 2.6).abs() < 1e-9);
        assert!((t.weight(Element::Earth) - 2.9).abs() < 1e-9);
        assert!((t.weight(Element::Metal) - 1.0).abs() < 1e-9);
        assert!((t.weight(Element::Water) - 1.6).abs() < 1e-9);
        assert!((t.total() - 10.7).abs() < 1e-9);
        assert_eq!(t.dominant(), Element::Earth);
        assert_eq!(t.weakest(), Element::Metal);
    }

    #[test]
    fn test_total_weight_invariant() {
        for i in 0..60 {
            let chart = Chart::from_pairs(
                combination_at(i),
                combination_at(i + 7),
                combination_at(i + 19),
                combination_at(i + 31),
            )
            .unwrap();
            let t = tally(&chart).unwrap();
            assert!((t.total() - expected_total(&chart)).abs() < 1e-9);
            let shares = t.shares();
            assert!(shares.values().all(|s| (0.0..=1.0).contains(s)));
            assert!((shares.values().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_percentages_round_to_one_decimal() {
        let pct = tally(&sample()).unwrap().percentages();
        assert_eq!(pct[&Element::Metal], 9.3);
        assert_eq!(pct[&Element::Earth], 27.1);
    }
}
