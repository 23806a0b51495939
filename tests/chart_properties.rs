//! Structural properties of the cycle table and the derivations.

use tu_tru::analysis::{annotate, derive_relations, relation_for, tally, TenRelation};
use tu_tru::chart::{
    combination_at, position_of, validate, year_to_combination, Branch, Element, PillarRole, Polarity, Stem,
    StemBranch,
};
use tu_tru::ChartError;

#[test]
fn test_cycle_positions_round_trip() {
    for position in 0..60 {
        let pair = combination_at(position);
        assert!(pair.is_valid());
        assert_eq!(position_of(pair), Some(position));
        assert_eq!(pair.stem.index(), position % 10);
        assert_eq!(pair.branch.index(), position % 12);
    }
}

#[test]
fn test_mismatched_parity_has_no_position() {
    for stem in Stem::ALL {
        for branch in Branch::ALL {
            let parity_matches = stem.index() % 2 == branch.index() % 2;
            let pair = StemBranch::new(stem, branch);
            assert_eq!(position_of(pair).is_some(), parity_matches, "{}", pair);
        }
    }
}

#[test]
fn test_year_mapping_is_sixty_year_periodic() {
    for year in 1900..=2040 {
        assert_eq!(year_to_combination(year).unwrap(), year_to_combination(year + 60).unwrap());
    }
    assert_eq!(year_to_combination(1984).unwrap().to_string(), "Giáp Tý");
    assert_eq!(year_to_combination(2024).unwrap().to_string(), "Giáp Thìn");
    assert_eq!(year_to_combination(1899), Err(ChartError::InvalidRange { year: 1899 }));
    assert_eq!(year_to_combination(2101), Err(ChartError::InvalidRange { year: 2101 }));
}

#[test]
fn test_day_pillar_rejection_names_the_pillar() {
    let err = validate("Giáp Tý", "Giáp Sửu", "Mậu Thìn", "Canh Ngọ").unwrap_err();
    match err {
        ChartError::InvalidPillar { which, value } => {
            assert_eq!(which, PillarRole::Day);
            assert_eq!(value, "Giáp Sửu");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_first_invalid_pillar_in_order_is_reported() {
    let err = validate("Ất Tý", "Giáp Sửu", "", "Canh Ngọ").unwrap_err();
    assert!(matches!(err, ChartError::InvalidPillar { which: PillarRole::Hour, .. }));
}

#[test]
fn test_tally_weights_are_conserved() {
    // Four stem primaries, four branch primaries, 0.3 per hidden stem.
    for (h, d, m, y) in [(0usize, 14usize, 28usize, 42usize), (5, 17, 33, 59), (11, 11, 11, 11)] {
        let chart =
            tu_tru::Chart::from_pairs(combination_at(h), combination_at(d), combination_at(m), combination_at(y))
                .unwrap();
        let element_tally = tally(&chart).unwrap();
        let hidden: usize = chart.branches().iter().map(|b| b.hidden_stems().len()).sum();
        let expected = 8.0 + 0.3 * hidden as f64;
        assert!((element_tally.total() - expected).abs() < 1e-9);

        let shares: f64 = element_tally.shares().values().sum();
        assert!((shares - 1.0).abs() < 1e-9);
        assert_eq!(element_tally.shares().len(), 5);
    }
}

#[test]
fn test_polarity_flip_keeps_kind_and_swaps_label() {
    for element in Element::ALL {
        for polarity in [Polarity::Yang, Polarity::Yin] {
            let yang = relation_for(Stem::Giap, element, polarity);
            let yin = relation_for(Stem::At, element, polarity);
            assert_eq!(yang.kind(), yin.kind());
            assert_ne!(yang, yin);
        }
    }
    assert_eq!(relation_for(Stem::Giap, Element::Wood, Polarity::Yang), TenRelation::Friend);
    assert_eq!(relation_for(Stem::Giap, Element::Metal, Polarity::Yin), TenRelation::DirectOfficer);
}

#[test]
fn test_relations_cover_three_stems_and_four_branches() {
    let chart = validate("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ").unwrap();
    let relations = derive_relations(chart.day_master(), &chart).unwrap();
    assert_eq!(relations.stems.len(), 3);
    assert_eq!(relations.branches.len(), 4);
    assert_eq!(relations.stem(Stem::Binh), None);
}

#[test]
fn test_star_annotation_is_deterministic() {
    let chart = validate("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ").unwrap();
    let first = annotate(&chart);
    let second = annotate(&chart);
    assert_eq!(first, second);
    assert_eq!(first.stars.len(), 11);
    for finding in &first.stars {
        assert_eq!(finding.present, !finding.matched.is_empty());
        for branch in &finding.matched {
            assert!(chart.contains_branch(*branch));
        }
    }
}
