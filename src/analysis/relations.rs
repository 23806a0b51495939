//! Ten Relations
//!
//! Classifies every stem and branch of the chart against the Day Master.
//! The relation kind comes from the element cycles; the variant comes from
//! comparing polarities (same polarity selects the first label).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::chart::{deserialize_named, Branch, Chart, Element, Polarity, Stem};
use crate::error::ChartError;

/// How a candidate element relates to the reference element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// Same element.
    Companion,
    /// Reference generates candidate.
    Output,
    /// Candidate generates reference.
    Resource,
    /// Reference restrains candidate.
    Wealth,
    /// Candidate restrains reference.
    Power,
}

impl RelationKind {
    pub fn classify(reference: Element, candidate: Element) -> RelationKind {
        if candidate == reference {
            RelationKind::Companion
        } else if reference.generates() == candidate {
            RelationKind::Output
        } else if candidate.generates() == reference {
            RelationKind::Resource
        } else if reference.restrains() == candidate {
            RelationKind::Wealth
        } else {
            RelationKind::Power
        }
    }
}

/// One of the ten relation labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenRelation {
    Friend,
    RobWealth,
    EatingGod,
    HurtingOfficer,
    IndirectResource,
    DirectResource,
    IndirectWealth,
    DirectWealth,
    SevenKillings,
    DirectOfficer,
}

impl TenRelation {
    pub const ALL: [TenRelation; 10] = [
        TenRelation::Friend,
        TenRelation::RobWealth,
        TenRelation::EatingGod,
        TenRelation::HurtingOfficer,
        TenRelation::IndirectResource,
        TenRelation::DirectResource,
        TenRelation::IndirectWealth,
        TenRelation::DirectWealth,
        TenRelation::SevenKillings,
        TenRelation::DirectOfficer,
    ];

    /// Label for a relation kind; `same_polarity` selects variant 0.
    pub fn of(kind: RelationKind, same_polarity: bool) -> TenRelation {
        match (kind, same_polarity) {
            (RelationKind::Companion, true) => TenRelation::Friend,
            (RelationKind::Companion, false) => TenRelation::RobWealth,
            (RelationKind::Output, true) => TenRelation::EatingGod,
            (RelationKind::Output, false) => TenRelation::HurtingOfficer,
            (RelationKind::Resource, true) => TenRelation::IndirectResource,
            (RelationKind::Resource, false) => TenRelation::DirectResource,
            (RelationKind::Wealth, true) => TenRelation::IndirectWealth,
            (RelationKind::Wealth, false) => TenRelation::DirectWealth,
            (RelationKind::Power, true) => TenRelation::SevenKillings,
            (RelationKind::Power, false) => TenRelation::DirectOfficer,
        }
    }

    pub fn kind(self) -> RelationKind {
        match self {
            TenRelation::Friend | TenRelation::RobWealth => RelationKind::Companion,
            TenRelation::EatingGod | TenRelation::HurtingOfficer => RelationKind::Output,
            TenRelation::IndirectResource | TenRelation::DirectResource => RelationKind::Resource,
            TenRelation::IndirectWealth | TenRelation::DirectWealth => RelationKind::Wealth,
            TenRelation::SevenKillings | TenRelation::DirectOfficer => RelationKind::Power,
        }
    }

    pub fn vi_name(self) -> &'static str {
        match self {
            TenRelation::Friend => "Tỷ Kiên",
            TenRelation::RobWealth => "Kiếp Tài",
            TenRelation::EatingGod => "Thực Thần",
            TenRelation::HurtingOfficer => "Thương Quan",
            TenRelation::IndirectResource => "Thiên Ấn",
            TenRelation::DirectResource => "Chính Ấn",
            TenRelation::IndirectWealth => "Thiên Tài",
            TenRelation::DirectWealth => "Chính Tài",
            TenRelation::SevenKillings => "Thất Sát",
            TenRelation::DirectOfficer => "Chính Quan",
        }
    }

    pub fn en_name(self) -> &'static str {
        match self {
            TenRelation::Friend => "Friend",
            TenRelation::RobWealth => "Rob Wealth",
            TenRelation::EatingGod => "Eating God",
            TenRelation::HurtingOfficer => "Hurting Officer",
            TenRelation::IndirectResource => "Indirect Resource",
            TenRelation::DirectResource => "Direct Resource",
            TenRelation::IndirectWealth => "Indirect Wealth",
            TenRelation::DirectWealth => "Direct Wealth",
            TenRelation::SevenKillings => "Seven Killings",
            TenRelation::DirectOfficer => "Direct Officer",
        }
    }

    /// Parse a Vietnamese label (expects NFC input).
    pub fn parse(label: &str) -> Option<TenRelation> {
        TenRelation::ALL.into_iter().find(|r| r.vi_name() == label)
    }
}

impl fmt::Display for TenRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vi_name())
    }
}

impl Serialize for TenRelation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.vi_name())
    }
}

impl<'de> Deserialize<'de> for TenRelation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_named(deserializer, "relation", TenRelation::parse)
    }
}

/// Label a candidate element/polarity against the reference stem.
pub fn relation_for(reference: Stem, element: Element, polarity: Polarity) -> TenRelation {
    let kind = RelationKind::classify(reference.element(), element);
    TenRelation::of(kind, polarity == reference.polarity())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEntry<T> {
    pub token: T,
    pub relation: TenRelation,
}

/// Relation labels in first-seen order. Re-labelling a token keeps its slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationResult {
    pub day_master: Stem,
    pub stems: Vec<RelationEntry<Stem>>,
    pub branches: Vec<RelationEntry<Branch>>,
}

fn upsert<T: PartialEq>(entries: &mut Vec<RelationEntry<T>>, token: T, relation: TenRelation) {
    match entries.iter_mut().find(|e| e.token == token) {
        Some(existing) => existing.relation = relation,
        None => entries.push(RelationEntry { token, relation }),
    }
}

impl RelationResult {
    pub fn stem(&self, stem: Stem) -> Option<TenRelation> {
        self.stems.iter().find(|e| e.token == stem).map(|e| e.relation)
    }

    pub fn branch(&self, branch: Branch) -> Option<TenRelation> {
        self.branches.iter().find(|e| e.token == branch).map(|e| e.relation)
    }

    /// Every label in the result, stems first.
    pub fn labels(&self) -> impl Iterator<Item = TenRelation> + '_ {
        self.stems
            .iter()
            .map(|e| e.relation)
            .chain(self.branches.iter().map(|e| e.relation))
    }

    pub fn count_kind(&self, kind: RelationKind) -> usize {
        self.labels().filter(|r| r.kind() == kind).count()
    }

    pub fn contains(&self, relation: TenRelation) -> bool {
        self.labels().any(|r| r == relation)
    }
}

/// Derive the Ten Relations for every other stem and every branch.
pub fn derive_relations(reference: Stem, chart: &Chart) -> Result<RelationResult, ChartError> {
    // Exhaustive registry: this guards against a reference that lost its element.
    if !Element::ALL.contains(&reference.element()) {
        return Err(ChartError::InvalidReference {
            stem: reference.to_string(),
        });
    }

    let other_stems = [chart.hour.stem, chart.month.stem, chart.year.stem];
    let branches = chart.branches();
    if other_stems.len() < 3 || branches.len() < 4 {
        return Err(ChartError::IncompleteChart {
            found: other_stems.len() + branches.len(),
            required: 7,
        });
    }

    let mut result = RelationResult {
        day_master: reference,
        stems: Vec::with_capacity(3),
        branches: Vec::with_capacity(4),
    };
    for stem in other_stems {
        upsert(&mut result.stems, stem, relation_for(reference, stem.element(), stem.polarity()));
    }
    for branch in branches {
        upsert(
            &mut result.branches,
            branch,
            relation_for(reference, branch.element(), branch.polarity()),
        );
    }
    Ok(result)
}
