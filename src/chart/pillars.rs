//! Chart Validator
//!
//! Turns four literal pillar strings into an immutable [`Chart`]. Validation is
//! atomic: the first invalid pillar (in hour, day, month, year order) fails the
//! whole call.

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use super::sexagenary::{position_of, StemBranch};
use super::symbols::{Branch, Stem};
use crate::error::ChartError;

/// Position of a pillar within the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarRole {
    Hour,
    Day,
    Month,
    Year,
}

impl PillarRole {
    pub const ALL: [PillarRole; 4] = [
        PillarRole::Hour,
        PillarRole::Day,
        PillarRole::Month,
        PillarRole::Year,
    ];

    pub fn vi_name(self) -> &'static str {
        match self {
            PillarRole::Hour => "giờ",
            PillarRole::Day => "ngày",
            PillarRole::Month => "tháng",
            PillarRole::Year => "năm",
        }
    }

    pub fn en_name(self) -> &'static str {
        match self {
            PillarRole::Hour => "hour",
            PillarRole::Day => "day",
            PillarRole::Month => "month",
            PillarRole::Year => "year",
        }
    }
}

impl fmt::Display for PillarRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.en_name())
    }
}

/// The four raw pillar literals as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PillarInput {
    #[serde(alias = "hour")]
    pub gio: String,
    #[serde(alias = "day")]
    pub ngay: String,
    #[serde(alias = "month")]
    pub thang: String,
    #[serde(alias = "year")]
    pub nam: String,
}

impl PillarInput {
    pub fn new(
        gio: impl Into<String>,
        ngay: impl Into<String>,
        thang: impl Into<String>,
        nam: impl Into<String>,
    ) -> Self {
        Self {
            gio: gio.into(),
            ngay: ngay.into(),
            thang: thang.into(),
            nam: nam.into(),
        }
    }

    pub fn get(&self, role: PillarRole) -> &str {
        match role {
            PillarRole::Hour => &self.gio,
            PillarRole::Day => &self.ngay,
            PillarRole::Month => &self.thang,
            PillarRole::Year => &self.nam,
        }
    }
}

/// Four validated pillars. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ChartFields")]
pub struct Chart {
    pub hour: StemBranch,
    pub day: StemBranch,
    pub month: StemBranch,
    pub year: StemBranch,
}

/// Unchecked wire form; deserialising a `Chart` goes through `from_pairs`.
#[derive(Deserialize)]
struct ChartFields {
    hour: StemBranch,
    day: StemBranch,
    month: StemBranch,
    year: StemBranch,
}

impl TryFrom<ChartFields> for Chart {
    type Error = ChartError;

    fn try_from(fields: ChartFields) -> Result<Self, Self::Error> {
        Chart::from_pairs(fields.hour, fields.day, fields.month, fields.year)
    }
}

impl Chart {
    /// Build a chart from already-typed pillars, checking each against the cycle.
    pub fn from_pairs(
        hour: StemBranch,
        day: StemBranch,
        month: StemBranch,
        year: StemBranch,
    ) -> Result<Self, ChartError> {
        let chart = Self { hour, day, month, year };
        for role in PillarRole::ALL {
            let pair = chart.pillar(role);
            if position_of(pair).is_none() {
                return Err(ChartError::InvalidPillar {
                    which: role,
                    value: pair.to_string(),
                });
            }
        }
        Ok(chart)
    }

    pub fn pillar(&self, role: PillarRole) -> StemBranch {
        match role {
            PillarRole::Hour => self.hour,
            PillarRole::Day => self.day,
            PillarRole::Month => self.month,
            PillarRole::Year => self.year,
        }
    }

    /// The Day Master: reference stem for relations and stars.
    pub fn day_master(&self) -> Stem {
        self.day.stem
    }

    /// Pillars in hour, day, month, year order.
    pub fn pillars(&self) -> [(PillarRole, StemBranch); 4] {
        PillarRole::ALL.map(|role| (role, self.pillar(role)))
    }

    /// Branches in hour, day, month, year order.
    pub fn branches(&self) -> [Branch; 4] {
        PillarRole::ALL.map(|role| self.pillar(role).branch)
    }

    pub fn contains_branch(&self, branch: Branch) -> bool {
        self.branches().contains(&branch)
    }
}

/// Parse one pillar literal such as `"Giáp Tý"`.
pub fn parse_pillar(role: PillarRole, raw: &str) -> Result<StemBranch, ChartError> {
    let invalid = || ChartError::InvalidPillar {
        which: role,
        value: raw.to_string(),
    };

    let normalized: String = raw.nfc().collect();
    let mut tokens = normalized.split_whitespace();
    let (Some(stem_token), Some(branch_token), None) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(invalid());
    };

    let stem = Stem::parse(stem_token).ok_or_else(invalid)?;
    let branch = Branch::parse(branch_token).ok_or_else(invalid)?;
    let pair = StemBranch::new(stem, branch);

    position_of(pair).map(|_| pair).ok_or_else(invalid)
}

/// Validate four literal pillars into a chart.
pub fn validate(hour: &str, day: &str, month: &str, year: &str) -> Result<Chart, ChartError> {
    Ok(Chart {
        hour: parse_pillar(PillarRole::Hour, hour)?,
        day: parse_pillar(PillarRole::Day, day)?,
        month: parse_pillar(PillarRole::Month, month)?,
        year: parse_pillar(PillarRole::Year, year)?,
    })
}

impl TryFrom<&PillarInput> for Chart {
    type Error = ChartError;

    fn try_from(input: &PillarInput) -> Result<Self, Self::Error> {
        validate(&input.gio, &input.ngay, &input.thang, &input.nam)
    }
}
