//! Chart Errors
//!
//! Local validation failures raised by the analytical engine. None of them are
//! retryable: the caller has to correct the input.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::chart::PillarRole;

/// Errors raised while validating or analysing a chart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    /// A supplied token is not one of the 60 valid stem-branch combinations.
    #[error("invalid {which} pillar: {value:?}")]
    InvalidPillar { which: PillarRole, value: String },

    /// A year outside the supported [1900, 2100] window.
    #[error("year {year} is outside the supported range 1900..=2100")]
    InvalidRange { year: i32 },

    /// Fewer resolvable stems/branches than the computation requires.
    #[error("incomplete chart: found {found} tokens, {required} required")]
    IncompleteChart { found: usize, required: usize },

    /// Reference stem without a registered element.
    #[error("reference stem {stem:?} has no registered element")]
    InvalidReference { stem: String },
}

/// A message rendered in both supported languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualText {
    pub vi: String,
    pub en: String,
}

impl BilingualText {
    pub fn new(vi: impl Into<String>, en: impl Into<String>) -> Self {
        Self { vi: vi.into(), en: en.into() }
    }
}

impl ChartError {
    /// Bilingual message used by the transport layer's error body.
    pub fn bilingual(&self) -> BilingualText {
        match self {
            ChartError::InvalidPillar { which, value } => BilingualText::new(
                format!("Trụ {} không hợp lệ: \"{}\"", which.vi_name(), value),
                format!("Invalid {} pillar: \"{}\"", which.en_name(), value),
            ),
            ChartError::InvalidRange { year } => BilingualText::new(
                format!("Năm {} nằm ngoài phạm vi 1900-2100", year),
                format!("Year {} is outside the range 1900-2100", year),
            ),
            ChartError::IncompleteChart { found, required } => BilingualText::new(
                format!("Lá số chưa đầy đủ: có {} / {} thành phần", found, required),
                format!("Incomplete chart: {} of {} components", found, required),
            ),
            ChartError::InvalidReference { stem } => BilingualText::new(
                format!("Nhật chủ \"{}\" không có ngũ hành", stem),
                format!("Day master \"{}\" has no registered element", stem),
            ),
        }
    }
}
