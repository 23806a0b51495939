//! Narrative Module
//!
//! Query classification and bilingual message composition.

pub mod intent;
mod composer;

use serde::{Deserialize, Serialize};

pub use composer::{respond, Reply};
pub use intent::{classify, normalize, IntentCategory};

/// Requested output language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Vi,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Vi => "vi",
            Language::En => "en",
        }
    }
}
