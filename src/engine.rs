//! Analysis Engine
//!
//! Single synchronous entry point used by the service layer and the CLI.
//! Validation runs first; the three derivations are independent of each other
//! and the composer only reads their outputs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analysis::{annotate, derive_relations, tally, RelationResult, StarResult};
use crate::chart::{Chart, Element, PillarInput};
use crate::error::{BilingualText, ChartError};
use crate::narrative::{respond, IntentCategory, Language};

/// Everything a caller needs to run one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub pillars: PillarInput,
    #[serde(default, alias = "userText", alias = "text")]
    pub message: String,
    #[serde(default)]
    pub language: Language,
}

impl AnalysisRequest {
    pub fn new(pillars: PillarInput, message: impl Into<String>, language: Language) -> Self {
        Self {
            pillars,
            message: message.into(),
            language,
        }
    }
}

/// Result of [`compute_chart_analysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAnalysis {
    pub chart: Chart,
    /// Percentages rounded to one decimal, keyed by Vietnamese element name.
    pub element_shares: BTreeMap<Element, f64>,
    pub element_weights: BTreeMap<Element, f64>,
    pub ten_relations: RelationResult,
    pub stars: StarResult,
    pub category: IntentCategory,
    pub message: String,
    pub messages: BilingualText,
}

/// Validate the pillars and run every derivation plus the composer.
pub fn compute_chart_analysis(
    pillars: &PillarInput,
    user_text: &str,
    language: Language,
) -> Result<ChartAnalysis, ChartError> {
    let chart = Chart::try_from(pillars)?;

    let element_tally = tally(&chart)?;
    let relations = derive_relations(chart.day_master(), &chart)?;
    let stars = annotate(&chart);
    let reply = respond(&chart, &element_tally, &relations, &stars, user_text, language);

    Ok(ChartAnalysis {
        chart,
        element_shares: element_tally.percentages(),
        element_weights: element_tally.weights().clone(),
        ten_relations: relations,
        stars,
        category: reply.category,
        message: reply.message().to_string(),
        messages: reply.messages,
    })
}

/// Convenience wrapper over [`compute_chart_analysis`].
pub fn analyze(request: &AnalysisRequest) -> Result<ChartAnalysis, ChartError> {
    compute_chart_analysis(&request.pillars, &request.message, request.language)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TenRelation;
    use crate::chart::{PillarRole, Stem};

    fn sample() -> PillarInput {
        PillarInput::new("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ")
    }

    #[test]
    fn test_full_analysis() {
        let analysis = compute_chart_analysis(&sample(), "tiền bạc", Language::En).unwrap();
        assert_eq!(analysis.category, IntentCategory::Money);
        assert_eq!(analysis.message, analysis.messages.en);
        assert_eq!(analysis.element_shares.len(), 5);
        let total: f64 = analysis.element_shares.values().sum();
        assert!((total - 100.0).abs() < 0.5);
        assert_eq!(analysis.ten_relations.day_master, Stem::Binh);
        assert_eq!(analysis.ten_relations.stems[0].relation, TenRelation::IndirectResource);
        assert_eq!(analysis.stars.stars.len(), 11);

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["tenRelations"]["dayMaster"], "Bính");
        assert_eq!(json["tenRelations"]["stems"][0]["relation"], "Thiên Ấn");
        assert!(json["elementShares"]["Kim"].is_number());
    }

    #[test]
    fn test_invalid_pillar_short_circuits() {
        let pillars = PillarInput::new("Giáp Tý", "Giáp Sửu", "Mậu Thìn", "Canh Ngọ");
        let err = compute_chart_analysis(&pillars, "", Language::Vi).unwrap_err();
        assert_eq!(
            err,
            ChartError::InvalidPillar {
                which: PillarRole::Day,
                value: "Giáp Sửu".to_string()
            }
        );
    }

    #[test]
    fn test_request_deserializes_with_aliases() {
        let json = r#"{"pillars":{"hour":"Giáp Tý","day":"Bính Dần","month":"Mậu Thìn","year":"Canh Ngọ"},"userText":"stars","language":"en"}"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.pillars, sample());
        assert_eq!(request.language, Language::En);
        let analysis = analyze(&request).unwrap();
        assert_eq!(analysis.category, IntentCategory::Stars);
    }

    #[test]
    fn test_language_defaults_to_vietnamese() {
        let json = r#"{"pillars":{"gio":"Giáp Tý","ngay":"Bính Dần","thang":"Mậu Thìn","nam":"Canh Ngọ"}}"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.language, Language::Vi);
        assert_eq!(request.message, "");
    }

    #[test]
    fn test_analysis_round_trips_and_rejects_malformed_shapes() {
        let analysis = compute_chart_analysis(&sample(), "sự nghiệp", Language::Vi).unwrap();
        let json = serde_json::to_string(&analysis).unwrap();
        assert_eq!(serde_json::from_str::<ChartAnalysis>(&json).unwrap(), analysis);

        let mut value = serde_json::to_value(&analysis).unwrap();
        value["chart"] = serde_json::json!(42);
        value["tenRelations"] = serde_json::json!("garbage");
        value["stars"] = serde_json::Value::Null;
        assert!(serde_json::from_value::<ChartAnalysis>(value).is_err());
    }
}
