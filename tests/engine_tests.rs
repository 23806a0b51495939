//! End-to-end analysis through the public entry point and the service layer.

use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

use tu_tru::chart::Element;
use tu_tru::engine::{analyze, compute_chart_analysis, AnalysisRequest};
use tu_tru::narrative::{classify, IntentCategory, Language};
use tu_tru::services::{AnalysisCache, AnalysisService};
use tu_tru::{ChartError, PillarInput};

fn sample() -> PillarInput {
    PillarInput::new("Giáp Tý", "Bính Dần", "Mậu Thìn", "Canh Ngọ")
}

#[test]
fn test_sample_chart_shares() {
    let analysis = assert_ok!(compute_chart_analysis(&sample(), "", Language::Vi));
    assert_eq!(analysis.element_shares[&Element::Metal], 9.3);
    assert_eq!(analysis.element_shares[&Element::Earth], 27.1);
    assert!((analysis.element_weights[&Element::Earth] - 2.9).abs() < 1e-9);
    assert_eq!(analysis.category, IntentCategory::General);
    assert_eq!(analysis.message, analysis.messages.vi);
}

#[test]
fn test_category_priority() {
    assert_eq!(classify("tiền bạc và sự nghiệp"), IntentCategory::Money);
    assert_eq!(classify("Sự nghiệp, sức khỏe"), IntentCategory::Career);
    assert_eq!(classify("THẬP THẦN"), IntentCategory::TenRelations);
    assert_eq!(classify("thần sát"), IntentCategory::Stars);
    assert_eq!(classify("xin chào"), IntentCategory::General);
}

#[test]
fn test_language_selects_message() {
    let vi = compute_chart_analysis(&sample(), "tình duyên", Language::Vi).unwrap();
    let en = compute_chart_analysis(&sample(), "tình duyên", Language::En).unwrap();
    assert_eq!(vi.category, IntentCategory::Love);
    assert_eq!(vi.messages, en.messages);
    assert_eq!(vi.message, vi.messages.vi);
    assert_eq!(en.message, en.messages.en);
}

#[test]
fn test_dump_categories_render_structures() {
    let relations = compute_chart_analysis(&sample(), "ten gods", Language::En).unwrap();
    assert!(relations.message.starts_with("Ten relations (Day Master Bính)"));

    let stars = compute_chart_analysis(&sample(), "stars", Language::En).unwrap();
    assert!(stars.message.starts_with("Stars:"));
    assert_eq!(stars.message.lines().count(), 12);
}

#[test]
fn test_invalid_chart_returns_bilingual_error() {
    let pillars = PillarInput::new("Giáp Tý", "Giáp Sửu", "Mậu Thìn", "Canh Ngọ");
    let err = assert_err!(compute_chart_analysis(&pillars, "", Language::Vi));
    let text = err.bilingual();
    assert!(text.vi.contains("Giáp Sửu"));
    assert!(text.en.contains("Giáp Sửu"));
    assert!(matches!(err, ChartError::InvalidPillar { .. }));
}

#[test]
fn test_analysis_serialises_camel_case() {
    let request = AnalysisRequest::new(sample(), "sức khỏe", Language::En);
    let json = serde_json::to_value(analyze(&request).unwrap()).unwrap();
    for key in ["elementShares", "elementWeights", "tenRelations", "stars", "message", "messages", "category", "chart"] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(json["category"], "health");
}

#[tokio::test]
async fn test_service_caches_results() {
    let cache = Arc::new(AnalysisCache::new(8));
    let service = AnalysisService::new(cache.clone());
    let request = AnalysisRequest::new(sample(), "tương lai", Language::Vi);

    let first = assert_ok!(service.analyze(&request).await);
    let second = assert_ok!(service.analyze(&request).await);
    assert_eq!(first, second);
    assert_eq!(cache.len().await, 1);
}
