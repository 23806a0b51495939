//! Tứ Trụ (Four Pillars) chart analysis
//!
//! Symbolic analysis of a four-pillar sexagenary chart:
//! - Sexagenary cycle table and chart validation
//! - Weighted five-element tally with hidden stems
//! - Ten Relations relative to the Day Master
//! - Auxiliary star annotation
//! - Keyword intent classification with bilingual (vi/en) narration
//!
//! Plus the service around it: result cache, optional external delegate
//! with retry/backoff, rate limiting and an HTTP surface.

pub mod chart;
pub mod analysis;
pub mod narrative;
pub mod engine;
pub mod error;
pub mod config;
pub mod safety;
pub mod services;
pub mod server;
pub mod utils;

// Re-exports for convenience
pub use chart::{validate, Chart, PillarInput};
pub use engine::{analyze, compute_chart_analysis, AnalysisRequest, ChartAnalysis};
pub use error::{BilingualText, ChartError};
pub use narrative::Language;
