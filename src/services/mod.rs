//! Services Module
//!
//! Collaborators around the engine: result cache, external delegate, and the
//! service that ties them together.

pub mod cache;
pub mod delegate;
pub mod analysis;

pub use analysis::{AnalysisService, AnalysisSource};
pub use cache::AnalysisCache;
pub use delegate::{AnalysisDelegate, HttpDelegate, RetryPolicy, RetryingDelegate};
