//! Analysis Service
//!
//! Read-through cache around the engine, with an optional external delegate
//! tried before the local engine. The engine is the unconditional fallback.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::AnalysisCache;
use super::delegate::AnalysisDelegate;
use crate::chart::Chart;
use crate::engine::{analyze, AnalysisRequest, ChartAnalysis};
use crate::error::ChartError;

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Cache,
    Delegate,
    Engine,
}

pub struct AnalysisService {
    cache: Arc<AnalysisCache>,
    delegate: Option<Arc<dyn AnalysisDelegate>>,
}

impl AnalysisService {
    pub fn new(cache: Arc<AnalysisCache>) -> Self {
        Self { cache, delegate: None }
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn AnalysisDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn cache(&self) -> &Arc<AnalysisCache> {
        &self.cache
    }

    /// Analyse a request. Invalid pillars fail before the cache or delegate are touched.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<ChartAnalysis, ChartError> {
        self.analyze_traced(request).await.map(|(analysis, _)| analysis)
    }

    pub async fn analyze_traced(
        &self,
        request: &AnalysisRequest,
    ) -> Result<(ChartAnalysis, AnalysisSource), ChartError> {
        let chart = Chart::try_from(&request.pillars)?;

        if let Some(cached) = self.cache.get(request).await {
            debug!("Analysis cache hit");
            return Ok((cached, AnalysisSource::Cache));
        }

        let (analysis, source) = match self.delegated(request, &chart).await {
            Some(analysis) => (analysis, AnalysisSource::Delegate),
            None => (analyze(request)?, AnalysisSource::Engine),
        };

        self.cache.insert(request, analysis.clone()).await;
        Ok((analysis, source))
    }

    async fn delegated(&self, request: &AnalysisRequest, chart: &Chart) -> Option<ChartAnalysis> {
        let delegate = self.delegate.as_ref()?;
        match delegate.analyze(request).await {
            Ok(analysis) if analysis.chart != *chart => {
                warn!("Delegate answered for chart {:?}, falling back to local engine", analysis.chart);
                None
            }
            Ok(analysis) => {
                info!("Analysis served by external delegate");
                Some(analysis)
            }
            Err(e) => {
                warn!("Delegate unavailable, falling back to local engine: {:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::PillarInput;
    use crate::narrative::Language;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingDelegate {
        calls: AtomicU32,
        fail: bool,
    }

    /// Answers every request with the analysis of a fixed, unrelated chart.
    struct StaleDelegate;

    #[async_trait]
    impl AnalysisDelegate for StaleDelegate {
        async fn analyze(&self, _request: &AnalysisRequest) -> Result<ChartAnalysis> {
            let mut analysis = analyze(&request("Nhâm Thân"))?;
            analysis.message = "remote".to_string();
            Ok(analysis)
        }
    }

    #[async_trait]
    impl AnalysisDelegate for CountingDelegate {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<ChartAnalysis> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("remote down");
            }
            let mut analysis = analyze(request)?;
            analysis.message = "remote".to_string();
            Ok(analysis)
        }
    }

    fn request(day: &str) -> AnalysisRequest {
        AnalysisRequest::new(
            PillarInput::new("Giáp Tý", day, "Mậu Thìn", "Canh Ngọ"),
            "sự nghiệp",
            Language::Vi,
        )
    }

    #[tokio::test]
    async fn test_engine_then_cache() {
        let service = AnalysisService::new(Arc::new(AnalysisCache::new(4)));
        let req = request("Bính Dần");
        let (first, source) = service.analyze_traced(&req).await.unwrap();
        assert_eq!(source, AnalysisSource::Engine);
        let (second, source) = service.analyze_traced(&req).await.unwrap();
        assert_eq!(source, AnalysisSource::Cache);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_delegate_preferred_when_healthy() {
        let delegate = Arc::new(CountingDelegate { calls: AtomicU32::new(0), fail: false });
        let service = AnalysisService::new(Arc::new(AnalysisCache::new(4))).with_delegate(delegate.clone());
        let (analysis, source) = service.analyze_traced(&request("Bính Dần")).await.unwrap();
        assert_eq!(source, AnalysisSource::Delegate);
        assert_eq!(analysis.message, "remote");
        assert_eq!(delegate.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_falls_back_when_delegate_fails() {
        let delegate = Arc::new(CountingDelegate { calls: AtomicU32::new(0), fail: true });
        let service = AnalysisService::new(Arc::new(AnalysisCache::new(4))).with_delegate(delegate.clone());
        let (analysis, source) = service.analyze_traced(&request("Bính Dần")).await.unwrap();
        assert_eq!(source, AnalysisSource::Engine);
        assert_ne!(analysis.message, "remote");
    }

    #[tokio::test]
    async fn test_invalid_input_skips_delegate_and_cache() {
        let delegate = Arc::new(CountingDelegate { calls: AtomicU32::new(0), fail: false });
        let service = AnalysisService::new(Arc::new(AnalysisCache::new(4))).with_delegate(delegate.clone());
        let err = service.analyze(&request("Giáp Sửu")).await.unwrap_err();
        assert!(matches!(err, ChartError::InvalidPillar { .. }));
        assert_eq!(delegate.calls.load(Ordering::SeqCst), 0);
        assert!(service.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_delegate_answer_for_other_chart_is_discarded() {
        let service = AnalysisService::new(Arc::new(AnalysisCache::new(4))).with_delegate(Arc::new(StaleDelegate));
        let req = request("Bính Dần");
        let (analysis, source) = service.analyze_traced(&req).await.unwrap();
        assert_eq!(source, AnalysisSource::Engine);
        assert_eq!(analysis, analyze(&req).unwrap());
    }
}
