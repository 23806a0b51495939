//! External Analysis Delegate
//!
//! An out-of-process service that may answer instead of the local engine.
//! `RetryingDelegate` bounds every attempt with a timeout and retries
//! sequentially with exponential backoff.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::engine::{AnalysisRequest, ChartAnalysis};

#[async_trait]
pub trait AnalysisDelegate: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ChartAnalysis>;
}

/// Delegate that posts the request as JSON to a remote endpoint.
pub struct HttpDelegate {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpDelegate {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
            api_key,
        }
    }
}

#[async_trait]
impl AnalysisDelegate for HttpDelegate {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ChartAnalysis> {
        let mut call = self.client.post(&self.url).json(request);
        if let Some(ref key) = self.api_key {
            call = call.bearer_auth(key);
        }

        let res = call.send().await?.error_for_status()?;
        let analysis: ChartAnalysis = res
            .json()
            .await
            .context("Failed to parse analysis from delegate response")?;
        Ok(analysis)
    }
}

/// Retry policy for a wrapped delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay slept after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_millis(8000),
            base_delay: Duration::from_millis(250),
        }
    }
}

/// Wraps a delegate with per-attempt timeouts and sequential retries.
pub struct RetryingDelegate {
    inner: Arc<dyn AnalysisDelegate>,
    policy: RetryPolicy,
}

impl RetryingDelegate {
    pub fn new(inner: Arc<dyn AnalysisDelegate>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl AnalysisDelegate for RetryingDelegate {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<ChartAnalysis> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            debug!("Delegate attempt {}/{}", attempt, attempts);
            match tokio::time::timeout(self.policy.attempt_timeout, self.inner.analyze(request)).await {
                Ok(Ok(analysis)) => return Ok(analysis),
                Ok(Err(e)) => {
                    warn!("Delegate attempt {} failed: {}", attempt, e);
                    last_error = Some(e);
                }
                Err(_) => {
                    warn!("Delegate attempt {} timed out after {:?}", attempt, self.policy.attempt_timeout);
                    last_error = Some(anyhow::anyhow!(
                        "delegate attempt timed out after {:?}",
                        self.policy.attempt_timeout
                    ));
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.policy.delay_after(attempt)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("delegate made no attempts"))
            .context(format!("delegate failed after {} attempts", attempts)))
    }
}
