//! Analysis Result Cache
//!
//! In-memory cache of finished analyses keyed by the literal request tuple, so
//! repeated questions about the same chart skip the engine and the delegate.

use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::engine::{AnalysisRequest, ChartAnalysis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey([u8; 32]);

impl CacheKey {
    /// Hash of the four pillars, the user text and the language, unit-separated.
    fn of(request: &AnalysisRequest) -> Self {
        let p = &request.pillars;
        let mut hasher = Sha256::new();
        for part in [
            p.gio.as_str(),
            p.ngay.as_str(),
            p.thang.as_str(),
            p.nam.as_str(),
            request.message.as_str(),
            request.language.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0x1f]);
        }
        Self(hasher.finalize().into())
    }
}

struct Entries {
    values: HashMap<CacheKey, ChartAnalysis>,
    order: VecDeque<CacheKey>,
}

/// Bounded cache holding at most one analysis per exact request.
pub struct AnalysisCache {
    entries: Arc<RwLock<Entries>>,
    capacity: usize,
}

impl AnalysisCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries {
                values: HashMap::new(),
                order: VecDeque::new(),
            })),
            capacity: capacity.max(1),
        }
    }

    pub async fn get(&self, request: &AnalysisRequest) -> Option<ChartAnalysis> {
        let entries = self.entries.read().await;
        entries.values.get(&CacheKey::of(request)).cloned()
    }

    /// Store an analysis, evicting the oldest entry once full.
    pub async fn insert(&self, request: &AnalysisRequest, analysis: ChartAnalysis) {
        let key = CacheKey::of(request);
        let mut entries = self.entries.write().await;
        if entries.values.insert(key, analysis).is_none() {
            entries.order.push_back(key);
        }
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.values.remove(&oldest);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.values.clear();
        entries.order.clear();
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(1024)
    }
}
