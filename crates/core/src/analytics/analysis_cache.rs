//! Concurrent cache of successful analysis results.

use dashmap::DashMap;
use log::debug;

use super::AnalysisResult;
use crate::snapshot::{PortfolioSnapshot, ReturnSeries};

/// Identifies one analysis: same snapshot content, window and benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub snapshot_hash: String,
    pub timeframe_days: u32,
    pub benchmark: Option<String>,
}

impl CacheKey {
    pub fn new(
        snapshot: &PortfolioSnapshot,
        benchmark: Option<&ReturnSeries>,
        timeframe_days: u32,
    ) -> Self {
        Self {
            snapshot_hash: snapshot.content_hash(),
            timeframe_days,
            benchmark: benchmark.map(ReturnSeries::fingerprint),
        }
    }
}

/// Bounded result cache. When full it is cleared rather than evicting
/// individual entries.
pub struct AnalysisCache {
    entries: DashMap<CacheKey, AnalysisResult>,
    max_entries: usize,
}

impl AnalysisCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<AnalysisResult> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Stores a result. Failed analyses are never cached.
    pub fn insert(&self, key: CacheKey, result: &AnalysisResult) {
        if !result.success {
            return;
        }
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&key) {
            debug!("Analysis cache full ({} entries), clearing", self.entries.len());
            self.entries.clear();
        }
        self.entries.insert(key, result.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
