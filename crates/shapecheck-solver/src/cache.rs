//! Memoized conformance verdicts.
//!
//! Verdicts are pure functions of the two descriptions and the check mode, so
//! they are keyed by structural hashes rather than by identity. The cache is
//! an ordinary value owned by the caller; nothing is process-wide.

use crate::accessor::ComposedAccessor;
use crate::conformance::{CheckMode, ConformanceChecker};
use crate::describe::TypeDescription;
use crate::diagnostics::ConformanceError;
use crate::merge::DeclarationMerger;
use crate::namespace::Namespace;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct CacheKey {
    shape: u64,
    candidate: u64,
    mode: CheckMode,
}

/// Hit/miss counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Reentrant cache of check results.
#[derive(Debug, Default)]
pub struct ConformanceCache {
    verdicts: DashMap<CacheKey, Result<(), ConformanceError>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ConformanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The verdict for (shape, candidate, mode), computed at most once per key
    /// unless two threads race on the same miss.
    pub fn verdict(
        &self,
        shape: &TypeDescription,
        candidate: &TypeDescription,
        mode: CheckMode,
    ) -> Result<(), ConformanceError> {
        let key = CacheKey {
            shape: shape.structural_hash(),
            candidate: candidate.structural_hash(),
            mode,
        };
        if let Some(cached) = self.verdicts.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(shape = %shape.name(), candidate = %candidate.name(), ?mode, "cache hit");
            return cached.value().clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(shape = %shape.name(), candidate = %candidate.name(), ?mode, "cache miss");
        let verdict = ConformanceChecker::new(shape, candidate)
            .with_mode(mode)
            .check();
        self.verdicts.insert(key, verdict.clone());
        verdict
    }

    pub fn check_conformance(
        &self,
        shape: &TypeDescription,
        candidate: &TypeDescription,
    ) -> Result<ComposedAccessor, ConformanceError> {
        self.verdict(shape, candidate, CheckMode::Compose)?;
        Ok(ComposedAccessor::compose(shape, candidate))
    }

    pub fn merge_conformant(
        &self,
        shape: &TypeDescription,
        candidate: &TypeDescription,
    ) -> Result<Namespace, ConformanceError> {
        self.verdict(shape, candidate, CheckMode::Override)?;
        Ok(DeclarationMerger::new(shape, candidate).merge()?)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.verdicts.len(),
        }
    }

    pub fn clear(&self) {
        self.verdicts.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "../tests/cache_tests.rs"]
mod tests;
