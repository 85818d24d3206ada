//! Side-by-side scenario comparison: recompute the full liability under a
//! set of overrides and diff every breakdown line against the baseline.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Condvar, Mutex};

use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::calculations::TaxEngine;
use crate::error::EngineError;
use crate::models::{FinancialProfile, ScenarioComparison, ScenarioOverrides};

/// Computes the baseline and the overridden alternative and diffs them.
///
/// `diff` covers the union of both breakdown maps (a line missing on one
/// side counts as zero) and is signed alternative minus baseline, so a
/// negative entry means the alternative lowered that line. `savings` is
/// the opposite sign: positive when the alternative is cheaper overall.
pub fn compare(
    engine: &TaxEngine<'_>,
    baseline_profile: &FinancialProfile,
    overrides: &ScenarioOverrides,
) -> Result<ScenarioComparison, EngineError> {
    let baseline = engine.compute(baseline_profile)?;
    let alternative = engine.compute(&overrides.apply(baseline_profile))?;

    let keys: BTreeSet<&String> = baseline
        .breakdown
        .keys()
        .chain(alternative.breakdown.keys())
        .collect();

    let mut diff = BTreeMap::new();
    for key in keys {
        let before = baseline.breakdown.get(key).copied().unwrap_or_default();
        let after = alternative.breakdown.get(key).copied().unwrap_or_default();
        diff.insert(key.clone(), after - before);
    }

    let savings = baseline.total_tax - alternative.total_tax;
    Ok(ScenarioComparison {
        baseline,
        alternative,
        diff,
        savings,
    })
}

/// Caches comparisons keyed by a digest of the full input pair.
///
/// Each content hash is computed at most once: the first miss parks a
/// pending marker under the key and runs the computation outside the
/// lock, and later misses for the same key wait on the marker instead of
/// recomputing. A generation counter invalidates the whole cache at
/// once: `invalidate` bumps the generation, slots written under an older
/// generation are treated as misses, and a computation finishing under a
/// stale generation discards its result rather than storing it.
#[derive(Debug, Default)]
pub struct ScenarioCache {
    inner: Mutex<CacheInner>,
    completed: Condvar,
}

#[derive(Debug, Default)]
struct CacheInner {
    generation: u64,
    entries: HashMap<String, Slot>,
}

#[derive(Debug)]
enum Slot {
    Pending { generation: u64 },
    Done(CachedComparison),
}

impl Slot {
    fn generation(&self) -> u64 {
        match self {
            Slot::Pending { generation } => *generation,
            Slot::Done(cached) => cached.generation,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedComparison {
    generation: u64,
    comparison: ScenarioComparison,
}

impl ScenarioCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached comparison for this input pair, computing and
    /// storing it on a miss.
    pub fn compare(
        &self,
        engine: &TaxEngine<'_>,
        baseline_profile: &FinancialProfile,
        overrides: &ScenarioOverrides,
    ) -> Result<ScenarioComparison, EngineError> {
        let key = cache_key(baseline_profile, overrides);
        self.compute_or_wait(key, || compare(engine, baseline_profile, overrides))
    }

    /// Single-flight core: the first caller for a key computes, everyone
    /// else waits for its slot to complete.
    fn compute_or_wait(
        &self,
        key: String,
        compute: impl FnOnce() -> Result<ScenarioComparison, EngineError>,
    ) -> Result<ScenarioComparison, EngineError> {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        loop {
            let hit = match inner.entries.get(&key) {
                Some(Slot::Done(cached)) if cached.generation == inner.generation => {
                    Some(cached.comparison.clone())
                }
                Some(Slot::Pending { generation }) if *generation == inner.generation => None,
                // Vacant, or a slot left over from a previous generation.
                _ => break,
            };
            match hit {
                Some(comparison) => {
                    debug!(key = %key, "scenario cache hit");
                    return Ok(comparison);
                }
                None => {
                    inner = self
                        .completed
                        .wait(inner)
                        .unwrap_or_else(|poison| poison.into_inner());
                }
            }
        }

        let generation = inner.generation;
        inner.entries.retain(|_, slot| slot.generation() == generation);
        inner.entries.insert(key.clone(), Slot::Pending { generation });
        drop(inner);

        let result = compute();

        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        match &result {
            Ok(comparison) if inner.generation == generation => {
                inner.entries.insert(
                    key,
                    Slot::Done(CachedComparison {
                        generation,
                        comparison: comparison.clone(),
                    }),
                );
            }
            _ => {
                // Failed or superseded by invalidation: clear the marker so
                // waiters retry instead of parking forever.
                let still_ours = matches!(
                    inner.entries.get(&key),
                    Some(Slot::Pending { generation: marked }) if *marked == generation
                );
                if still_ours {
                    inner.entries.remove(&key);
                }
            }
        }
        drop(inner);
        self.completed.notify_all();

        result
    }

    /// Drops every cached result, e.g. after swapping year parameters.
    /// In-flight computations finish but their results are discarded.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner.generation += 1;
        inner.entries.clear();
        drop(inner);
        self.completed.notify_all();
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cache_key(profile: &FinancialProfile, overrides: &ScenarioOverrides) -> String {
    #[derive(Serialize)]
    struct KeyInput<'a> {
        profile: &'a FinancialProfile,
        overrides: &'a ScenarioOverrides,
    }

    let bytes = serde_json::to_vec(&KeyInput { profile, overrides })
        .unwrap_or_else(|_| format!("{profile:?}|{overrides:?}").into_bytes());
    hex::encode(Sha256::digest(&bytes))
}
