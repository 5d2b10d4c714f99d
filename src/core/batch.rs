use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::matcher::Matcher;
use crate::core::validation::MatchingError;
use crate::models::{CriteriaOverride, MatchingAlgorithmResult, Newsletter};

/// Default number of sources matched at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Per-source outcomes of a batch run, keyed by source newsletter id
pub type BatchResults = BTreeMap<String, Result<MatchingAlgorithmResult, MatchingError>>;

/// Runs the matcher for many source newsletters against one shared candidate pool
///
/// Each source is matched on the blocking thread pool, with at most
/// `max_concurrency` sources in flight. A failing source is reported in its own
/// entry and never cancels the others.
#[derive(Debug, Clone)]
pub struct BatchMatcher {
    matcher: Matcher,
    max_concurrency: usize,
    source_timeout: Option<Duration>,
}

impl BatchMatcher {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            matcher,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            source_timeout: None,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Give up on any single source that takes longer than `timeout`
    pub fn with_source_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Find matches for every source in `sources`
    ///
    /// `overrides` is merged over the matcher's default criteria. An invalid
    /// merged criteria set fails the whole call up front; everything else is
    /// reported per source. When a source id repeats, the later source wins.
    pub async fn batch_find_matches(
        &self,
        sources: Vec<Newsletter>,
        candidate_pool: impl Into<Arc<[Newsletter]>>,
        overrides: Option<CriteriaOverride>,
    ) -> Result<BatchResults, MatchingError> {
        let criteria = overrides
            .unwrap_or_default()
            .merge_over(&self.matcher.default_criteria());
        let criteria = self.matcher.weight_policy().apply(&criteria)?;

        let pool: Arc<[Newsletter]> = candidate_pool.into();
        let started = Instant::now();

        tracing::info!(
            "Starting batch: {} sources, {} candidates, concurrency {}",
            sources.len(),
            pool.len(),
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        let mut source_ids = Vec::with_capacity(sources.len());

        for (index, source) in sources.into_iter().enumerate() {
            source_ids.push(source.id.clone());

            let matcher = self.matcher.clone();
            let pool = Arc::clone(&pool);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.source_timeout;

            tasks.spawn(async move {
                let source_id = source.id.clone();

                let permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return (
                            index,
                            Err(MatchingError::TaskFailed {
                                source_id,
                                reason: e.to_string(),
                            }),
                        )
                    }
                };

                let worker = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    let deadline = timeout.map(|timeout| Instant::now() + timeout);
                    let no_filter = BTreeSet::new();
                    matcher.match_source(&source, &pool, &criteria, &no_filter, &no_filter, deadline)
                });

                let result = match worker.await {
                    Ok(result) => result,
                    Err(e) => Err(MatchingError::TaskFailed {
                        source_id,
                        reason: e.to_string(),
                    }),
                };

                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<MatchingAlgorithmResult, MatchingError>>> =
            vec![None; source_ids.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(result);
                    }
                }
                Err(e) => tracing::error!("Batch task aborted: {}", e),
            }
        }

        let mut results = BatchResults::new();
        for (source_id, slot) in source_ids.into_iter().zip(slots) {
            let result = slot.unwrap_or_else(|| {
                Err(MatchingError::TaskFailed {
                    source_id: source_id.clone(),
                    reason: "task aborted before reporting a result".to_string(),
                })
            });

            if let Err(e) = &result {
                tracing::warn!("Matching failed for source {}: {}", source_id, e);
            }

            results.insert(source_id, result);
        }

        tracing::info!(
            "Batch finished: {} sources in {:.2}ms",
            results.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(results)
    }
}
