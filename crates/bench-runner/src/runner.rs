//! Runs indexing and search timings against a [`SearchEngine`].

use crate::engine::{QueryParams, SearchEngine};
use crate::error::RunnerError;
use crate::log::BenchmarkLog;
use crate::stats::{round_to, IndexingStats, SearchStats, TermResult, SEARCH_PLACES};
use bench_core::Document;
use tracing::{debug, info};

/// Query sent for a blank search term.
pub const MATCH_ALL_QUERY: &str = "*:*";

/// Canonical outcome of a repeated search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Hits from the first counted repetition.
    pub hits: Option<u64>,
    /// Mean query time over the counted repetitions.
    pub qtime_ms: f64,
}

/// Drives a search engine and records timings in a [`BenchmarkLog`].
pub struct BenchmarkRunner<E> {
    engine: E,
    log: BenchmarkLog,
}

impl<E: SearchEngine> BenchmarkRunner<E> {
    pub fn new(engine: E, log: BenchmarkLog) -> Self {
        Self { engine, log }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn log(&self) -> &BenchmarkLog {
        &self.log
    }

    pub fn into_log(self) -> BenchmarkLog {
        self.log
    }

    /// Add `docs` in batches of `batch_size`, committing after each batch.
    ///
    /// Replaces the log's indexing stats.
    pub async fn index_docs<I, Err>(
        &mut self,
        docs: I,
        batch_size: usize,
    ) -> Result<&IndexingStats, RunnerError>
    where
        I: IntoIterator<Item = Result<Document, Err>>,
        RunnerError: From<Err>,
    {
        if batch_size == 0 {
            return Err(RunnerError::InvalidBatchSize);
        }

        let mut docs = docs.into_iter();
        let mut indexing = Vec::new();
        let mut commits = Vec::new();
        let mut total_docs = 0usize;
        let mut batch = Vec::with_capacity(batch_size);

        loop {
            batch.clear();
            for doc in docs.by_ref().take(batch_size) {
                batch.push(doc?);
            }
            if batch.is_empty() {
                break;
            }

            debug!(
                "Indexing {} to {}",
                total_docs,
                total_docs + batch.len() - 1
            );
            let added = self.engine.add(&batch).await?;
            let committed = self.engine.commit().await?;
            debug!(
                "Batch of {}: add {} ms, commit {} ms",
                batch.len(),
                added.qtime_ms,
                committed.qtime_ms
            );

            indexing.push(added.secs());
            commits.push(committed.secs());
            total_docs += batch.len();
        }

        let stats = IndexingStats::compile(batch_size, total_docs, indexing, commits);
        info!(
            "Indexed {} docs in {} batches: {:.6}s total",
            stats.total_docs,
            stats.num_batches(),
            stats.total_secs
        );
        Ok(self.log.indexing_stats.insert(stats))
    }

    /// Run `q` `rep_n` times, ignoring the first `ignore_n` as warm-up.
    ///
    /// A blank `q` becomes the match-all query.
    pub async fn search(
        &self,
        q: &str,
        params: &QueryParams,
        rep_n: usize,
        ignore_n: usize,
    ) -> Result<SearchOutcome, RunnerError> {
        if rep_n <= ignore_n {
            return Err(RunnerError::InvalidRepetitions { rep_n, ignore_n });
        }
        let query = if q.trim().is_empty() { MATCH_ALL_QUERY } else { q };

        let mut hits = None;
        let mut qtimes = Vec::with_capacity(rep_n - ignore_n);
        for i in 0..rep_n {
            let result = self.engine.search(query, params).await?;
            if i < ignore_n {
                continue;
            }
            hits.get_or_insert(result.hits);
            qtimes.push(result.qtime_ms as f64);
        }

        let mean = qtimes.iter().sum::<f64>() / qtimes.len() as f64;
        Ok(SearchOutcome {
            hits,
            qtime_ms: round_to(mean, SEARCH_PLACES),
        })
    }

    /// Search every term and record the results under `label`.
    pub async fn run_searches(
        &mut self,
        terms: &[String],
        label: &str,
        params: &QueryParams,
        rep_n: usize,
        ignore_n: usize,
    ) -> Result<&SearchStats, RunnerError> {
        info!("{} ({} searches)", label, terms.len());

        let mut term_results = Vec::with_capacity(terms.len());
        for term in terms {
            let outcome = self.search(term, params, rep_n, ignore_n).await?;
            term_results.push(TermResult {
                term: term.clone(),
                hits: outcome.hits,
                qtime_ms: outcome.qtime_ms,
            });
        }

        let stats = SearchStats::compile(term_results);
        info!(
            "{}: {:.4} ms total, {:.4} ms average",
            label, stats.total_qtime_ms, stats.avg_qtime_ms
        );
        self.log.search_stats.insert(label.to_string(), stats);
        self.log
            .search_stats
            .get(label)
            .ok_or_else(|| RunnerError::UnknownLabel(label.to_string()))
    }
}
