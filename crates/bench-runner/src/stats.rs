//! Timing summaries for indexing and search runs.

use serde::{Deserialize, Serialize};

/// Decimal places kept for indexing times, in seconds.
pub const INDEXING_PLACES: i32 = 6;

/// Decimal places kept for query times, in milliseconds.
pub const SEARCH_PLACES: i32 = 4;

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Per-batch add and commit timings for one indexing run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexingStats {
    pub batch_size: usize,
    pub total_docs: usize,
    pub indexing_timings_secs: Vec<f64>,
    pub indexing_total_secs: f64,
    pub indexing_average_secs: f64,
    pub commit_timings_secs: Vec<f64>,
    pub commit_total_secs: f64,
    pub commit_average_secs: f64,
    /// Add plus commit time.
    pub total_secs: f64,
    /// Add plus commit time per batch.
    pub average_secs: f64,
}

impl IndexingStats {
    pub fn compile(
        batch_size: usize,
        total_docs: usize,
        indexing_timings_secs: Vec<f64>,
        commit_timings_secs: Vec<f64>,
    ) -> Self {
        let indexing_total_secs =
            round_to(indexing_timings_secs.iter().sum(), INDEXING_PLACES);
        let commit_total_secs = round_to(commit_timings_secs.iter().sum(), INDEXING_PLACES);
        let total_secs = round_to(indexing_total_secs + commit_total_secs, INDEXING_PLACES);
        let batches = indexing_timings_secs.len().max(commit_timings_secs.len());
        let average_secs = if batches == 0 {
            0.0
        } else {
            round_to(total_secs / batches as f64, INDEXING_PLACES)
        };

        Self {
            batch_size,
            total_docs,
            indexing_average_secs: round_to(mean(&indexing_timings_secs), INDEXING_PLACES),
            commit_average_secs: round_to(mean(&commit_timings_secs), INDEXING_PLACES),
            indexing_timings_secs,
            indexing_total_secs,
            commit_timings_secs,
            commit_total_secs,
            total_secs,
            average_secs,
        }
    }

    pub fn num_batches(&self) -> usize {
        self.indexing_timings_secs.len()
    }
}

/// Result of one search term within a labelled run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermResult {
    /// The term as given; empty for the blank (match-all) query.
    pub term: String,
    /// Hits from the first counted repetition.
    pub hits: Option<u64>,
    pub qtime_ms: f64,
}

impl TermResult {
    pub fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }
}

/// Query times for every term of one labelled run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    pub total_qtime_ms: f64,
    pub avg_qtime_ms: f64,
    pub term_results: Vec<TermResult>,
}

impl SearchStats {
    pub fn compile(term_results: Vec<TermResult>) -> Self {
        let qtimes: Vec<f64> = term_results.iter().map(|r| r.qtime_ms).collect();
        Self {
            total_qtime_ms: round_to(qtimes.iter().sum(), SEARCH_PLACES),
            avg_qtime_ms: round_to(mean(&qtimes), SEARCH_PLACES),
            term_results,
        }
    }

    /// The blank query's result, if one was run.
    pub fn blank(&self) -> Option<&TermResult> {
        self.term_results.iter().find(|r| r.is_blank())
    }
}
