//! Benchmark test log: metadata plus every stat a run records, and the
//! report compiled from it.

use crate::error::RunnerError;
use crate::stats::{round_to, IndexingStats, SearchStats, SEARCH_PLACES};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Free-form details about the environment a benchmark ran in.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BenchmarkMetadata {
    pub solr_version: Option<String>,
    pub solr_caches: Option<String>,
    pub solr_conf: Option<String>,
    pub solr_schema: Option<String>,
    pub os: Option<String>,
    pub os_memory: Option<String>,
    pub jvm_memory: Option<String>,
    pub jvm_settings: Option<String>,
    pub collection_size: Option<String>,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Everything recorded for one benchmark test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkLog {
    pub test_id: String,
    pub metadata: BenchmarkMetadata,
    pub indexing_stats: Option<IndexingStats>,
    /// Search stats keyed by run label.
    pub search_stats: BTreeMap<String, SearchStats>,
}

impl BenchmarkLog {
    pub fn new(test_id: impl Into<String>, metadata: BenchmarkMetadata) -> Self {
        Self {
            test_id: test_id.into(),
            metadata,
            indexing_stats: None,
            search_stats: BTreeMap::new(),
        }
    }

    /// A log with a random test id, stamped with the current time.
    pub fn generate(mut metadata: BenchmarkMetadata) -> Self {
        metadata.started_at.get_or_insert_with(Utc::now);
        Self::new(uuid::Uuid::new_v4().to_string(), metadata)
    }

    /// Drop all recorded stats.
    pub fn reset(&mut self) {
        self.indexing_stats = None;
        self.search_stats.clear();
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RunnerError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        info!("Saved benchmark log '{}' to {}", self.test_id, path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Summarize indexing totals and query times.
    ///
    /// Each entry of `aggregate_groups` names a group and the labels it
    /// averages over: the blank query times of those labels, and every term
    /// query time from them together.
    pub fn compile_report(
        &self,
        aggregate_groups: &[(String, Vec<String>)],
    ) -> Result<Report, RunnerError> {
        let indexing = self.indexing_stats.as_ref().map(|stats| IndexingReport {
            batch_size: stats.batch_size,
            add: PhaseTimes {
                total_secs: stats.indexing_total_secs,
                average_secs: stats.indexing_average_secs,
            },
            commit: PhaseTimes {
                total_secs: stats.commit_total_secs,
                average_secs: stats.commit_average_secs,
            },
            indexing: PhaseTimes {
                total_secs: stats.total_secs,
                average_secs: stats.average_secs,
            },
        });

        let mut search_blank = BTreeMap::new();
        let mut search_all_terms = BTreeMap::new();
        for (label, stats) in &self.search_stats {
            if let Some(blank) = stats.blank() {
                search_blank.insert(label.clone(), blank.qtime_ms);
            }
            search_all_terms.insert(label.clone(), stats.avg_qtime_ms);
        }

        for (group, labels) in aggregate_groups {
            let mut blank_tally = Vec::new();
            let mut term_tally = Vec::new();
            for label in labels {
                let stats = self
                    .search_stats
                    .get(label)
                    .ok_or_else(|| RunnerError::UnknownLabel(label.clone()))?;
                if let Some(blank) = stats.blank() {
                    blank_tally.push(blank.qtime_ms);
                }
                term_tally.extend(stats.term_results.iter().map(|r| r.qtime_ms));
            }
            if let Some(avg) = average(&blank_tally) {
                search_blank.insert(group.clone(), avg);
            }
            if let Some(avg) = average(&term_tally) {
                search_all_terms.insert(group.clone(), avg);
            }
        }

        Ok(Report {
            test_id: self.test_id.clone(),
            indexing,
            search_blank,
            search_all_terms,
        })
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(round_to(
        values.iter().sum::<f64>() / values.len() as f64,
        SEARCH_PLACES,
    ))
}

/// Total and per-batch time of one indexing phase, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimes {
    pub total_secs: f64,
    pub average_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexingReport {
    pub batch_size: usize,
    pub add: PhaseTimes,
    pub commit: PhaseTimes,
    pub indexing: PhaseTimes,
}

/// Compiled benchmark report. Query times are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub test_id: String,
    pub indexing: Option<IndexingReport>,
    pub search_blank: BTreeMap<String, f64>,
    pub search_all_terms: BTreeMap<String, f64>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Benchmark {}", self.test_id)?;
        if let Some(indexing) = &self.indexing {
            let avg_label = format!("avg per {} docs", indexing.batch_size);
            for (name, times) in [
                ("ADD", indexing.add),
                ("COMMIT", indexing.commit),
                ("INDEXING", indexing.indexing),
            ] {
                writeln!(f, "{name}")?;
                writeln!(f, "  {:<24} {:.6} s", "total", times.total_secs)?;
                writeln!(f, "  {:<24} {:.6} s", avg_label, times.average_secs)?;
            }
        }
        writeln!(f, "SEARCH")?;
        for (name, rows) in [("BLANK", &self.search_blank), ("ALL TERMS", &self.search_all_terms)] {
            writeln!(f, "  {name}")?;
            for (label, qtime) in rows {
                writeln!(f, "    {:<22} {:.4} ms", label, qtime)?;
            }
        }
        Ok(())
    }
}
