//! Benchmark runs against a search engine.
//!
//! ```text
//! DocSet ──docs──► BenchmarkRunner ──add/commit/search──► SearchEngine (Solr)
//!                        │
//!                        ▼
//!                  BenchmarkLog ──compile_report──► Report
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bench_runner::{BenchmarkLog, BenchmarkMetadata, BenchmarkRunner, QueryParams, SolrClient};
//!
//! let engine = SolrClient::new("http://localhost:8983/solr/bench")?;
//! let mut runner = BenchmarkRunner::new(engine, BenchmarkLog::generate(BenchmarkMetadata::default()));
//! runner.index_docs(docset.docs()?, 1000).await?;
//! runner.run_searches(&terms, "no facets", &QueryParams::new(), 5, 1).await?;
//! println!("{}", runner.log().compile_report(&[])?);
//! ```

pub mod engine;
pub mod error;
pub mod log;
pub mod runner;
pub mod stats;

pub use engine::{QueryParams, SearchEngine, SearchResult, SolrClient, Timing};
pub use error::RunnerError;
pub use log::{BenchmarkLog, BenchmarkMetadata, IndexingReport, PhaseTimes, Report};
pub use runner::{BenchmarkRunner, SearchOutcome, MATCH_ALL_QUERY};
pub use stats::{round_to, IndexingStats, SearchStats, TermResult};
