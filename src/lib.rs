//! search-bench library
//!
//! Builds reproducible document corpora for search engine benchmarks and
//! times indexing and queries against them.
//!
//! # Features
//!
//! - Search term vocabularies and phrases injected into documents at a
//!   controlled term:doc ratio
//! - Facet fields with an exact number of distinct values
//! - Docsets saved as JSON so every benchmark runs on the same data
//! - Indexing and query timings against Solr, compiled into reports
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate and save a docset
//! search-bench generate --schema bench_schema.yaml --docset-id run1 \
//!   --output-dir data --num-docs 100000 --seed 999
//!
//! # Index it and time searches with and without facets
//! search-bench index --docset-id run1 --solr-url http://localhost:8983/solr/bench
//! search-bench search --docset-id run1 --label "no facets"
//! search-bench search --docset-id run1 --label "facets: color" --facet-field color
//!
//! # Report, averaging every label starting with "facets"
//! search-bench report --log benchmark_log.json --group "all facets=facets"
//! ```

pub mod args;
pub mod commands;

// Re-export the workspace crates for convenience
pub use bench_core as types;
pub use bench_docset as docset;
pub use bench_generator as generator;
pub use bench_runner as runner;
