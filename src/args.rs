//! CLI argument definitions.

use clap::Args;
use std::path::PathBuf;

/// Where a docset lives on disk.
#[derive(Args, Clone, Debug)]
pub struct DocsetOpts {
    /// Identifier used as the prefix of the docset's files
    #[arg(long, env = "SEARCH_BENCH_DOCSET_ID")]
    pub docset_id: String,

    /// Directory holding the docset files
    #[arg(long, short = 'o', default_value = "data", env = "SEARCH_BENCH_DATA_DIR")]
    pub output_dir: PathBuf,
}

/// Solr connection options.
#[derive(Args, Clone, Debug)]
pub struct SolrOpts {
    /// Solr collection URL
    #[arg(
        long,
        default_value = "http://localhost:8983/solr/bench",
        env = "SOLR_URL"
    )]
    pub solr_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "60")]
    pub timeout_secs: u64,
}

/// Arguments for `generate`.
#[derive(Args, Clone, Debug)]
pub struct GenerateArgs {
    /// Path to schema YAML file
    #[arg(long, short = 's')]
    pub schema: PathBuf,

    #[command(flatten)]
    pub docset: DocsetOpts,

    /// Number of documents to generate
    #[arg(long, default_value = "1000")]
    pub num_docs: usize,

    /// Random seed, overriding the schema's (same seed = same data)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Arguments for `facet-counts`.
#[derive(Args, Clone, Debug)]
pub struct FacetCountsArgs {
    #[command(flatten)]
    pub docset: DocsetOpts,

    /// Only show these facet fields (comma-separated, empty = all)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Show at most this many values per field
    #[arg(long)]
    pub top: Option<usize>,
}

/// Arguments for `index`.
#[derive(Args, Clone, Debug)]
pub struct IndexArgs {
    #[command(flatten)]
    pub docset: DocsetOpts,

    #[command(flatten)]
    pub solr: SolrOpts,

    /// Documents per add + commit
    #[arg(long, default_value = "1000")]
    pub batch_size: usize,

    /// Benchmark log file to create
    #[arg(long, default_value = "benchmark_log.json")]
    pub log: PathBuf,

    /// Test id for the log (random when omitted)
    #[arg(long)]
    pub test_id: Option<String>,

    /// Solr version, recorded in the log metadata
    #[arg(long)]
    pub solr_version: Option<String>,

    /// Free-form notes, recorded in the log metadata
    #[arg(long)]
    pub notes: Option<String>,
}

/// Arguments for `search`.
#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub docset: DocsetOpts,

    #[command(flatten)]
    pub solr: SolrOpts,

    /// Label the results are recorded under
    #[arg(long)]
    pub label: String,

    /// Times each query runs
    #[arg(long, default_value = "5")]
    pub rep_n: usize,

    /// Leading repetitions excluded as warm-up
    #[arg(long, default_value = "1")]
    pub ignore_n: usize,

    /// Facet fields to request with every query
    #[arg(long = "facet-field")]
    pub facet_fields: Vec<String>,

    /// Extra query parameters (format: key=value)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Benchmark log file to add results to (created when missing)
    #[arg(long, default_value = "benchmark_log.json")]
    pub log: PathBuf,
}

/// Arguments for `report`.
#[derive(Args, Clone, Debug)]
pub struct ReportArgs {
    /// Benchmark log file
    #[arg(long)]
    pub log: PathBuf,

    /// Aggregate group over every label starting with a prefix
    /// (format: NAME=prefix)
    #[arg(long = "group", value_name = "NAME=PREFIX")]
    pub groups: Vec<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}
