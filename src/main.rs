//! Command-line interface for search-bench
//!
//! # Usage Examples
//!
//! ```bash
//! # Generate 10,000 documents from a schema
//! search-bench generate --schema bench_schema.yaml --docset-id run1 --num-docs 10000
//!
//! # Show the ten most frequent values of each facet field
//! search-bench facet-counts --docset-id run1 --top 10
//!
//! # Index into Solr in batches of 1000, then time every search term
//! search-bench index --docset-id run1 --batch-size 1000
//! search-bench search --docset-id run1 --label "facets" --facet-field color --rep-n 5 --ignore-n 1
//!
//! # Compile the report
//! search-bench report --log benchmark_log.json
//! ```

use clap::{Parser, Subcommand};
use search_bench::args::{FacetCountsArgs, GenerateArgs, IndexArgs, ReportArgs, SearchArgs};
use search_bench::commands;

#[derive(Parser)]
#[command(name = "search-bench")]
#[command(about = "Generate search benchmark corpora and time Solr indexing and queries")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a docset from a schema and save it
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },

    /// Show facet value counts of a saved docset
    FacetCounts {
        #[command(flatten)]
        args: FacetCountsArgs,
    },

    /// Index a saved docset into Solr, timing each batch
    Index {
        #[command(flatten)]
        args: IndexArgs,
    },

    /// Time the docset's search terms against Solr
    Search {
        #[command(flatten)]
        args: SearchArgs,
    },

    /// Compile a report from a benchmark log
    Report {
        #[command(flatten)]
        args: ReportArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { args } => {
            let docset = commands::generate(&args)?;
            if let Some(counts) = docset.facet_value_counts() {
                print!("{}", commands::format_facet_counts(counts));
            }
        }
        Commands::FacetCounts { args } => {
            let counts = commands::facet_counts(&args)?;
            print!("{}", commands::format_facet_counts(&counts));
        }
        Commands::Index { args } => {
            let log = commands::index(&args).await?;
            if let Some(stats) = &log.indexing_stats {
                println!(
                    "Indexed {} docs in {} batches: {:.6}s",
                    stats.total_docs,
                    stats.num_batches(),
                    stats.total_secs
                );
            }
        }
        Commands::Search { args } => {
            let log = commands::search(&args).await?;
            if let Some(stats) = log.search_stats.get(&args.label) {
                println!(
                    "{}: {} searches, {:.4} ms average",
                    args.label,
                    stats.term_results.len(),
                    stats.avg_qtime_ms
                );
            }
        }
        Commands::Report { args } => {
            let report = commands::report(&args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
    }

    Ok(())
}
