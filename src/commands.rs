//! Implementations behind each CLI subcommand.

use crate::args::{
    DocsetOpts, FacetCountsArgs, GenerateArgs, IndexArgs, ReportArgs, SearchArgs, SolrOpts,
};
use anyhow::{anyhow, bail, Context};
use bench_core::BenchSchemaConfig;
use bench_docset::{DocSet, FacetCounts, FileSet};
use bench_generator::BenchmarkSchema;
use bench_runner::{
    BenchmarkLog, BenchmarkMetadata, BenchmarkRunner, QueryParams, Report, SearchEngine,
    SolrClient,
};
use std::fmt::Write as _;
use std::time::Duration;
use tracing::info;

/// Generate a docset from a schema file and save it.
pub fn generate(args: &GenerateArgs) -> anyhow::Result<DocSet> {
    let config = BenchSchemaConfig::from_file(&args.schema)
        .with_context(|| format!("Failed to load schema from {:?}", args.schema))?;

    info!(
        "Generating {} docs for docset '{}' (seed={:?})",
        args.num_docs,
        args.docset.docset_id,
        args.seed.or(config.seed)
    );

    let mut schema = BenchmarkSchema::from_config(&config, args.seed)
        .context("Failed to build benchmark schema")?;
    schema
        .set_num_docs(args.num_docs)
        .context("Failed to size benchmark schema")?;

    let mut docset = DocSet::from_schema(
        args.docset.docset_id.as_str(),
        schema,
        Some(args.docset.output_dir.as_path()),
    )
    .with_context(|| format!("Failed to prepare docset in {:?}", args.docset.output_dir))?;

    let mut written = 0usize;
    for doc in docset.docs()? {
        doc.with_context(|| format!("Failed to generate document {}", written + 1))?;
        written += 1;
    }

    info!(
        "Docset '{}' saved to {:?}: {} docs",
        args.docset.docset_id, args.docset.output_dir, written
    );
    Ok(docset)
}

/// Saved facet value counts, filtered and truncated per the arguments.
pub fn facet_counts(args: &FacetCountsArgs) -> anyhow::Result<FacetCounts> {
    let fileset = FileSet::new(&args.docset.output_dir, args.docset.docset_id.as_str());
    let mut counts = fileset
        .facet_value_counts()?
        .ok_or_else(|| anyhow!("No facet counts saved for docset '{}'", args.docset.docset_id))?;

    if !args.fields.is_empty() {
        for field in &args.fields {
            if !counts.contains_key(field) {
                bail!("Docset '{}' has no facet field '{field}'", args.docset.docset_id);
            }
        }
        counts.retain(|name, _| args.fields.contains(name));
    }
    if let Some(top) = args.top {
        for ranking in counts.values_mut() {
            ranking.truncate(top);
        }
    }
    Ok(counts)
}

/// Render facet counts as one block per field.
pub fn format_facet_counts(counts: &FacetCounts) -> String {
    let mut out = String::new();
    for (field, ranking) in counts {
        let _ = writeln!(out, "{field} ({} values)", ranking.len());
        for (value, count) in ranking {
            let _ = writeln!(out, "  {count:>8}  {value}");
        }
    }
    out
}

fn solr_client(opts: &SolrOpts) -> anyhow::Result<SolrClient> {
    SolrClient::with_timeout(&opts.solr_url, Duration::from_secs(opts.timeout_secs))
        .with_context(|| format!("Failed to create Solr client for {}", opts.solr_url))
}

fn load_docset(args: &DocsetOpts) -> anyhow::Result<DocSet> {
    DocSet::from_fileset(FileSet::new(&args.output_dir, args.docset_id.as_str())).with_context(
        || {
            format!(
                "Failed to load docset '{}' from {:?}",
                args.docset_id, args.output_dir
            )
        },
    )
}

/// Index a saved docset into Solr and write a new benchmark log.
pub async fn index(args: &IndexArgs) -> anyhow::Result<BenchmarkLog> {
    index_with(solr_client(&args.solr)?, args).await
}

/// Index a saved docset into `engine` and write a new benchmark log.
pub async fn index_with<E: SearchEngine>(engine: E, args: &IndexArgs) -> anyhow::Result<BenchmarkLog> {
    let mut docset = load_docset(&args.docset)?;

    let metadata = BenchmarkMetadata {
        solr_version: args.solr_version.clone(),
        collection_size: docset.total_docs().map(|n| n.to_string()),
        notes: args.notes.clone(),
        ..Default::default()
    };
    let mut log = BenchmarkLog::generate(metadata);
    if let Some(test_id) = &args.test_id {
        log.test_id = test_id.clone();
    }
    info!("Benchmark '{}': indexing docset '{}'", log.test_id, docset.id());

    let mut runner = BenchmarkRunner::new(engine, log);
    runner
        .index_docs(docset.docs()?, args.batch_size)
        .await
        .context("Indexing failed")?;

    let log = runner.into_log();
    log.save(&args.log)
        .with_context(|| format!("Failed to save benchmark log to {:?}", args.log))?;
    Ok(log)
}

/// Parse a `key=value` query parameter.
pub fn parse_param(raw: &str) -> anyhow::Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid parameter '{raw}': expected key=value"))?;
    if key.is_empty() {
        bail!("Invalid parameter '{raw}': empty key");
    }
    Ok((key.to_string(), value.to_string()))
}

/// Time every search term of a saved docset against Solr.
pub async fn search(args: &SearchArgs) -> anyhow::Result<BenchmarkLog> {
    search_with(solr_client(&args.solr)?, args).await
}

/// Time the blank query and every search term of a saved docset against
/// `engine`, adding the results to the benchmark log under the label.
pub async fn search_with<E: SearchEngine>(engine: E, args: &SearchArgs) -> anyhow::Result<BenchmarkLog> {
    let docset = load_docset(&args.docset)?;

    let mut terms = vec![String::new()];
    terms.extend(docset.search_terms().unwrap_or_default().iter().cloned());

    let mut params = if args.facet_fields.is_empty() {
        QueryParams::new()
    } else {
        QueryParams::facets(&args.facet_fields)
    };
    for raw in &args.params {
        let (key, value) = parse_param(raw)?;
        params.push(key, value);
    }

    let log = if args.log.exists() {
        BenchmarkLog::load(&args.log)
            .with_context(|| format!("Failed to load benchmark log from {:?}", args.log))?
    } else {
        BenchmarkLog::generate(BenchmarkMetadata::default())
    };

    let mut runner = BenchmarkRunner::new(engine, log);
    runner
        .run_searches(&terms, &args.label, &params, args.rep_n, args.ignore_n)
        .await
        .with_context(|| format!("Searches for '{}' failed", args.label))?;

    let log = runner.into_log();
    log.save(&args.log)
        .with_context(|| format!("Failed to save benchmark log to {:?}", args.log))?;
    Ok(log)
}

/// Resolve a `NAME=prefix` group against the labels recorded in `log`.
pub fn parse_group(raw: &str, log: &BenchmarkLog) -> anyhow::Result<(String, Vec<String>)> {
    let (name, prefix) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid group '{raw}': expected NAME=prefix"))?;
    let labels: Vec<String> = log
        .search_stats
        .keys()
        .filter(|label| label.starts_with(prefix))
        .cloned()
        .collect();
    if labels.is_empty() {
        bail!("Group '{name}' matches no search labels with prefix '{prefix}'");
    }
    Ok((name.to_string(), labels))
}

/// Compile the report for a saved benchmark log.
pub fn report(args: &ReportArgs) -> anyhow::Result<Report> {
    let log = BenchmarkLog::load(&args.log)
        .with_context(|| format!("Failed to load benchmark log from {:?}", args.log))?;
    let groups = args
        .groups
        .iter()
        .map(|raw| parse_group(raw, &log))
        .collect::<anyhow::Result<Vec<_>>>()?;
    log.compile_report(&groups).context("Failed to compile report")
}
