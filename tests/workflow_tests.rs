//! End-to-end workflow: generate a docset from the fixture schema, inspect
//! its facet counts, index and search it with an in-memory engine, and
//! compile the report.

use async_trait::async_trait;
use search_bench::args::{
    DocsetOpts, FacetCountsArgs, GenerateArgs, IndexArgs, ReportArgs, SearchArgs, SolrOpts,
};
use search_bench::commands;
use search_bench::runner::{QueryParams, RunnerError, SearchEngine, SearchResult, Timing};
use search_bench::types::{Document, FieldValue};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/bench_schema.yaml")
}

fn docset_opts(dir: &Path, id: &str) -> DocsetOpts {
    DocsetOpts {
        docset_id: id.to_string(),
        output_dir: dir.to_path_buf(),
    }
}

fn generate(dir: &Path, id: &str, num_docs: usize, seed: Option<u64>) {
    commands::generate(&GenerateArgs {
        schema: fixture(),
        docset: docset_opts(dir, id),
        num_docs,
        seed,
    })
    .unwrap();
}

#[test]
fn test_generate_saves_docset() {
    let dir = TempDir::new().unwrap();
    let docset = commands::generate(&GenerateArgs {
        schema: fixture(),
        docset: docset_opts(dir.path(), "run1"),
        num_docs: 300,
        seed: None,
    })
    .unwrap();

    assert_eq!(docset.total_docs(), Some(300));
    // 20 words plus 6 + 3 + 1 phrases
    assert_eq!(docset.search_terms().unwrap().len(), 30);

    let counts = docset.facet_value_counts().unwrap();
    assert_eq!(counts["colors"].len(), 3);
    assert_eq!(counts["subject"].len(), 15);
    assert_eq!(
        counts["subject"].iter().map(|(_, n)| *n).sum::<u64>(),
        300
    );

    for suffix in ["terms", "docs", "counts"] {
        assert!(dir.path().join(format!("run1_{suffix}.json")).exists());
    }
}

#[test]
fn test_search_terms_reach_documents() {
    let dir = TempDir::new().unwrap();
    let docset = commands::generate(&GenerateArgs {
        schema: fixture(),
        docset: docset_opts(dir.path(), "run2"),
        num_docs: 400,
        seed: Some(7),
    })
    .unwrap();
    let terms: Vec<String> = docset.search_terms().unwrap().to_vec();

    let fileset = docset.fileset().unwrap();
    let mut found = HashSet::new();
    for doc in fileset.docs().unwrap() {
        let doc = doc.unwrap();
        for field in ["title", "notes", "colors_search"] {
            let text = match doc.get(field) {
                Some(FieldValue::Str(s)) => s.clone(),
                Some(FieldValue::List(items)) => items
                    .iter()
                    .filter_map(FieldValue::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => continue,
            };
            for term in &terms {
                if text.contains(term.as_str()) {
                    found.insert(term.clone());
                }
            }
        }
    }

    // Every term is used before any repeats, and 400 docs at 0.6 terms per
    // doc is far more than 30 injections
    assert_eq!(found.len(), terms.len());
}

#[test]
fn test_same_seed_same_files() {
    let dir = TempDir::new().unwrap();
    generate(dir.path(), "a", 120, Some(42));
    generate(dir.path(), "b", 120, Some(42));
    generate(dir.path(), "c", 120, Some(43));

    let read = |id: &str| std::fs::read_to_string(dir.path().join(format!("{id}_docs.json"))).unwrap();
    assert_eq!(read("a"), read("b"));
    assert_ne!(read("a"), read("c"));
}

#[test]
fn test_facet_counts_filter_and_top() {
    let dir = TempDir::new().unwrap();
    generate(dir.path(), "fc", 200, None);

    let counts = commands::facet_counts(&FacetCountsArgs {
        docset: docset_opts(dir.path(), "fc"),
        fields: vec!["subject".to_string()],
        top: Some(2),
    })
    .unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts["subject"].len(), 2);
    assert!(counts["subject"][0].1 >= counts["subject"][1].1);

    let text = commands::format_facet_counts(&counts);
    assert!(text.starts_with("subject (2 values)"));

    let err = commands::facet_counts(&FacetCountsArgs {
        docset: docset_opts(dir.path(), "fc"),
        fields: vec!["nope".to_string()],
        top: None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn test_missing_docset_has_context() {
    let dir = TempDir::new().unwrap();
    let err = commands::facet_counts(&FacetCountsArgs {
        docset: docset_opts(dir.path(), "ghost"),
        fields: vec![],
        top: None,
    })
    .unwrap_err();
    assert!(err.to_string().contains("ghost"));
}

#[test]
fn test_parse_param() {
    assert_eq!(
        commands::parse_param("fq=year:[2000 TO *]").unwrap(),
        ("fq".to_string(), "year:[2000 TO *]".to_string())
    );
    assert!(commands::parse_param("rows").is_err());
    assert!(commands::parse_param("=5").is_err());
}

// ============================================================================
// Index, search, report
// ============================================================================

#[derive(Default)]
struct CountingEngine {
    docs: Mutex<Vec<Document>>,
}

#[async_trait]
impl SearchEngine for CountingEngine {
    async fn add(&self, docs: &[Document]) -> Result<Timing, RunnerError> {
        self.docs.lock().unwrap().extend_from_slice(docs);
        Ok(Timing { qtime_ms: 20 })
    }

    async fn commit(&self) -> Result<Timing, RunnerError> {
        Ok(Timing { qtime_ms: 4 })
    }

    async fn search(&self, query: &str, params: &QueryParams) -> Result<SearchResult, RunnerError> {
        let faceted = params.pairs().iter().any(|(k, _)| k == "facet.field");
        Ok(SearchResult {
            hits: if query == "*:*" { self.docs.lock().unwrap().len() as u64 } else { 1 },
            qtime_ms: if faceted { 8 } else { 2 },
        })
    }
}

fn solr_opts() -> SolrOpts {
    SolrOpts {
        solr_url: "http://localhost:8983/solr/bench".to_string(),
        timeout_secs: 5,
    }
}

fn search_args(dir: &Path, label: &str, facet_fields: Vec<String>) -> SearchArgs {
    SearchArgs {
        docset: docset_opts(dir, "wf"),
        solr: solr_opts(),
        label: label.to_string(),
        rep_n: 3,
        ignore_n: 1,
        facet_fields,
        params: vec!["rows=10".to_string()],
        log: dir.join("log.json"),
    }
}

#[tokio::test]
async fn test_index_search_report() {
    let dir = TempDir::new().unwrap();
    generate(dir.path(), "wf", 250, None);

    let log = commands::index_with(
        CountingEngine::default(),
        &IndexArgs {
            docset: docset_opts(dir.path(), "wf"),
            solr: solr_opts(),
            batch_size: 100,
            log: dir.path().join("log.json"),
            test_id: Some("wf-test".to_string()),
            solr_version: Some("9.4".to_string()),
            notes: None,
        },
    )
    .await
    .unwrap();

    let stats = log.indexing_stats.as_ref().unwrap();
    assert_eq!(stats.total_docs, 250);
    assert_eq!(stats.num_batches(), 3);
    assert_eq!(stats.indexing_total_secs, 0.06);
    assert_eq!(log.metadata.collection_size.as_deref(), Some("250"));

    let engine = CountingEngine::default();
    commands::search_with(engine, &search_args(dir.path(), "facets: none", vec![]))
        .await
        .unwrap();
    let log = commands::search_with(
        CountingEngine::default(),
        &search_args(dir.path(), "facets: colors", vec!["colors".to_string()]),
    )
    .await
    .unwrap();

    assert_eq!(log.test_id, "wf-test");
    let plain = &log.search_stats["facets: none"];
    // Blank query first, then every search term
    assert_eq!(plain.term_results.len(), 31);
    assert_eq!(plain.term_results[0].term, "");
    assert_eq!(plain.avg_qtime_ms, 2.0);
    assert_eq!(log.search_stats["facets: colors"].avg_qtime_ms, 8.0);

    let report = commands::report(&ReportArgs {
        log: dir.path().join("log.json"),
        groups: vec!["all=facets".to_string()],
        json: false,
    })
    .unwrap();
    assert_eq!(report.search_all_terms["all"], 5.0);
    assert_eq!(report.search_blank["all"], 5.0);
    assert_eq!(report.indexing.unwrap().batch_size, 100);
}

#[test]
fn test_report_group_must_match() {
    let dir = TempDir::new().unwrap();
    generate(dir.path(), "wf", 20, None);

    tokio_test::block_on(commands::search_with(
        CountingEngine::default(),
        &search_args(dir.path(), "plain", vec![]),
    ))
    .unwrap();

    let err = commands::report(&ReportArgs {
        log: dir.path().join("log.json"),
        groups: vec!["g=facets".to_string()],
        json: false,
    })
    .unwrap_err();
    assert!(err.to_string().contains("facets"));
}
