//! Runner behavior against an in-memory engine, and the Solr client against
//! a minimal HTTP responder.

use async_trait::async_trait;
use bench_core::Document;
use bench_docset::DocsetError;
use bench_runner::{
    BenchmarkLog, BenchmarkMetadata, BenchmarkRunner, QueryParams, RunnerError, SearchEngine,
    SearchResult, SolrClient, Timing, MATCH_ALL_QUERY,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ============================================================================
// In-memory engine
// ============================================================================

/// Adds cost 10 ms per doc, commits 5 ms, and the nth search takes n * 10 ms.
#[derive(Default)]
struct MockEngine {
    pending: Mutex<Vec<Document>>,
    indexed: Mutex<Vec<Document>>,
    searches: AtomicU64,
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl SearchEngine for MockEngine {
    async fn add(&self, docs: &[Document]) -> Result<Timing, RunnerError> {
        self.pending.lock().unwrap().extend_from_slice(docs);
        Ok(Timing {
            qtime_ms: 10 * docs.len() as u64,
        })
    }

    async fn commit(&self) -> Result<Timing, RunnerError> {
        let mut pending = self.pending.lock().unwrap();
        self.indexed.lock().unwrap().append(&mut pending);
        Ok(Timing { qtime_ms: 5 })
    }

    async fn search(&self, query: &str, _params: &QueryParams) -> Result<SearchResult, RunnerError> {
        let n = self.searches.fetch_add(1, Ordering::SeqCst) + 1;
        self.queries.lock().unwrap().push(query.to_string());

        let indexed = self.indexed.lock().unwrap();
        let hits = if query == MATCH_ALL_QUERY {
            indexed.len()
        } else {
            indexed
                .iter()
                .filter(|d| {
                    d.get("title")
                        .and_then(|v| v.as_str())
                        .is_some_and(|t| t.contains(query))
                })
                .count()
        };
        Ok(SearchResult {
            hits: hits as u64,
            qtime_ms: n * 10,
        })
    }
}

fn docs(n: usize) -> Vec<Result<Document, DocsetError>> {
    (0..n)
        .map(|i| {
            let title = if i % 5 == 0 { "alpha doc" } else { "other doc" };
            Ok(Document::new().with("id", i as i64).with("title", title))
        })
        .collect()
}

fn runner() -> BenchmarkRunner<MockEngine> {
    BenchmarkRunner::new(
        MockEngine::default(),
        BenchmarkLog::new("test", BenchmarkMetadata::default()),
    )
}

#[tokio::test]
async fn test_index_docs_in_batches() {
    let mut runner = runner();
    let stats = runner.index_docs(docs(25), 10).await.unwrap().clone();

    assert_eq!(stats.batch_size, 10);
    assert_eq!(stats.total_docs, 25);
    assert_eq!(stats.indexing_timings_secs, vec![0.1, 0.1, 0.05]);
    assert_eq!(stats.commit_timings_secs, vec![0.005, 0.005, 0.005]);
    assert_eq!(stats.indexing_total_secs, 0.25);
    assert_eq!(stats.commit_total_secs, 0.015);
    assert_eq!(stats.total_secs, 0.265);

    assert_eq!(runner.engine().indexed.lock().unwrap().len(), 25);
    assert_eq!(runner.log().indexing_stats.as_ref(), Some(&stats));
}

#[tokio::test]
async fn test_index_docs_rejects_zero_batch() {
    let mut runner = runner();
    let err = runner.index_docs(docs(3), 0).await.unwrap_err();
    assert!(matches!(err, RunnerError::InvalidBatchSize));
}

#[tokio::test]
async fn test_index_docs_propagates_doc_errors() {
    let mut runner = runner();
    let mut input = docs(4);
    input.push(Err(DocsetError::NotConfigured("broken".to_string())));

    let err = runner.index_docs(input, 2).await.unwrap_err();
    assert!(matches!(err, RunnerError::Docset(_)));
}

#[tokio::test]
async fn test_search_ignores_warmup() {
    let mut runner = runner();
    runner.index_docs(docs(10), 10).await.unwrap();

    // Searches 1..=3 take 10, 20, 30 ms; the first is warm-up
    let outcome = runner.search("alpha", &QueryParams::new(), 3, 1).await.unwrap();
    assert_eq!(outcome.qtime_ms, 25.0);
    assert_eq!(outcome.hits, Some(2));
}

#[tokio::test]
async fn test_blank_query_matches_all() {
    let mut runner = runner();
    runner.index_docs(docs(7), 3).await.unwrap();

    let outcome = runner.search("  ", &QueryParams::new(), 1, 0).await.unwrap();
    assert_eq!(outcome.hits, Some(7));
    assert_eq!(
        runner.engine().queries.lock().unwrap().as_slice(),
        &[MATCH_ALL_QUERY.to_string()]
    );
}

#[tokio::test]
async fn test_search_requires_counted_repetition() {
    let runner = runner();
    let err = runner.search("x", &QueryParams::new(), 2, 2).await.unwrap_err();
    assert!(matches!(
        err,
        RunnerError::InvalidRepetitions {
            rep_n: 2,
            ignore_n: 2
        }
    ));
}

#[tokio::test]
async fn test_run_searches_records_label() {
    let mut runner = runner();
    runner.index_docs(docs(10), 5).await.unwrap();

    let terms = vec![String::new(), "alpha".to_string(), "missing".to_string()];
    let stats = runner
        .run_searches(&terms, "plain", &QueryParams::new(), 2, 1)
        .await
        .unwrap()
        .clone();

    // Counted searches are the 2nd, 4th and 6th: 20, 40, 60 ms
    let qtimes: Vec<f64> = stats.term_results.iter().map(|r| r.qtime_ms).collect();
    assert_eq!(qtimes, vec![20.0, 40.0, 60.0]);
    assert_eq!(stats.total_qtime_ms, 120.0);
    assert_eq!(stats.avg_qtime_ms, 40.0);
    assert_eq!(stats.term_results[0].term, "");
    assert_eq!(stats.term_results[0].hits, Some(10));
    assert_eq!(stats.term_results[1].hits, Some(2));
    assert_eq!(stats.term_results[2].hits, Some(0));

    let report = runner.into_log().compile_report(&[]).unwrap();
    assert_eq!(report.search_blank["plain"], 20.0);
    assert_eq!(report.search_all_terms["plain"], 40.0);
    assert!(report.indexing.is_some());
}

// ============================================================================
// Solr client over HTTP
// ============================================================================

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let body_len = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= head_end + 4 + body_len {
            break;
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Answer one connection per canned response, returning the raw requests.
async fn fake_solr(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/solr/bench", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let reason = if status == 200 { "OK" } else { "Bad Request" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        requests
    });
    (url, handle)
}

#[tokio::test]
async fn test_solr_client_round_trip() {
    let (url, server) = fake_solr(vec![
        (200, r#"{"responseHeader":{"status":0,"QTime":12}}"#),
        (200, r#"{"responseHeader":{"status":0,"QTime":30}}"#),
        (
            200,
            r#"{"responseHeader":{"status":0,"QTime":4},"response":{"numFound":42,"start":0,"docs":[]}}"#,
        ),
    ])
    .await;
    let client = SolrClient::new(&url).unwrap();

    let doc = Document::new().with("id", "d1").with("title", "hello");
    assert_eq!(client.add(&[doc]).await.unwrap(), Timing { qtime_ms: 12 });
    assert_eq!(client.commit().await.unwrap(), Timing { qtime_ms: 30 });

    let params = QueryParams::facets(["color"]);
    let result = client.search("hello", &params).await.unwrap();
    assert_eq!(result, SearchResult { hits: 42, qtime_ms: 4 });

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("POST /solr/bench/update?commit=false"));
    assert!(requests[0].contains(r#"[{"id":"d1","title":"hello"}]"#));
    assert!(requests[1].starts_with("POST /solr/bench/update?commit=true"));
    assert!(requests[2].starts_with("GET /solr/bench/select?q=hello&wt=json"));
    assert!(requests[2].contains("facet.field=color"));
}

#[tokio::test]
async fn test_solr_client_error_status() {
    let (url, server) = fake_solr(vec![(
        400,
        r#"{"responseHeader":{"status":400,"QTime":1},"error":{"msg":"undefined field foo","code":400}}"#,
    )])
    .await;
    let client = SolrClient::new(&url).unwrap();

    let err = client.search("foo:bar", &QueryParams::new()).await.unwrap_err();
    match err {
        RunnerError::Engine { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "undefined field foo");
        }
        other => panic!("expected engine error, got {other:?}"),
    }
    server.await.unwrap();
}
