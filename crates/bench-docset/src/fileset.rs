//! The three files that make up a saved document set.
//!
//! ```text
//! {dir}/
//!   {id}_terms.json    {"search_terms": [...], "facet_terms": {...}}
//!   {id}_docs.json     one JSON document per line
//!   {id}_counts.json   {"total_docs": N, "facet_value_counts": {...}}
//! ```

use crate::error::DocsetError;
use crate::tally::FacetCounts;
use bench_core::Document;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Default buffer size for document writing.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Documents between progress log lines.
pub const PROGRESS_EVERY: u64 = 10_000;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TermsRecord {
    search_terms: Option<Vec<String>>,
    facet_terms: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CountsRecord {
    total_docs: usize,
    facet_value_counts: Option<FacetCounts>,
}

/// Paths and read/write helpers for one docset on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    dir: PathBuf,
    docset_id: String,
}

impl FileSet {
    pub fn new(dir: impl Into<PathBuf>, docset_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            docset_id: docset_id.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn docset_id(&self) -> &str {
        &self.docset_id
    }

    pub fn terms_path(&self) -> PathBuf {
        self.dir.join(format!("{}_terms.json", self.docset_id))
    }

    pub fn docs_path(&self) -> PathBuf {
        self.dir.join(format!("{}_docs.json", self.docset_id))
    }

    pub fn counts_path(&self) -> PathBuf {
        self.dir.join(format!("{}_counts.json", self.docset_id))
    }

    // ========================================================================
    // Terms
    // ========================================================================

    /// Write the search and facet term lists, replacing any saved ones.
    pub fn save_terms(
        &self,
        search_terms: Option<&[String]>,
        facet_terms: Option<&BTreeMap<String, Vec<String>>>,
    ) -> Result<(), DocsetError> {
        let record = TermsRecord {
            search_terms: search_terms.map(<[String]>::to_vec),
            facet_terms: facet_terms.cloned(),
        };
        self.write_json(&self.terms_path(), &record)
    }

    pub fn search_terms(&self) -> Result<Option<Vec<String>>, DocsetError> {
        Ok(self
            .read_json::<TermsRecord>(&self.terms_path())?
            .and_then(|r| r.search_terms))
    }

    pub fn facet_terms(&self) -> Result<Option<BTreeMap<String, Vec<String>>>, DocsetError> {
        Ok(self
            .read_json::<TermsRecord>(&self.terms_path())?
            .and_then(|r| r.facet_terms))
    }

    // ========================================================================
    // Counts
    // ========================================================================

    /// Write the document total and facet value counts.
    pub fn save_counts(
        &self,
        total_docs: usize,
        facet_value_counts: Option<&FacetCounts>,
    ) -> Result<(), DocsetError> {
        let record = CountsRecord {
            total_docs,
            facet_value_counts: facet_value_counts.cloned(),
        };
        self.write_json(&self.counts_path(), &record)
    }

    pub fn total_docs(&self) -> Result<Option<usize>, DocsetError> {
        Ok(self
            .read_json::<CountsRecord>(&self.counts_path())?
            .map(|r| r.total_docs))
    }

    pub fn facet_value_counts(&self) -> Result<Option<FacetCounts>, DocsetError> {
        Ok(self
            .read_json::<CountsRecord>(&self.counts_path())?
            .and_then(|r| r.facet_value_counts))
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Write each document from `docs` to the documents file as it passes
    /// through, yielding it afterwards.
    ///
    /// Documents are appended to an existing file unless `overwrite` is set.
    /// The file is flushed once `docs` runs out.
    pub fn stream_docs_to_file<I, E>(
        &self,
        docs: I,
        overwrite: bool,
    ) -> Result<DocWriter<I>, DocsetError>
    where
        I: Iterator<Item = Result<Document, E>>,
        DocsetError: From<E>,
    {
        fs::create_dir_all(&self.dir)?;
        let path = self.docs_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!overwrite)
            .truncate(overwrite)
            .open(&path)?;

        info!(
            "Streaming documents to '{}' ({})",
            path.display(),
            if overwrite { "overwrite" } else { "append" }
        );

        Ok(DocWriter {
            docs,
            writer: Some(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file)),
            path,
            metrics: WriteMetrics::default(),
            started: Instant::now(),
        })
    }

    /// Lazily read saved documents back, one line at a time.
    pub fn docs(&self) -> Result<DocReader, DocsetError> {
        let path = self.docs_path();
        if !path.exists() {
            return Err(DocsetError::MissingDocs(path));
        }
        let file = File::open(&path)?;
        Ok(DocReader {
            lines: BufReader::new(file).lines(),
            path,
            line: 0,
        })
    }

    // ========================================================================
    // Housekeeping
    // ========================================================================

    /// Remove every file of this docset that exists.
    pub fn clear(&self) -> Result<(), DocsetError> {
        for path in [self.terms_path(), self.docs_path(), self.counts_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
                debug!("Removed {}", path.display());
            }
        }
        Ok(())
    }

    pub fn terms_empty(&self) -> bool {
        file_empty(&self.terms_path())
    }

    pub fn docs_empty(&self) -> bool {
        file_empty(&self.docs_path())
    }

    pub fn counts_empty(&self) -> bool {
        file_empty(&self.counts_path())
    }

    /// True when none of the three files holds anything.
    pub fn is_empty(&self) -> bool {
        self.terms_empty() && self.docs_empty() && self.counts_empty()
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), DocsetError> {
        fs::create_dir_all(&self.dir)?;
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, value)?;
        writer.flush()?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(
        &self,
        path: &Path,
    ) -> Result<Option<T>, DocsetError> {
        if file_empty(path) {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(Some(serde_json::from_reader(reader)?))
    }
}

fn file_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}

/// Metrics from streaming documents to disk.
#[derive(Debug, Clone, Default)]
pub struct WriteMetrics {
    /// Number of documents written.
    pub docs_written: u64,
    /// Time from opening the file to the final flush.
    pub total_duration: Duration,
    /// Output file size in bytes.
    pub file_size_bytes: u64,
}

impl WriteMetrics {
    pub fn docs_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.docs_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Iterator that writes documents to disk as they pass through.
///
/// See [`FileSet::stream_docs_to_file`].
pub struct DocWriter<I> {
    docs: I,
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    metrics: WriteMetrics,
    started: Instant,
}

impl<I> DocWriter<I> {
    pub fn metrics(&self) -> &WriteMetrics {
        &self.metrics
    }

    fn finish(&mut self) -> Result<(), DocsetError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer.flush()?;
        drop(writer);

        self.metrics.file_size_bytes = fs::metadata(&self.path)?.len();
        self.metrics.total_duration = self.started.elapsed();
        info!(
            "Document write complete: {} docs, {} bytes in {:?} ({:.2} docs/sec)",
            self.metrics.docs_written,
            self.metrics.file_size_bytes,
            self.metrics.total_duration,
            self.metrics.docs_per_second()
        );
        Ok(())
    }
}

impl<I, E> Iterator for DocWriter<I>
where
    I: Iterator<Item = Result<Document, E>>,
    DocsetError: From<E>,
{
    type Item = Result<Document, DocsetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.writer.is_none() {
            return None;
        }
        let doc = match self.docs.next() {
            Some(Ok(doc)) => doc,
            Some(Err(e)) => return Some(Err(e.into())),
            None => return self.finish().err().map(Err),
        };

        let writer = self.writer.as_mut()?;
        if let Err(e) = serde_json::to_writer(&mut *writer, &doc) {
            return Some(Err(e.into()));
        }
        if let Err(e) = writeln!(writer) {
            return Some(Err(e.into()));
        }

        self.metrics.docs_written += 1;
        if self.metrics.docs_written % PROGRESS_EVERY == 0 {
            debug!("Written {} docs", self.metrics.docs_written);
        }
        Some(Ok(doc))
    }
}

/// Lazy reader over a saved documents file.
pub struct DocReader {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    line: usize,
}

impl Iterator for DocReader {
    type Item = Result<Document, DocsetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|source| {
                DocsetError::InvalidDocument {
                    path: self.path.clone(),
                    line: self.line,
                    source,
                }
            }));
        }
    }
}
