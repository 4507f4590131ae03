//! A benchmark document set: the documents plus the terms and facet counts
//! that describe them.

use crate::error::DocsetError;
use crate::fileset::FileSet;
use crate::tally::{FacetCounts, FacetTally};
use bench_core::Document;
use bench_generator::BenchmarkSchema;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Lazy stream of documents from a [`DocSet`].
pub type DocStream<'a> = Box<dyn Iterator<Item = Result<Document, DocsetError>> + 'a>;

/// Documents for one benchmark run, with their search and facet terms.
///
/// A docset built from a schema generates its documents on the first call to
/// [`DocSet::docs`], counting facet values as they go by and saving them when
/// a save path was given. Later passes read the saved file back, or
/// regenerate from the reset schema when nothing was saved.
pub struct DocSet {
    id: String,
    schema: Option<BenchmarkSchema>,
    fileset: Option<FileSet>,
    search_terms: Option<Vec<String>>,
    facet_terms: BTreeMap<String, Vec<String>>,
    total_docs: Option<usize>,
    facet_value_counts: Option<FacetCounts>,
}

impl DocSet {
    /// Wrap a schema whose corpus size has been set.
    ///
    /// With a `savepath`, any files saved there under `id` are cleared and
    /// the schema's terms are written right away.
    pub fn from_schema(
        id: impl Into<String>,
        schema: BenchmarkSchema,
        savepath: Option<&Path>,
    ) -> Result<Self, DocsetError> {
        let id = id.into();
        if schema.num_docs().is_none() {
            return Err(DocsetError::NotConfigured(id));
        }

        let search_terms = schema.search_terms();
        let facet_terms = schema.facet_terms();

        let fileset = match savepath {
            Some(dir) => {
                let fileset = FileSet::new(dir, id.clone());
                fileset.clear()?;
                fileset.save_terms(search_terms.as_deref(), Some(&facet_terms))?;
                Some(fileset)
            }
            None => None,
        };

        info!(
            "Docset '{}': {} docs, {} search terms, {} facet fields",
            id,
            schema.num_docs().unwrap_or_default(),
            search_terms.as_ref().map_or(0, Vec::len),
            facet_terms.len()
        );

        Ok(Self {
            id,
            schema: Some(schema),
            fileset,
            search_terms,
            facet_terms,
            total_docs: None,
            facet_value_counts: None,
        })
    }

    /// Load a previously saved docset.
    pub fn from_fileset(fileset: FileSet) -> Result<Self, DocsetError> {
        if fileset.docs_empty() {
            return Err(DocsetError::MissingDocs(fileset.docs_path()));
        }

        let docset = Self {
            id: fileset.docset_id().to_string(),
            schema: None,
            search_terms: fileset.search_terms()?,
            facet_terms: fileset.facet_terms()?.unwrap_or_default(),
            total_docs: fileset.total_docs()?,
            facet_value_counts: fileset.facet_value_counts()?,
            fileset: Some(fileset),
        };
        info!(
            "Loaded docset '{}' ({} docs)",
            docset.id,
            docset
                .total_docs
                .map_or_else(|| "unknown".to_string(), |n| n.to_string())
        );
        Ok(docset)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fileset(&self) -> Option<&FileSet> {
        self.fileset.as_ref()
    }

    pub fn search_terms(&self) -> Option<&[String]> {
        self.search_terms.as_deref()
    }

    pub fn facet_terms(&self) -> &BTreeMap<String, Vec<String>> {
        &self.facet_terms
    }

    /// Number of documents, known once a full pass has completed or the
    /// counts were loaded.
    pub fn total_docs(&self) -> Option<usize> {
        self.total_docs
    }

    /// Facet value rankings, known once a full pass has completed or the
    /// counts were loaded.
    pub fn facet_value_counts(&self) -> Option<&FacetCounts> {
        self.facet_value_counts.as_ref()
    }

    /// Stream every document in the set.
    pub fn docs(&mut self) -> Result<DocStream<'_>, DocsetError> {
        let Self {
            id,
            schema,
            fileset,
            total_docs,
            facet_value_counts,
            ..
        } = self;

        let saved = fileset.as_ref().filter(|fs| !fs.docs_empty());
        let schema = match (schema.as_mut(), saved) {
            (None, Some(fs)) => return Ok(Box::new(fs.docs()?)),
            (Some(_), Some(fs)) if facet_value_counts.is_some() => {
                return Ok(Box::new(fs.docs()?))
            }
            (Some(schema), _) => schema,
            (None, None) => {
                let path = fileset.as_ref().map(FileSet::docs_path).unwrap_or_default();
                return Err(DocsetError::MissingDocs(path));
            }
        };

        if facet_value_counts.is_some() {
            let docs = schema.docs()?;
            return Ok(Box::new(docs.map(|d| d.map_err(DocsetError::from))));
        }

        info!("Generating docs for docset '{}'", id);
        let tally = FacetTally::new(schema.facet_field_names());
        let generated = schema.docs()?;
        let docs: DocStream<'_> = match fileset.as_ref() {
            Some(fs) => Box::new(fs.stream_docs_to_file(generated, true)?),
            None => Box::new(generated.map(|d| d.map_err(DocsetError::from))),
        };

        Ok(Box::new(FirstPass {
            docs,
            tally,
            fileset: fileset.as_ref(),
            total_docs,
            facet_value_counts,
            done: false,
        }))
    }
}

/// Generation pass that tallies facet values and records them at the end.
struct FirstPass<'a> {
    docs: DocStream<'a>,
    tally: FacetTally,
    fileset: Option<&'a FileSet>,
    total_docs: &'a mut Option<usize>,
    facet_value_counts: &'a mut Option<FacetCounts>,
    done: bool,
}

impl FirstPass<'_> {
    fn finish(&mut self) -> Result<(), DocsetError> {
        let total = self.tally.total_docs();
        let counts = self.tally.rankings();
        if let Some(fileset) = self.fileset {
            fileset.save_counts(total, Some(&counts))?;
        }
        info!("Counted facet values over {} docs", total);
        *self.total_docs = Some(total);
        *self.facet_value_counts = Some(counts);
        Ok(())
    }
}

impl Iterator for FirstPass<'_> {
    type Item = Result<Document, DocsetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.docs.next() {
            Some(Ok(doc)) => {
                self.tally.add_document(&doc);
                Some(Ok(doc))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                self.done = true;
                self.finish().err().map(Err)
            }
        }
    }
}
