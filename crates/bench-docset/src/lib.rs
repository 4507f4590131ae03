//! Saved document sets for search-bench.
//!
//! A docset ties a generated corpus to the search terms injected into it and
//! the facet values it contains, so a benchmark can be rerun against exactly
//! the same data.
//!
//! # Example
//!
//! ```ignore
//! use bench_docset::{DocSet, FileSet};
//!
//! let mut docset = DocSet::from_schema("run1", schema, Some(Path::new("data")))?;
//! for doc in docset.docs()? {
//!     index(doc?);
//! }
//! println!("{:?}", docset.facet_value_counts());
//!
//! // Later
//! let mut saved = DocSet::from_fileset(FileSet::new("data", "run1"))?;
//! ```

pub mod docset;
pub mod error;
pub mod fileset;
pub mod tally;

pub use docset::{DocSet, DocStream};
pub use error::DocsetError;
pub use fileset::{DocReader, DocWriter, FileSet, WriteMetrics};
pub use tally::{FacetCounts, FacetRanking, FacetTally};
