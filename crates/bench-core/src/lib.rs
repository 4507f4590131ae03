//! Core types for the search-bench framework.
//!
//! This crate provides the foundational types shared by the generator,
//! doc set, and runner crates:
//!
//! - [`FieldValue`] - A generated scalar or multi-valued field value
//! - [`Document`] - An ordered mapping of field name to value
//! - [`BenchSchemaConfig`] - Schema definitions loaded from YAML
//!
//! # Architecture
//!
//! ```text
//! bench-core (this crate)
//!    │
//!    ├─── bench-generator  (emitters, terms, schema fields)
//!    │
//!    ├─── bench-docset     (JSON persistence, facet counts)
//!    │
//!    └─── bench-runner     (engine client, timings, reports)
//! ```
//!
//! # Example
//!
//! ```rust
//! use bench_core::{BenchSchemaConfig, FieldKind};
//!
//! let schema = BenchSchemaConfig::from_yaml(r#"
//! fields:
//!   - name: title
//!     kind: search
//!     generator:
//!       type: text
//!       max_words: 8
//! "#).unwrap();
//!
//! assert_eq!(schema.fields_of_kind(FieldKind::Search), vec!["title"]);
//! ```

pub mod schema;
pub mod values;

// Re-exports for convenience
pub use schema::{
    BenchSchemaConfig, CardinalityConfig, FieldDefinition, FieldKind, GeneratorConfig,
    RepeatConfig, SchemaError, SearchTermsConfig,
};
pub use values::{Document, FieldValue};
