//! Document and term generation for search-bench.
//!
//! This crate turns a [`BenchSchemaConfig`](bench_core::BenchSchemaConfig)
//! into a [`BenchmarkSchema`] that produces a reproducible corpus in which
//! known search terms appear at a controlled rate and facet fields take an
//! exact number of distinct values.
//!
//! # Architecture
//!
//! ```text
//! BenchSchemaConfig (YAML)
//!        │
//!        ▼
//! ┌──────────────────────────┐      ┌──────────────────────┐
//! │     BenchmarkSchema      │◄─────│  TermChoice (shared) │
//! │                          │      │  vocabulary+phrases  │
//! │  - fields (plain,        │      └──────────────────────┘
//! │    search, facet)        │
//! │  - slots (latest values) │      set_num_docs(n):
//! │  - num_docs              │        1. build facet value sets
//! └────────────┬─────────────┘        2. sample, allocate chances
//!              │                      3. configure injectors
//!              ▼
//!    Document { field: value, ... }
//! ```
//!
//! # Example
//!
//! ```rust
//! use bench_core::BenchSchemaConfig;
//! use bench_generator::BenchmarkSchema;
//!
//! let config = BenchSchemaConfig::from_yaml(r#"
//! seed: 42
//! search_terms:
//!   vocab_size: 10
//!   word_source: { type: words, min_length: 3, max_length: 8 }
//! fields:
//!   - name: id
//!     generator: { type: sequential, start: 1 }
//!   - name: body
//!     kind: search
//!     generator: { type: text, max_words: 12 }
//! "#).unwrap();
//!
//! let mut schema = BenchmarkSchema::from_config(&config, None).unwrap();
//! schema.set_num_docs(100).unwrap();
//! for doc in schema.docs().unwrap() {
//!     let doc = doc.unwrap();
//!     assert!(doc.get("body").is_some());
//! }
//! ```

pub mod allocator;
pub mod emitter;
pub mod error;
pub mod field;
pub mod generators;
pub mod schema;
pub mod terms;

// Re-exports for convenience
pub use allocator::allocate;
pub use emitter::{derive_seed, BoxedEmitter, Emitter, SeededRng};
pub use error::GeneratorError;
pub use field::{FacetField, Field, FieldSlots, Injector, SchemaField, SearchField};
pub use schema::{BenchmarkSchema, DocumentIterator};
pub use terms::{
    build_phrases, build_vocabulary, default_phrase_counts, make_search_term_selector,
    SharedTermChoice, TermChoice,
};
