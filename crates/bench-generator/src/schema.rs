//! The benchmark schema: ordered fields, the shared search term selector,
//! and the corpus size everything is tuned to.
//!
//! Setting the corpus size rebuilds every facet field's value set, then runs
//! a sampling pass to measure how often each search field has a value and
//! allocates injection chances so the corpus hits the target term:doc ratio.

use crate::allocator::allocate;
use crate::emitter::{derive_seed, Emitter};
use crate::error::GeneratorError;
use crate::field::{FacetField, Field, FieldSlots, Injector, SchemaField, SearchField};
use crate::generators::{build_gate, build_repeat, build_string_emitter, build_value_emitter};
use crate::terms::{make_search_term_selector, SharedTermChoice, TermChoice};
use bench_core::{BenchSchemaConfig, Document, FieldDefinition, FieldKind, GeneratorConfig};
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Documents drawn when measuring how often search fields have a value.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Salt for the search term selector's seed, clear of field indexes.
const SEARCH_TERMS_SALT: u64 = 1 << 32;

/// Salt for a search field's injector within the field's seed.
const INJECTOR_SALT: u64 = 4;

/// A configured set of fields that produces benchmark documents.
pub struct BenchmarkSchema {
    fields: Vec<SchemaField>,
    slots: FieldSlots,
    seed: Option<u64>,
    search_terms: Option<SharedTermChoice>,
    term_doc_ratio: f64,
    overwrite_chance: f64,
    sample_size: usize,
    num_docs: Option<usize>,
    injection_chances: BTreeMap<String, f64>,
}

impl BenchmarkSchema {
    /// A schema over `fields` with no search terms.
    pub fn new(fields: Vec<SchemaField>, seed: Option<u64>) -> Self {
        Self {
            fields,
            slots: FieldSlots::new(),
            seed,
            search_terms: None,
            term_doc_ratio: 0.0,
            overwrite_chance: 0.0,
            sample_size: DEFAULT_SAMPLE_SIZE,
            num_docs: None,
            injection_chances: BTreeMap::new(),
        }
    }

    /// Inject terms from `terms` into search fields, aiming for
    /// `term_doc_ratio` injected terms per document.
    pub fn with_search_terms(
        mut self,
        terms: TermChoice<String>,
        term_doc_ratio: f64,
        overwrite_chance: f64,
    ) -> Self {
        self.search_terms = Some(terms.into_shared());
        self.term_doc_ratio = term_doc_ratio;
        self.overwrite_chance = overwrite_chance;
        self
    }

    /// Number of documents drawn by the sampling pass.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Build a schema from its YAML configuration.
    ///
    /// `seed` overrides the configured seed.
    pub fn from_config(
        config: &BenchSchemaConfig,
        seed: Option<u64>,
    ) -> Result<Self, GeneratorError> {
        config.validate()?;
        let seed = seed.or(config.seed);

        let fields = config
            .fields
            .iter()
            .enumerate()
            .map(|(idx, def)| build_field(def, derive_seed(seed, idx as u64)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut schema = Self::new(fields, seed);
        if let Some(terms) = &config.search_terms {
            let terms_seed = derive_seed(seed, SEARCH_TERMS_SALT);
            let mut words = build_string_emitter(&terms.word_source, terms_seed)?;
            let selector = make_search_term_selector(
                &mut *words,
                terms.vocab_size,
                terms.phrase_counts.as_deref(),
                terms_seed,
            )?;
            info!(
                "Built {} search terms ({} vocabulary words)",
                selector.items().len(),
                terms.vocab_size
            );
            schema = schema.with_search_terms(
                selector,
                terms.term_doc_ratio,
                terms.overwrite_chance,
            );
        }
        Ok(schema)
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Corpus size, once set.
    pub fn num_docs(&self) -> Option<usize> {
        self.num_docs
    }

    /// Set the corpus size.
    ///
    /// Rebuilds facet value sets, allocates injection chances, and resets
    /// every field.
    pub fn set_num_docs(&mut self, num_docs: usize) -> Result<(), GeneratorError> {
        for field in &mut self.fields {
            if let SchemaField::Facet(facet) = field {
                facet.build(num_docs)?;
            }
        }
        self.num_docs = Some(num_docs);
        self.configure_injection()?;
        self.reset_fields();
        info!(
            "Schema configured for {} documents ({} fields)",
            num_docs,
            self.fields.len()
        );
        Ok(())
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name()).collect()
    }

    fn names_of_kind(&self, kind: FieldKind) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.kind() == kind)
            .map(|f| f.name())
            .collect()
    }

    pub fn search_field_names(&self) -> Vec<&str> {
        self.names_of_kind(FieldKind::Search)
    }

    pub fn facet_field_names(&self) -> Vec<&str> {
        self.names_of_kind(FieldKind::Facet)
    }

    /// Injection chance per search field from the last allocation.
    pub fn injection_chances(&self) -> &BTreeMap<String, f64> {
        &self.injection_chances
    }

    /// Every search term, or `None` when the schema has no term selector.
    pub fn search_terms(&self) -> Option<Vec<String>> {
        self.search_terms
            .as_ref()
            .map(|terms| terms.borrow().items().to_vec())
    }

    /// Facet values per facet field. Unbuilt facets are left out.
    pub fn facet_terms(&self) -> BTreeMap<String, Vec<String>> {
        self.fields
            .iter()
            .filter_map(|field| match field {
                SchemaField::Facet(facet) => facet
                    .facet_terms()
                    .map(|terms| (facet.name().to_string(), terms.to_vec())),
                _ => None,
            })
            .collect()
    }

    /// Fraction of sampled documents in which each search field has a
    /// non-blank value.
    ///
    /// Draws `sample_size` documents, then resets every field.
    pub fn measure_ceilings(&mut self) -> Result<BTreeMap<String, f64>, GeneratorError> {
        self.reset_fields();

        let mut present: Vec<usize> = vec![0; self.fields.len()];
        for _ in 0..self.sample_size {
            let doc = self.draw_doc()?;
            for (count, (_, value)) in present.iter_mut().zip(doc.iter()) {
                if !value.is_blank() {
                    *count += 1;
                }
            }
        }
        self.reset_fields();

        let ceilings = self
            .fields
            .iter()
            .zip(present)
            .filter(|(field, _)| field.kind() == FieldKind::Search)
            .map(|(field, count)| {
                let ceiling = count as f64 / self.sample_size as f64;
                (field.name().to_string(), ceiling)
            })
            .collect();
        Ok(ceilings)
    }

    fn configure_injection(&mut self) -> Result<(), GeneratorError> {
        let has_search_fields = self.fields.iter().any(|f| f.kind() == FieldKind::Search);
        let Some(terms) = self.search_terms.clone() else {
            if has_search_fields {
                warn!("Schema has search fields but no search terms; nothing will be injected");
            }
            return Ok(());
        };
        if !has_search_fields {
            warn!("Schema has search terms but no search fields; nothing will be injected");
            return Ok(());
        }

        let ceilings = self.measure_ceilings()?;
        let chances = allocate(self.term_doc_ratio, &ceilings);

        for (idx, field) in self.fields.iter_mut().enumerate() {
            if let SchemaField::Search(search) = field {
                let chance = chances
                    .get(search.name())
                    .copied()
                    .ok_or_else(|| GeneratorError::MissingInjectionChance(search.name().to_string()))?;
                debug!(
                    "Search field '{}': ceiling {:.4}, inject chance {:.4}",
                    search.name(),
                    ceilings.get(search.name()).copied().unwrap_or_default(),
                    chance
                );
                let seed = derive_seed(derive_seed(self.seed, idx as u64), INJECTOR_SALT);
                search.configure(Injector::new(
                    Rc::clone(&terms),
                    chance,
                    self.overwrite_chance,
                    seed,
                ));
            }
        }

        info!(
            "Allocated injection chances for {} search fields (target {} terms/doc)",
            chances.len(),
            self.term_doc_ratio
        );
        self.injection_chances = chances;
        Ok(())
    }

    fn draw_doc(&mut self) -> Result<Document, GeneratorError> {
        let mut doc = Document::with_capacity(self.fields.len());
        for field in &mut self.fields {
            let value = field.draw(&self.slots)?;
            self.slots.set(field.name(), value.clone());
            doc.insert(field.name(), value);
        }
        Ok(doc)
    }

    /// Generate the next document.
    pub fn next_doc(&mut self) -> Result<Document, GeneratorError> {
        if self.num_docs.is_none() {
            return Err(GeneratorError::NotConfigured);
        }
        self.draw_doc()
    }

    /// Restart every field, the search term selector, and the slots.
    pub fn reset_fields(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
        if let Some(terms) = &self.search_terms {
            terms.borrow_mut().reset();
        }
        self.slots.clear();
    }

    /// Reset, then lazily generate the whole corpus.
    ///
    /// Every call yields the same documents when the schema is seeded.
    pub fn docs(&mut self) -> Result<DocumentIterator<'_>, GeneratorError> {
        let remaining = self.num_docs.ok_or(GeneratorError::NotConfigured)?;
        self.reset_fields();
        Ok(DocumentIterator {
            schema: self,
            remaining,
        })
    }
}

fn build_field(def: &FieldDefinition, seed: Option<u64>) -> Result<SchemaField, GeneratorError> {
    let repeat = build_repeat(def.repeat.as_ref(), derive_seed(seed, 1))?;
    let gate = build_gate(def.occurrence, derive_seed(seed, 2));

    if def.kind == FieldKind::Facet {
        let source = build_string_emitter(&def.generator, derive_seed(seed, 0))?;
        let mut facet = FacetField::new(
            &def.name,
            source,
            def.cardinality_or_default(),
            derive_seed(seed, 3),
        );
        if let Some(repeat) = repeat {
            facet = facet.with_repeat(repeat);
        }
        if let Some(gate) = gate {
            facet = facet.with_gate(gate);
        }
        return Ok(SchemaField::Facet(facet));
    }

    let mut field = match &def.generator {
        GeneratorConfig::Copy { from } => Field::copy_of(&def.name, from),
        other => Field::new(&def.name, build_value_emitter(other, derive_seed(seed, 0))?),
    };
    if let Some(repeat) = repeat {
        field = field.with_repeat(repeat);
    }
    if let Some(gate) = gate {
        field = field.with_gate(gate);
    }

    Ok(match def.kind {
        FieldKind::Search => SchemaField::Search(SearchField::new(field)),
        _ => SchemaField::Plain(field),
    })
}

/// Iterator that lazily generates documents.
pub struct DocumentIterator<'a> {
    schema: &'a mut BenchmarkSchema,
    remaining: usize,
}

impl Iterator for DocumentIterator<'_> {
    type Item = Result<Document, GeneratorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.schema.draw_doc())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DocumentIterator<'_> {}
