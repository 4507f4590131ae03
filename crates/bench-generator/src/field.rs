//! Document fields: plain, search (with term injection) and facet.
//!
//! Every field draws one value per document. The schema writes each value to
//! the field's slot in a [`FieldSlots`] arena right after drawing it, and
//! `copy` fields read the slot of their source field. Search fields inject
//! before the slot is written, so copies see the injected value.

use crate::emitter::{derive_seed, BoxedEmitter, Emitter, SeededRng};
use crate::error::GeneratorError;
use crate::generators::choice::gaussian_choice;
use crate::generators::numeric::{clamp_chance, roll_chance, Chance, RepeatCount};
use crate::terms::{build_vocabulary, SharedTermChoice, TermChoice};
use bench_core::{CardinalityConfig, FieldKind, FieldValue};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// Slots
// ============================================================================

/// Latest value of every field, by name.
#[derive(Debug, Default, Clone)]
pub struct FieldSlots {
    slots: HashMap<String, FieldValue>,
}

impl FieldSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value of `name`, if it has been drawn.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.slots.get(name)
    }

    /// Record the latest value of `name`.
    pub fn set(&mut self, name: &str, value: FieldValue) {
        match self.slots.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.slots.insert(name.to_string(), value);
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

// ============================================================================
// Plain fields
// ============================================================================

enum Source {
    Emit(BoxedEmitter<FieldValue>),
    Copy(String),
}

/// A field with a value source, an optional repeat count and an optional
/// occurrence gate.
pub struct Field {
    name: String,
    source: Source,
    repeat: Option<RepeatCount>,
    gate: Option<Chance>,
}

impl Field {
    /// A field drawing from `emitter`.
    pub fn new(name: impl Into<String>, emitter: BoxedEmitter<FieldValue>) -> Self {
        Self {
            name: name.into(),
            source: Source::Emit(emitter),
            repeat: None,
            gate: None,
        }
    }

    /// A field repeating the latest value of the field `from`.
    ///
    /// Copies are taken as-is; a repeat count does not apply to them.
    pub fn copy_of(name: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Source::Copy(from.into()),
            repeat: None,
            gate: None,
        }
    }

    /// Make the field multi-valued.
    pub fn with_repeat(mut self, repeat: RepeatCount) -> Self {
        self.repeat = Some(repeat);
        self
    }

    /// Give the field a chance of being null.
    pub fn with_gate(mut self, gate: Chance) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the field this one copies, if it is a copy.
    pub fn copies_from(&self) -> Option<&str> {
        match &self.source {
            Source::Copy(from) => Some(from),
            Source::Emit(_) => None,
        }
    }

    /// Draw this field's value for the next document.
    pub fn draw(&mut self, slots: &FieldSlots) -> Result<FieldValue, GeneratorError> {
        if let Some(gate) = &mut self.gate {
            if !gate.emit_one() {
                return Ok(FieldValue::Null);
            }
        }

        match &mut self.source {
            Source::Copy(from) => {
                slots
                    .get(from)
                    .cloned()
                    .ok_or_else(|| GeneratorError::UnknownCopySource {
                        field: self.name.clone(),
                        from: from.clone(),
                    })
            }
            Source::Emit(emitter) => Ok(match &mut self.repeat {
                Some(repeat) => {
                    let n = repeat.emit_one();
                    FieldValue::List(emitter.emit_many(n))
                }
                None => emitter.emit_one(),
            }),
        }
    }

    /// Restart every random stream of this field.
    pub fn reset(&mut self) {
        if let Source::Emit(emitter) = &mut self.source {
            emitter.reset();
        }
        if let Some(repeat) = &mut self.repeat {
            repeat.reset();
        }
        if let Some(gate) = &mut self.gate {
            gate.reset();
        }
    }
}

// ============================================================================
// Search fields
// ============================================================================

/// Insert `term` into `target` before the character at `offset`, separated
/// by single spaces, then trim.
///
/// Offsets past the end append.
pub fn splice_term(target: &str, term: &str, offset: usize) -> String {
    let byte = target
        .char_indices()
        .nth(offset)
        .map(|(idx, _)| idx)
        .unwrap_or(target.len());
    format!("{} {} {}", &target[..byte], term, &target[byte..])
        .trim()
        .to_string()
}

/// Puts search terms into generated values.
pub struct Injector {
    terms: SharedTermChoice,
    inject_chance: f64,
    overwrite_chance: f64,
    rng: SeededRng,
}

impl Injector {
    /// Both chances are clamped to [0, 1], with NaN treated as 0.
    pub fn new(
        terms: SharedTermChoice,
        inject_chance: f64,
        overwrite_chance: f64,
        seed: Option<u64>,
    ) -> Self {
        Self {
            terms,
            inject_chance: clamp_chance(inject_chance),
            overwrite_chance: clamp_chance(overwrite_chance),
            rng: SeededRng::new(seed),
        }
    }

    pub fn inject_chance(&self) -> f64 {
        self.inject_chance
    }

    pub fn overwrite_chance(&self) -> f64 {
        self.overwrite_chance
    }

    /// Maybe inject a term into `value`.
    ///
    /// Blank values, non-string scalars and lists without a string element
    /// come back unchanged. In a list, one string element is picked at
    /// random and the rest are left alone.
    pub fn inject(&mut self, value: FieldValue) -> FieldValue {
        if value.is_blank() || !roll_chance(&mut self.rng, self.inject_chance) {
            return value;
        }

        match value {
            FieldValue::Str(target) => FieldValue::Str(self.place(&target)),
            FieldValue::List(mut items) => {
                let eligible: Vec<usize> = items
                    .iter()
                    .enumerate()
                    // Empty strings are eligible too; only non-strings are skipped
                    .filter(|(_, item)| matches!(item, FieldValue::Str(_)))
                    .map(|(idx, _)| idx)
                    .collect();
                if let Some(&idx) = eligible.choose(&mut self.rng) {
                    if let FieldValue::Str(target) = &items[idx] {
                        let placed = self.place(target);
                        items[idx] = FieldValue::Str(placed);
                    }
                }
                FieldValue::List(items)
            }
            other => other,
        }
    }

    fn place(&mut self, target: &str) -> String {
        let term = self.terms.borrow_mut().emit_one();
        if roll_chance(&mut self.rng, self.overwrite_chance) {
            return term;
        }
        let len = target.chars().count();
        let offset = if len <= 1 {
            0
        } else {
            self.rng.random_range(0..len)
        };
        splice_term(target, &term, offset)
    }

    pub fn reset(&mut self) {
        self.rng.reset();
    }
}

/// A field whose values receive search terms once configured.
///
/// Until [`SearchField::configure`] is called it behaves like its base
/// field.
pub struct SearchField {
    base: Field,
    injector: Option<Injector>,
}

impl SearchField {
    pub fn new(base: Field) -> Self {
        Self {
            base,
            injector: None,
        }
    }

    /// Install the term source and chances, replacing any earlier ones.
    pub fn configure(&mut self, injector: Injector) {
        self.injector = Some(injector);
    }

    pub fn injector(&self) -> Option<&Injector> {
        self.injector.as_ref()
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn draw(&mut self, slots: &FieldSlots) -> Result<FieldValue, GeneratorError> {
        let value = self.base.draw(slots)?;
        Ok(match &mut self.injector {
            Some(injector) => injector.inject(value),
            None => value,
        })
    }

    pub fn reset(&mut self) {
        self.base.reset();
        if let Some(injector) = &mut self.injector {
            injector.reset();
        }
    }
}

// ============================================================================
// Facet fields
// ============================================================================

/// A field drawing from a finite set of facet values sized to the corpus.
pub struct FacetField {
    name: String,
    source: BoxedEmitter<String>,
    cardinality: CardinalityConfig,
    seed: Option<u64>,
    repeat: Option<RepeatCount>,
    gate: Option<Chance>,
    selector: Option<TermChoice<String>>,
}

impl FacetField {
    /// A facet field taking its values from `source`.
    pub fn new(
        name: impl Into<String>,
        source: BoxedEmitter<String>,
        cardinality: CardinalityConfig,
        seed: Option<u64>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            cardinality,
            seed,
            repeat: None,
            gate: None,
            selector: None,
        }
    }

    pub fn with_repeat(mut self, repeat: RepeatCount) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn with_gate(mut self, gate: Chance) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the facet value set for a corpus of `total_docs` documents.
    ///
    /// Replaces any earlier value set and resets the field. Returns the
    /// number of facet values.
    pub fn build(&mut self, total_docs: usize) -> Result<usize, GeneratorError> {
        let cardinality = self.cardinality.cardinality(total_docs);
        if cardinality == 0 {
            return Err(GeneratorError::ZeroCardinality {
                field: self.name.clone(),
                total_docs,
            });
        }
        let mut values = build_vocabulary(&mut *self.source, cardinality, self.seed)?;

        // Facet frequency should not follow value length
        values.shuffle(&mut SeededRng::new(derive_seed(self.seed, 1)));

        let n = cardinality as f64;
        let peak = (n * 0.01).max(1.0);
        let spread = (n * 0.1).clamp(1.0, 500.0);
        let weighted = gaussian_choice(
            values,
            peak,
            spread,
            f64::MIN_POSITIVE,
            derive_seed(self.seed, 2),
        )?;
        self.selector = Some(TermChoice::new(weighted)?);
        self.reset();

        debug!(
            "Built {} facet values for '{}' ({} docs)",
            cardinality, self.name, total_docs
        );
        Ok(cardinality)
    }

    /// Facet values, once built.
    pub fn facet_terms(&self) -> Option<&[String]> {
        self.selector.as_ref().map(|s| s.items())
    }

    pub fn draw(&mut self) -> Result<FieldValue, GeneratorError> {
        let selector = self
            .selector
            .as_mut()
            .ok_or_else(|| GeneratorError::FacetNotBuilt(self.name.clone()))?;

        if let Some(gate) = &mut self.gate {
            if !gate.emit_one() {
                return Ok(FieldValue::Null);
            }
        }

        Ok(match &mut self.repeat {
            Some(repeat) => {
                let n = repeat.emit_one();
                FieldValue::List(selector.emit_many(n).into_iter().map(FieldValue::Str).collect())
            }
            None => FieldValue::Str(selector.emit_one()),
        })
    }

    pub fn reset(&mut self) {
        if let Some(selector) = &mut self.selector {
            selector.reset();
        }
        if let Some(repeat) = &mut self.repeat {
            repeat.reset();
        }
        if let Some(gate) = &mut self.gate {
            gate.reset();
        }
    }
}

// ============================================================================
// Schema fields
// ============================================================================

/// Any field of a benchmark schema.
pub enum SchemaField {
    Plain(Field),
    Search(SearchField),
    Facet(FacetField),
}

impl SchemaField {
    pub fn name(&self) -> &str {
        match self {
            Self::Plain(field) => field.name(),
            Self::Search(field) => field.name(),
            Self::Facet(field) => field.name(),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Plain(_) => FieldKind::Plain,
            Self::Search(_) => FieldKind::Search,
            Self::Facet(_) => FieldKind::Facet,
        }
    }

    pub fn draw(&mut self, slots: &FieldSlots) -> Result<FieldValue, GeneratorError> {
        match self {
            Self::Plain(field) => field.draw(slots),
            Self::Search(field) => field.draw(slots),
            Self::Facet(field) => field.draw(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Plain(field) => field.reset(),
            Self::Search(field) => field.reset(),
            Self::Facet(field) => field.reset(),
        }
    }
}
