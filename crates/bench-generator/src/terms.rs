//! Search term vocabularies and the exhaustive-before-repeat selector.
//!
//! ```text
//!  word source ──► build_vocabulary ──► vocabulary (length, lexical order)
//!                        │                   │
//!                        ▼                   ▼
//!                  build_phrases ◄── bell-weighted word chooser
//!                        │
//!                        ▼
//!       vocabulary + phrases ──► WeightedChoice ──► TermChoice
//! ```
//!
//! [`TermChoice`] is what lets a heavily skewed term distribution still
//! produce every term at least once: it walks the whole set without
//! replacement before falling back to weighted draws.

use crate::emitter::{derive_seed, Emitter};
use crate::error::GeneratorError;
use crate::generators::choice::{gaussian_choice, gaussian_weights, UniqueChoice, WeightedChoice};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

/// Consecutive batches without a new value before a source is considered
/// unable to reach the requested size.
const MAX_STALLED_BATCHES: usize = 100;

/// Default share of the vocabulary size given to phrases of 2, 3, 4 and 5
/// words.
const DEFAULT_PHRASE_FACTORS: [f64; 4] = [0.5, 0.3, 0.16, 0.04];

/// Sort terms by character length, then lexically.
pub fn sort_terms(terms: &mut [String]) {
    terms.sort_by(|a, b| {
        a.chars()
            .count()
            .cmp(&b.chars().count())
            .then_with(|| a.cmp(b))
    });
}

/// Draw `size` distinct values from `source`, sorted by (length, lexical).
///
/// The source is reseeded with `seed` first. Sources that declare fewer
/// possible unique values than `size` fail before anything is drawn.
pub fn build_vocabulary<E>(
    source: &mut E,
    size: usize,
    seed: Option<u64>,
) -> Result<Vec<String>, GeneratorError>
where
    E: Emitter<Item = String> + ?Sized,
{
    source.seed(seed);

    if let Some(available) = source.max_unique() {
        if available < size as u64 {
            return Err(GeneratorError::Capacity {
                available,
                requested: size,
            });
        }
    }

    let mut terms = if source.emits_unique() {
        source.emit_many(size)
    } else {
        let mut seen: HashSet<String> = HashSet::with_capacity(size);
        let mut terms: Vec<String> = Vec::with_capacity(size);
        let mut stalled = 0;

        while terms.len() < size {
            let before = terms.len();
            for term in source.emit_many(size - terms.len()) {
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }

            if terms.len() == before {
                stalled += 1;
                if stalled >= MAX_STALLED_BATCHES {
                    return Err(GeneratorError::Stalled {
                        achieved: terms.len(),
                        requested: size,
                    });
                }
            } else {
                stalled = 0;
            }
        }
        terms
    };

    sort_terms(&mut terms);
    Ok(terms)
}

/// Joins a fixed number of draws from a word source into one phrase.
pub struct Phrase<E> {
    words: E,
    length: usize,
}

impl<E: Emitter<Item = String>> Phrase<E> {
    pub fn new(words: E, length: usize) -> Self {
        Self { words, length }
    }
}

impl<E: Emitter<Item = String>> Emitter for Phrase<E> {
    type Item = String;

    fn emit_one(&mut self) -> String {
        self.words.emit_many(self.length).join(" ")
    }

    fn max_unique(&self) -> Option<u64> {
        let words = self.words.max_unique()?;
        words.checked_pow(u32::try_from(self.length).ok()?)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.words.seed(seed);
    }

    fn reset(&mut self) {
        self.words.reset();
    }
}

/// Build distinct phrases; `counts_by_length[i]` phrases of `i + 2` words.
///
/// Each length bucket is sorted on its own before being appended, so the
/// result runs from short two-word phrases to long ones.
pub fn build_phrases<E>(
    word_source: &mut E,
    counts_by_length: &[usize],
    seed: Option<u64>,
) -> Result<Vec<String>, GeneratorError>
where
    E: Emitter<Item = String> + ?Sized,
{
    let mut phrases = Vec::with_capacity(counts_by_length.iter().sum());
    for (idx, &count) in counts_by_length.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let mut phrase = Phrase::new(&mut *word_source, idx + 2);
        let bucket = build_vocabulary(&mut phrase, count, derive_seed(seed, idx as u64))?;
        debug!("Built {} phrases of {} words", bucket.len(), idx + 2);
        phrases.extend(bucket);
    }
    Ok(phrases)
}

/// Phrase counts for 2, 3, 4 and 5 words scaled to the vocabulary size.
pub fn default_phrase_counts(vocab_size: usize) -> Vec<usize> {
    DEFAULT_PHRASE_FACTORS
        .iter()
        .map(|f| (vocab_size as f64 * f).round() as usize)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Emitting each item once, without replacement
    Unique,
    /// Every item has been emitted; weighted draws with replacement
    Repeat,
}

/// Exhaustive-before-repeat selector.
///
/// Until every item has been emitted once, draws come from a
/// without-replacement source using the same weights; after that, and until
/// the next reset, draws come from the weighted source.
#[derive(Debug, Clone)]
pub struct TermChoice<T> {
    weighted: WeightedChoice<T>,
    unique: UniqueChoice<T>,
    phase: Phase,
}

/// A term selector shared by every search field of a schema.
pub type SharedTermChoice = Rc<RefCell<TermChoice<String>>>;

impl<T: Clone> TermChoice<T> {
    /// Wrap a weighted source; its weights (or uniform) also drive the
    /// without-replacement phase.
    pub fn new(weighted: WeightedChoice<T>) -> Result<Self, GeneratorError> {
        let unique_seed = derive_seed(weighted.current_seed(), 0);
        let unique = UniqueChoice::from_weighted(&weighted, unique_seed)?;
        Ok(Self {
            weighted,
            unique,
            phase: Phase::Unique,
        })
    }

    /// Every item this selector can emit.
    pub fn items(&self) -> &[T] {
        self.weighted.items()
    }

    /// Whether every item has been emitted since the last reset.
    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Repeat || self.unique.remaining() == 0
    }

    /// Share this selector between fields.
    pub fn into_shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }
}

impl<T: Clone> Emitter for TermChoice<T> {
    type Item = T;

    fn emit_one(&mut self) -> T {
        if self.phase == Phase::Unique {
            match self.unique.try_emit_one() {
                Ok(item) => return item,
                Err(_) => self.phase = Phase::Repeat,
            }
        }
        self.weighted.emit_one()
    }

    fn emit_many(&mut self, n: usize) -> Vec<T> {
        if self.phase == Phase::Repeat {
            return self.weighted.emit_many(n);
        }
        match self.unique.try_emit_many(n) {
            Ok(items) => items,
            Err(_) => {
                let mut items = self.unique.emit_remaining();
                self.phase = Phase::Repeat;
                let fill = n - items.len();
                items.extend(self.weighted.emit_many(fill));
                items
            }
        }
    }

    fn max_unique(&self) -> Option<u64> {
        Some(self.items().len() as u64)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.weighted.seed(seed);
        self.unique.seed(derive_seed(seed, 0));
        self.phase = Phase::Unique;
    }

    fn reset(&mut self) {
        self.weighted.reset();
        self.unique.reset();
        self.phase = Phase::Unique;
    }
}

/// Build the search term selector.
///
/// The vocabulary is `vocab_size` words from `word_source`. Phrases are
/// composed from a word chooser that favours mid-length vocabulary words,
/// with `phrase_counts` per length (scaled defaults when `None`). The
/// selector weights the whole term list with a broad bell curve centred on
/// its midpoint.
pub fn make_search_term_selector<E>(
    word_source: &mut E,
    vocab_size: usize,
    phrase_counts: Option<&[usize]>,
    seed: Option<u64>,
) -> Result<TermChoice<String>, GeneratorError>
where
    E: Emitter<Item = String> + ?Sized,
{
    let vocabulary = build_vocabulary(word_source, vocab_size, seed)?;

    let size = vocabulary.len() as f64;
    let mut word_chooser = gaussian_choice(
        vocabulary.clone(),
        size * 0.5,
        size * 0.2,
        f64::MIN_POSITIVE,
        derive_seed(seed, 1),
    )?;

    let counts = match phrase_counts {
        Some(counts) => counts.to_vec(),
        None => default_phrase_counts(vocab_size),
    };
    let phrases = build_phrases(&mut word_chooser, &counts, derive_seed(seed, 2))?;

    let mut terms = vocabulary;
    terms.extend(phrases);

    let n = terms.len() as f64;
    let weights = gaussian_weights(terms.len(), n * 0.5, n * 0.4, f64::MIN_POSITIVE);
    debug!("Search term selector has {} terms", terms.len());
    TermChoice::new(WeightedChoice::new(terms, Some(weights), derive_seed(seed, 3))?)
}
