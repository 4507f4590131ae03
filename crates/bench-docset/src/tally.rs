//! Facet value counting.

use bench_core::{Document, FieldValue};
use std::collections::{BTreeMap, HashMap};

/// Values of one facet field with their counts, most frequent first.
pub type FacetRanking = Vec<(String, u64)>;

/// Rankings keyed by facet field name.
pub type FacetCounts = BTreeMap<String, FacetRanking>;

#[derive(Debug, Clone, Default)]
struct ValueCounts {
    counts: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl ValueCounts {
    fn add(&mut self, value: String) {
        match self.index.get(&value) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(value.clone(), self.counts.len());
                self.counts.push((value, 1));
            }
        }
    }

    fn ranking(&self) -> FacetRanking {
        let mut ranking = self.counts.clone();
        // Stable sort keeps first-seen order among equal counts
        ranking.sort_by(|a, b| b.1.cmp(&a.1));
        ranking
    }
}

/// Accumulates how often each value of each facet field occurs.
///
/// Lists are flattened so every element counts once, and null values are
/// skipped. Numbers and booleans are counted by their string form.
#[derive(Debug, Clone, Default)]
pub struct FacetTally {
    fields: BTreeMap<String, ValueCounts>,
    total_docs: usize,
}

impl FacetTally {
    pub fn new<I, S>(facet_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: facet_fields
                .into_iter()
                .map(|name| (name.into(), ValueCounts::default()))
                .collect(),
            total_docs: 0,
        }
    }

    /// Count the facet values found in `doc`.
    pub fn add_document(&mut self, doc: &Document) {
        self.total_docs += 1;
        for (name, counts) in self.fields.iter_mut() {
            if let Some(value) = doc.get(name) {
                add_value(counts, value);
            }
        }
    }

    /// Number of documents counted so far.
    pub fn total_docs(&self) -> usize {
        self.total_docs
    }

    pub fn ranking(&self, field: &str) -> Option<FacetRanking> {
        self.fields.get(field).map(ValueCounts::ranking)
    }

    pub fn rankings(&self) -> FacetCounts {
        self.fields
            .iter()
            .map(|(name, counts)| (name.clone(), counts.ranking()))
            .collect()
    }
}

fn add_value(counts: &mut ValueCounts, value: &FieldValue) {
    match value {
        FieldValue::List(items) => {
            for item in items {
                add_value(counts, item);
            }
        }
        other => {
            if let Some(term) = other.to_term() {
                counts.add(term);
            }
        }
    }
}
