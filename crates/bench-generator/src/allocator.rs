//! Injection chance allocation across search fields.
//!
//! Each search field can only carry a term when it has a value, so its
//! ceiling is the share of documents where it is non-blank. Given a target
//! number of injected terms per document, fields whose ceiling is at or
//! below an even share inject every time they can, and the rest of the
//! target is spread over the remaining fields the same way.

use crate::generators::numeric::clamp_chance;
use std::collections::BTreeMap;

/// Injection chance per field so that `sum(chance * ceiling)` hits
/// `target_ratio` whenever the ceilings allow it.
///
/// `max_ratio_per_field` maps field name to ceiling. Every returned chance
/// is within [0, 1]. A NaN target allocates nothing.
pub fn allocate(
    target_ratio: f64,
    max_ratio_per_field: &BTreeMap<String, f64>,
) -> BTreeMap<String, f64> {
    let target_ratio = if target_ratio.is_nan() { 0.0 } else { target_ratio };
    let mut chances = BTreeMap::new();
    allocate_into(target_ratio, max_ratio_per_field.iter().collect(), &mut chances);
    chances
}

fn allocate_into(
    target_ratio: f64,
    fields: Vec<(&String, &f64)>,
    chances: &mut BTreeMap<String, f64>,
) {
    if fields.is_empty() {
        return;
    }

    let share = target_ratio / fields.len() as f64;
    let (capped, over): (Vec<_>, Vec<_>) = fields.into_iter().partition(|(_, c)| **c <= share);

    if capped.is_empty() {
        for (name, ceiling) in over {
            chances.insert(name.clone(), clamp_chance(share / ceiling));
        }
        return;
    }

    let consumed: f64 = capped.iter().map(|(_, c)| **c).sum();
    for (name, _) in capped {
        chances.insert(name.clone(), 1.0);
    }
    allocate_into((target_ratio - consumed).max(0.0), over, chances);
}
