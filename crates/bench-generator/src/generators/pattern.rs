//! Pattern-based string generator.
//!
//! Supports placeholders:
//! - `{index}` - emission index, counted from zero since the last reset
//! - `{uuid}` - random UUID from the seeded stream
//! - `{rand:N}` - random N-digit number

use crate::emitter::{Emitter, SeededRng};
use crate::generators::uuid::generate_uuid_v4;
use rand::Rng;

/// Generate a string based on a pattern with placeholders.
pub fn generate_pattern<R: Rng>(pattern: &str, rng: &mut R, index: u64) -> String {
    let mut result = pattern.replace("{index}", &index.to_string());

    while result.contains("{uuid}") {
        result = result.replacen("{uuid}", &generate_uuid_v4(rng).to_string(), 1);
    }

    // Replace {rand:N} left to right, resuming after each substitution
    let mut search_from = 0;
    while let Some(offset) = result[search_from..].find("{rand:") {
        let start = search_from + offset;
        let Some(close) = result[start..].find('}') else {
            break;
        };
        let end = start + close;
        match result[start + 6..end].parse::<usize>() {
            Ok(digits) => {
                let random_num = generate_random_digits(rng, digits);
                result = format!("{}{}{}", &result[..start], random_num, &result[end + 1..]);
                search_from = start + random_num.len();
            }
            Err(_) => search_from = end + 1,
        }
    }

    result
}

/// Generate a random number with exactly N digits.
fn generate_random_digits<R: Rng>(rng: &mut R, digits: usize) -> String {
    if digits == 0 {
        return String::new();
    }

    let mut result = String::with_capacity(digits);

    // No leading zero
    result.push(char::from(b'0' + rng.random_range(1..10u8)));
    for _ in 1..digits {
        result.push(char::from(b'0' + rng.random_range(0..10u8)));
    }

    result
}

/// Emits pattern strings, advancing `{index}` on every draw.
#[derive(Debug, Clone)]
pub struct Pattern {
    pattern: String,
    index: u64,
    rng: SeededRng,
}

impl Pattern {
    pub fn new(pattern: impl Into<String>, seed: Option<u64>) -> Self {
        Self {
            pattern: pattern.into(),
            index: 0,
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for Pattern {
    type Item = String;

    fn emit_one(&mut self) -> String {
        let value = generate_pattern(&self.pattern, &mut self.rng, self.index);
        self.index += 1;
        value
    }

    fn emits_unique(&self) -> bool {
        self.pattern.contains("{index}") || self.pattern.contains("{uuid}")
    }

    fn max_unique(&self) -> Option<u64> {
        if self.emits_unique() || self.pattern.contains("{rand:") {
            None
        } else {
            Some(1)
        }
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
        self.index = 0;
    }

    fn reset(&mut self) {
        self.rng.reset();
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generate_pattern_index() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("user_{index}@example.com", &mut rng, 123);

        assert_eq!(value, "user_123@example.com");
    }

    #[test]
    fn test_generate_pattern_uuid() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("id-{uuid}", &mut rng, 0);

        assert!(value.starts_with("id-"));
        assert_eq!(value.len(), 3 + 36);
    }

    #[test]
    fn test_generate_pattern_random_digits() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("code-{rand:6}", &mut rng, 0);

        assert!(value.starts_with("code-"));
        assert_eq!(value.len(), 5 + 6);
        assert!(value[5..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_pattern_invalid_rand_left_alone() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_pattern("{rand:x}-{rand:2}", &mut rng, 0);

        assert!(value.starts_with("{rand:x}-"));
        assert_eq!(value.len(), "{rand:x}-".len() + 2);
    }

    #[test]
    fn test_pattern_emitter_index_resets() {
        let mut pattern = Pattern::new("doc_{index}", Some(1));
        assert_eq!(pattern.emit_many(2), vec!["doc_0", "doc_1"]);

        pattern.reset();
        assert_eq!(pattern.emit_one(), "doc_0");
        assert!(pattern.emits_unique());
    }
}
