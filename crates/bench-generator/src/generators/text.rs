//! Random word and text generators.

use crate::emitter::{derive_seed, BoxedEmitter, Emitter, SeededRng};
use rand::Rng;

const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// `base^min + base^(min+1) + ... + base^max`, or `None` on overflow.
fn sum_of_powers(base: u64, min: usize, max: usize) -> Option<u64> {
    (min..=max).try_fold(0u64, |acc, exp| {
        let exp = u32::try_from(exp).ok()?;
        acc.checked_add(base.checked_pow(exp)?)
    })
}

/// Random words of a bounded length drawn from an alphabet.
#[derive(Debug, Clone)]
pub struct Words {
    min_length: usize,
    max_length: usize,
    alphabet: Vec<char>,
    rng: SeededRng,
}

impl Words {
    /// Words over `alphabet`, or lowercase ASCII letters when `None`.
    pub fn new(
        min_length: usize,
        max_length: usize,
        alphabet: Option<&str>,
        seed: Option<u64>,
    ) -> Self {
        let mut alphabet: Vec<char> = alphabet
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_ALPHABET)
            .chars()
            .collect();
        alphabet.sort_unstable();
        alphabet.dedup();
        Self {
            min_length,
            max_length: max_length.max(min_length),
            alphabet,
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for Words {
    type Item = String;

    fn emit_one(&mut self) -> String {
        let len = self.rng.random_range(self.min_length..=self.max_length);
        (0..len)
            .map(|_| self.alphabet[self.rng.random_range(0..self.alphabet.len())])
            .collect()
    }

    fn max_unique(&self) -> Option<u64> {
        sum_of_powers(self.alphabet.len() as u64, self.min_length, self.max_length)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}

/// Space-separated runs of words from a word source.
pub struct Text {
    min_words: usize,
    max_words: usize,
    word: BoxedEmitter<String>,
    rng: SeededRng,
}

impl Text {
    pub fn new(
        min_words: usize,
        max_words: usize,
        mut word: BoxedEmitter<String>,
        seed: Option<u64>,
    ) -> Self {
        word.seed(derive_seed(seed, 0));
        Self {
            min_words,
            max_words: max_words.max(min_words),
            word,
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for Text {
    type Item = String;

    fn emit_one(&mut self) -> String {
        let n = self.rng.random_range(self.min_words..=self.max_words);
        self.word.emit_many(n).join(" ")
    }

    fn max_unique(&self) -> Option<u64> {
        let words = self.word.max_unique()?;
        sum_of_powers(words, self.min_words, self.max_words)
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
        self.word.seed(derive_seed(seed, 0));
    }

    fn reset(&mut self) {
        self.rng.reset();
        self.word.reset();
    }
}
