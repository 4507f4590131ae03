//! The emitter abstraction every value source implements.
//!
//! An emitter is a seedable, resettable stream of values. Besides producing
//! values it declares what it can promise about uniqueness, which the
//! vocabulary builder relies on to fail fast instead of looping forever.

use bench_core::FieldValue;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Multiplier used to spread derived seeds across the u64 space.
const SEED_SPREAD: u64 = 0x9E37_79B9_7F4A_7C15;

/// Trait for seedable value streams.
pub trait Emitter {
    /// Type of value produced.
    type Item;

    /// Produce one value.
    fn emit_one(&mut self) -> Self::Item;

    /// Produce `n` values.
    fn emit_many(&mut self, n: usize) -> Vec<Self::Item> {
        (0..n).map(|_| self.emit_one()).collect()
    }

    /// Whether every value this emitter produces is distinct.
    fn emits_unique(&self) -> bool {
        false
    }

    /// Upper bound on distinct values this emitter can produce.
    ///
    /// `None` means unlimited, or too large to matter.
    fn max_unique(&self) -> Option<u64> {
        None
    }

    /// Set the seed used by subsequent resets, and reset.
    fn seed(&mut self, seed: Option<u64>);

    /// Restart the random stream from the configured seed.
    fn reset(&mut self);
}

/// Boxed emitter for heterogeneous field configurations.
pub type BoxedEmitter<T> = Box<dyn Emitter<Item = T>>;

impl<E: Emitter + ?Sized> Emitter for Box<E> {
    type Item = E::Item;

    fn emit_one(&mut self) -> Self::Item {
        (**self).emit_one()
    }

    fn emit_many(&mut self, n: usize) -> Vec<Self::Item> {
        (**self).emit_many(n)
    }

    fn emits_unique(&self) -> bool {
        (**self).emits_unique()
    }

    fn max_unique(&self) -> Option<u64> {
        (**self).max_unique()
    }

    fn seed(&mut self, seed: Option<u64>) {
        (**self).seed(seed)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<E: Emitter + ?Sized> Emitter for &mut E {
    type Item = E::Item;

    fn emit_one(&mut self) -> Self::Item {
        (**self).emit_one()
    }

    fn emit_many(&mut self, n: usize) -> Vec<Self::Item> {
        (**self).emit_many(n)
    }

    fn emits_unique(&self) -> bool {
        (**self).emits_unique()
    }

    fn max_unique(&self) -> Option<u64> {
        (**self).max_unique()
    }

    fn seed(&mut self, seed: Option<u64>) {
        (**self).seed(seed)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Derive a sub-stream seed so sibling emitters do not share a stream.
pub fn derive_seed(seed: Option<u64>, salt: u64) -> Option<u64> {
    seed.map(|s| s.wrapping_add(salt.wrapping_add(1).wrapping_mul(SEED_SPREAD)))
}

/// A random stream that remembers its seed so it can be restarted.
///
/// With `None` as the seed every reset draws fresh OS entropy.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: Option<u64>,
    rng: StdRng,
}

impl SeededRng {
    /// Create a stream positioned at the start of `seed`.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            rng: Self::fresh(seed),
        }
    }

    fn fresh(seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// The configured seed.
    pub fn current_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Replace the seed and restart the stream.
    pub fn reseed(&mut self, seed: Option<u64>) {
        self.seed = seed;
        self.reset();
    }

    /// Restart the stream from the configured seed.
    pub fn reset(&mut self) {
        self.rng = Self::fresh(self.seed);
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.rng.fill_bytes(dst)
    }
}

/// Adapts an emitter of plain values into one of [`FieldValue`]s.
pub struct ValueEmitter<E> {
    inner: E,
}

impl<E> ValueEmitter<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E> Emitter for ValueEmitter<E>
where
    E: Emitter,
    E::Item: Into<FieldValue>,
{
    type Item = FieldValue;

    fn emit_one(&mut self) -> FieldValue {
        self.inner.emit_one().into()
    }

    fn emit_many(&mut self, n: usize) -> Vec<FieldValue> {
        self.inner.emit_many(n).into_iter().map(Into::into).collect()
    }

    fn emits_unique(&self) -> bool {
        self.inner.emits_unique()
    }

    fn max_unique(&self) -> Option<u64> {
        self.inner.max_unique()
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.inner.seed(seed)
    }

    fn reset(&mut self) {
        self.inner.reset()
    }
}
