//! UUID value generator.

use crate::emitter::{Emitter, SeededRng};
use rand::Rng;
use uuid::Uuid;

/// Generate a random UUID v4 using the provided RNG.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// Hyphenated UUID v4 strings drawn from the seeded stream.
#[derive(Debug, Clone)]
pub struct UuidV4 {
    rng: SeededRng,
}

impl UuidV4 {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: SeededRng::new(seed),
        }
    }
}

impl Emitter for UuidV4 {
    type Item = String;

    fn emit_one(&mut self) -> String {
        generate_uuid_v4(&mut self.rng).to_string()
    }

    fn emits_unique(&self) -> bool {
        true
    }

    fn seed(&mut self, seed: Option<u64>) {
        self.rng.reseed(seed);
    }

    fn reset(&mut self) {
        self.rng.reset();
    }
}
