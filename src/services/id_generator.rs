//! Identifier generation for bookmark nodes.
//!
//! Production code uses random UUIDs. Tests inject a seeded generator so that
//! identifiers are reproducible from run to run.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use uuid::{Builder, Uuid};

use crate::types::bookmark::BookmarkId;

/// Source of fresh, unique bookmark identifiers.
pub trait IdGenerator {
    fn next_id(&mut self) -> BookmarkId;
}

/// Random version 4 UUIDs from the operating system RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> BookmarkId {
        BookmarkId::from_uuid(Uuid::new_v4())
    }
}

/// Deterministic version 4 UUIDs drawn from a seeded `StdRng`.
pub struct SeededIdGenerator {
    rng: StdRng,
}

impl SeededIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl IdGenerator for SeededIdGenerator {
    fn next_id(&mut self) -> BookmarkId {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);
        BookmarkId::from_uuid(Builder::from_random_bytes(bytes).into_uuid())
    }
}
