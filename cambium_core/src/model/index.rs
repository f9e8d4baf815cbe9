// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-tree identity index: id → element lookup and uniqueness enforcement.

use alloc::string::String;
use core::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;

use super::id::ElementId;

/// Alphabet used for generated element ids: digits plus lowercase letters,
/// chosen for low transcription ambiguity.
pub const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated element ids.
///
/// With `36^8 ≈ 2.8 × 10^12` possible ids, the birthday bound puts the
/// probability of *any* collision among `n` registered elements at roughly
/// `n² / (2 · 36^8)` — about 1 in 56 million for a 10,000-element diagram.
/// Collisions are handled by regenerating, so this is a performance property,
/// not a correctness one.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Seed stream for per-index id generators.
///
/// `no_std` offers no entropy source, so generators are seeded from a global
/// counter and mixed; uniqueness within a tree comes from the retry loop in
/// [`IdIndex::generate_id`], never from generator quality.
static NEXT_SEED: AtomicU64 = AtomicU64::new(0x243F_6A88_85A3_08D3);

/// Splitmix64 stream for id generation.
#[derive(Clone, Debug)]
struct IdRng {
    state: u64,
}

impl IdRng {
    fn new() -> Self {
        Self {
            state: NEXT_SEED.fetch_add(0x9E37_79B9_7F4A_7C15, Ordering::Relaxed),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut mixed = self.state;
        mixed = (mixed ^ (mixed >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        mixed = (mixed ^ (mixed >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        mixed ^ (mixed >> 31)
    }
}

/// Map from element id to element handle for one tree.
///
/// Owned by the tree's root (concretely: by the [`Model`](super::Model)).
/// All mutation goes through the model's structural operations, which keep
/// the index contents exactly equal to the set of elements reachable from
/// the root; external code gets read-only access via
/// [`Model::index`](super::Model::index).
#[derive(Debug)]
pub struct IdIndex {
    map: HashMap<String, ElementId>,
    rng: IdRng,
    id_length: usize,
}

impl IdIndex {
    pub(crate) fn new() -> Self {
        Self {
            map: HashMap::new(),
            rng: IdRng::new(),
            id_length: DEFAULT_ID_LENGTH,
        }
    }

    /// Returns the element registered under `id`, if any.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ElementId> {
        self.map.get(id).copied()
    }

    /// Returns whether an element is registered under `id`.
    #[must_use]
    pub fn contains_id(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// Number of registered elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns whether no elements are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over all registered `(id, element)` pairs.
    ///
    /// Order is unspecified but stable for a given index state. The iterator
    /// borrows the index, so the tree cannot be structurally mutated while
    /// iteration is in progress.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ElementId)> + '_ {
        self.map.iter().map(|(id, el)| (id.as_str(), *el))
    }

    /// Generates a fresh id not present in the index and not rejected by
    /// `also_taken` (ids staged for registration in the current batch).
    ///
    /// Retries until unique; there is deliberately no attempt cap — see
    /// [`DEFAULT_ID_LENGTH`] for the collision bound that makes retries
    /// vanishingly rare at realistic tree sizes.
    pub(crate) fn generate_id<F>(&mut self, also_taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let mut id = String::with_capacity(self.id_length);
            let mut bits = self.rng.next_u64();
            for _ in 0..self.id_length {
                id.push(ID_ALPHABET[(bits % ID_ALPHABET.len() as u64) as usize] as char);
                bits /= ID_ALPHABET.len() as u64;
            }
            if !self.map.contains_key(&id) && !also_taken(&id) {
                return id;
            }
        }
    }

    pub(crate) fn insert(&mut self, id: String, el: ElementId) {
        self.map.insert(id, el);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<ElementId> {
        self.map.remove(id)
    }
}
