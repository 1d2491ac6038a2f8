//! Hash containers used across the crate.
//!
//! Lookups here are either keyed by [`TypeId`] (already a high-quality
//! hash, passed through untouched) or by short strings (hashed with a
//! fixed `foldhash` seed so iteration order is stable across runs).

use core::any::TypeId;
use core::hash::{BuildHasher, Hasher};

use foldhash::fast::{FixedState, FoldHasher};

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6B8A_1D90_37C4_52EF);

/// Fixed hash state: results depend only on the input.
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// A [`hashbrown::HashMap`] with a fixed-seed hasher.
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

// -----------------------------------------------------------------------------
// TypeIdMap

/// A no-op hasher that passes the last written `u64` through.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHasher {
    hash: u64,
}

impl Hasher for NoOpHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.hash = self.hash.rotate_left(8).wrapping_add(*byte as u64);
        }
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.hash = i;
    }
}

#[derive(Copy, Clone, Default, Debug)]
pub struct NoOpHashState;

impl BuildHasher for NoOpHashState {
    type Hasher = NoOpHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        NoOpHasher { hash: 0 }
    }
}

/// A map container with [`TypeId`] as the fixed key type.
///
/// [`TypeId`] is itself a hash, so the hasher does no extra work.
#[derive(Debug)]
pub struct TypeIdMap<V>(hashbrown::HashMap<TypeId, V, NoOpHashState>);

impl<V> TypeIdMap<V> {
    /// Creates an empty `TypeIdMap`.
    #[inline]
    pub const fn new() -> Self {
        Self(hashbrown::HashMap::with_hasher(NoOpHashState))
    }

    /// Whether the map contains the given key.
    #[inline]
    pub fn contains(&self, key: &TypeId) -> bool {
        self.0.contains_key(key)
    }

    /// Returns a reference to the value for `key`, if present.
    #[inline]
    pub fn get(&self, key: &TypeId) -> Option<&V> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value for `key`, if present.
    #[inline]
    pub fn get_mut(&mut self, key: &TypeId) -> Option<&mut V> {
        self.0.get_mut(key)
    }

    /// Inserts or overwrites the value for `key`.
    #[inline]
    pub fn insert(&mut self, key: TypeId, value: V) -> Option<V> {
        self.0.insert(key, value)
    }

    /// Inserts the value produced by `make` only if `key` is vacant.
    ///
    /// Returns `true` if the value was inserted.
    pub fn try_insert(&mut self, key: TypeId, make: impl FnOnce() -> V) -> bool {
        match self.0.entry(key) {
            hashbrown::hash_map::Entry::Occupied(_) => false,
            hashbrown::hash_map::Entry::Vacant(entry) => {
                entry.insert(make());
                true
            }
        }
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the values.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.0.values()
    }
}

impl<V> Default for TypeIdMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_insert_keeps_first_value() {
        let mut map = TypeIdMap::new();
        let key = TypeId::of::<u8>();

        assert!(map.try_insert(key, || 1));
        assert!(!map.try_insert(key, || 2));
        assert_eq!(map.get(&key), Some(&1));
    }

    #[test]
    fn fixed_state_is_deterministic() {
        use core::hash::Hash;

        let a = {
            let mut h = FixedHashState.build_hasher();
            "qux".hash(&mut h);
            h.finish()
        };
        let b = {
            let mut h = FixedHashState.build_hasher();
            "qux".hash(&mut h);
            h.finish()
        };
        assert_eq!(a, b);
    }
}
