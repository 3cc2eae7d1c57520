//! The persistent map.

use std::fmt;
use std::sync::Arc;

use crate::error::{PhamtError, Result};
use crate::iter::{Frame, Iter};
use crate::layout;
use crate::node::{self, DissocResult, Node};

/// A persistent, immutable hash array mapped trie keyed by signed
/// integers in `[key_min::<W>(), key_max::<W>()]`.
///
/// `clone()` is O(1): it bumps the root's `Arc` strong count. `W` fixes
/// the key width at the type level and defaults to 64, the common
/// host-integer case.
pub struct Phamt<V, const W: u32 = 64> {
    root: Arc<Node<V, W>>,
    count: u64,
}

impl<V, const W: u32> Clone for Phamt<V, W> {
    fn clone(&self) -> Self {
        Phamt {
            root: Arc::clone(&self.root),
            count: self.count,
        }
    }
}

impl<V, const W: u32> Default for Phamt<V, W> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V: fmt::Debug, const W: u32> fmt::Debug for Phamt<V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V, const W: u32> Phamt<V, W> {
    /// The canonical empty map. O(1), no allocation.
    pub fn empty() -> Self {
        Phamt {
            root: Node::empty_root(),
            count: 0,
        }
    }

    pub(crate) fn root_arc(&self) -> &Arc<Node<V, W>> {
        &self.root
    }

    pub(crate) fn from_root(root: Arc<Node<V, W>>, count: u64) -> Self {
        Phamt { root, count }
    }

    /// The number of entries stored.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn check_domain(key: i128) -> Result<u128> {
        if key < layout::key_min(W) || key > layout::key_max(W) {
            Err(PhamtError::KeyDomainError)
        } else {
            Ok(layout::canonical_hash(W, key))
        }
    }

    /// Looks up `key`, returning `None` if absent or out of domain.
    pub fn get(&self, key: i128) -> Option<&Arc<V>> {
        let hash = Self::check_domain(key).ok()?;
        node::get(&self.root, hash)
    }

    /// Like [`Phamt::get`] but returns `default` for a missing key.
    pub fn get_or<'a>(&'a self, key: i128, default: &'a Arc<V>) -> &'a Arc<V> {
        self.get(key).unwrap_or(default)
    }

    /// Looks up `key`, returning [`PhamtError::KeyNotFound`] or
    /// [`PhamtError::KeyDomainError`] instead of `None`.
    pub fn require(&self, key: i128) -> Result<&Arc<V>> {
        let hash = Self::check_domain(key)?;
        node::get(&self.root, hash).ok_or(PhamtError::KeyNotFound)
    }

    pub fn contains(&self, key: i128) -> bool {
        self.get(key).is_some()
    }

    /// Returns a new map with `key` bound to `value`, sharing every
    /// subtree untouched by the update.
    pub fn assoc(&self, key: i128, value: V) -> Result<Self> {
        let hash = Self::check_domain(key)?;
        let (new_root, inserted) = node::assoc(&self.root, hash, value);
        Ok(Phamt {
            root: new_root,
            count: self.count + inserted as u64,
        })
    }

    /// Returns a new map with `key` removed. A missing key is a no-op:
    /// the returned map is unchanged (structurally identical to `self`),
    /// not an error — only the key domain is fallible here. Applies
    /// single-child collapse on its way back up.
    pub fn dissoc(&self, key: i128) -> Result<Self> {
        let hash = Self::check_domain(key)?;
        match node::dissoc(&self.root, hash) {
            DissocResult::NotFound => Ok(self.clone()),
            DissocResult::Removed => Ok(Self::empty()),
            DissocResult::Updated(new_root) => Ok(Phamt {
                root: new_root,
                count: self.count - 1,
            }),
        }
    }

    /// Builds a map from an iterator of `(key, value)` pairs by way of a
    /// transient build-then-freeze, so a bulk load pays for path-copying
    /// once per touched node rather than once per key.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (i128, V)>,
    {
        let mut t = crate::thamt::Thamt::from_empty();
        for (k, v) in pairs {
            t.set(k, v)?;
        }
        t.persistent()
    }

    /// Builds a map from a plain sequence of values, assigning keys
    /// `0, 1, 2, …` in iteration order.
    pub fn from_sequence<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
    {
        Self::from_pairs(
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i as i128, v)),
        )
    }

    /// Iterates every `(key, value)` pair in ascending bitmap-slot order
    /// at every level. The iterator owns `Arc` clones of its path
    /// directly, so it stays valid even if `self` (and every other
    /// handle to this map) is dropped mid-iteration.
    pub fn iter(&self) -> Iter<V, W> {
        Iter::new(vec![Frame::new(Arc::clone(&self.root))])
    }
}

impl<'a, V, const W: u32> IntoIterator for &'a Phamt<V, W> {
    type Item = (i128, Arc<V>);
    type IntoIter = Iter<V, W>;

    fn into_iter(self) -> Iter<V, W> {
        self.iter()
    }
}
