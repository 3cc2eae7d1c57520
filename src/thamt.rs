//! The transient builder.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{PhamtError, Result};
use crate::layout;
use crate::node::{self, Generation, Node, ThamtDissoc};
use crate::phamt::Phamt;

/// A process-wide counter minting fresh, never-repeating generation
/// tags. Starts at 1 so that the persistent generation tag (`0`) never
/// collides with a live THAMT.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> Generation {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// A single-owner, mutable builder over the same trie shape as
/// [`Phamt`]. Every node it touches is tagged with this transient's own
/// generation; a node is mutated in place exactly when it is both
/// uniquely owned (`Arc::get_mut` succeeds) *and* carries that tag — two
/// conditions that together rule out an "incidentally unique" node
/// (e.g. because the [`Phamt`] it was thawed from has since been
/// dropped) being mistaken for one this builder may mutate freely.
///
/// Consuming `persistent()` freezes the builder into a [`Phamt`] and
/// makes every further call return [`PhamtError::TransientUsed`].
pub struct Thamt<V, const W: u32 = 64> {
    root: Arc<Node<V, W>>,
    count: u64,
    generation: Generation,
    consumed: bool,
}

impl<V, const W: u32> Thamt<V, W> {
    /// A fresh transient with no entries.
    pub fn from_empty() -> Self {
        Thamt {
            root: Node::empty_root(),
            count: 0,
            generation: next_generation(),
            consumed: false,
        }
    }

    /// A fresh transient that starts from `source`'s contents. The
    /// source's nodes are untouched (they still carry generation `0`, or
    /// another transient's tag) until this builder actually mutates
    /// them, at which point they are path-copied and re-tagged exactly
    /// once, same as any other shared node.
    pub fn from_persistent(source: &Phamt<V, W>) -> Self {
        Thamt {
            root: Arc::clone(source.root_arc()),
            count: source.len() as u64,
            generation: next_generation(),
            consumed: false,
        }
    }

    fn check_live(&self) -> Result<()> {
        if self.consumed {
            Err(PhamtError::TransientUsed)
        } else {
            Ok(())
        }
    }

    fn check_domain(key: i128) -> Result<u128> {
        if key < layout::key_min(W) || key > layout::key_max(W) {
            Err(PhamtError::KeyDomainError)
        } else {
            Ok(layout::canonical_hash(W, key))
        }
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn get(&self, key: i128) -> Result<Option<&Arc<V>>> {
        self.check_live()?;
        let hash = Self::check_domain(key)?;
        Ok(node::get(&self.root, hash))
    }

    /// Binds `key` to `value`, mutating in place where possible.
    pub fn set(&mut self, key: i128, value: V) -> Result<()> {
        self.check_live()?;
        let hash = Self::check_domain(key)?;
        let inserted = node::thamt_set(&mut self.root, hash, value, self.generation);
        if inserted {
            self.count += 1;
        }
        Ok(())
    }

    /// Removes `key`, mutating in place where possible and applying
    /// single-child collapse on the way back up.
    pub fn del(&mut self, key: i128) -> Result<()> {
        self.check_live()?;
        let hash = Self::check_domain(key)?;
        match node::thamt_del(&mut self.root, hash, self.generation) {
            ThamtDissoc::NotFound => Err(PhamtError::KeyNotFound),
            ThamtDissoc::Removed => {
                self.root = Node::empty_root();
                self.count -= 1;
                Ok(())
            }
            ThamtDissoc::Updated => {
                self.count -= 1;
                Ok(())
            }
        }
    }

    /// Freezes this builder into a [`Phamt`], consuming it. The nodes it
    /// built keep whatever generation tag this transient minted; that
    /// tag is simply never compared again, since no other transient can
    /// ever mint the same one and this builder can no longer mutate
    /// anything after `consumed` is set.
    pub fn persistent(mut self) -> Result<Phamt<V, W>> {
        self.check_live()?;
        self.consumed = true;
        Ok(Phamt::from_root(Arc::clone(&self.root), self.count))
    }
}
