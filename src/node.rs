//! The trie cell and the path-copying/splitting machinery shared by
//! PHAMT's persistent operations and THAMT's transient ones.
//!
//! Nodes are bitmap-indexed: a `bitmap` records which of the
//! `max_cells(depth)` slots at this node's depth are occupied, and the
//! compact `cells` array holds exactly `popcount(bitmap)` entries, one
//! per set bit, in ascending slot order.
//!
//! Ownership is refcounted via `Arc`. A node that is uniquely owned
//! (`Arc::get_mut` succeeds) *and* carries the current THAMT's
//! generation tag may be mutated in place; any other node is
//! path-copied once and re-tagged.

use std::sync::Arc;

use crate::layout;

/// A generation tag. `0` is reserved for nodes that were built as part of
/// a persistent (non-transient) operation and can never compare equal to
/// a live THAMT's generation, which are minted starting at `1` from a
/// process-wide counter (see `thamt::next_generation`).
pub(crate) type Generation = u64;

pub(crate) const PERSISTENT_GENERATION: Generation = 0;

pub(crate) struct Node<V, const W: u32> {
    pub(crate) depth: u32,
    /// A representative full hash from this node's subtree. Bits at or
    /// above `start_bit(depth) + shift(depth)` — i.e. every bit this
    /// node does not itself resolve via its own slice — are guaranteed
    /// to match every key actually stored beneath this node. Bits below
    /// that threshold may disagree with any individual stored key; they
    /// only ever seed divergence search.
    pub(crate) address: u128,
    pub(crate) generation: Generation,
    pub(crate) kind: NodeKind<V, W>,
}

pub(crate) enum NodeKind<V, const W: u32> {
    Branch(BranchNode<V, W>),
    Twig(TwigNode<V>),
}

pub(crate) struct BranchNode<V, const W: u32> {
    pub(crate) bitmap: u32,
    pub(crate) children: Box<[Arc<Node<V, W>>]>,
}

pub(crate) struct TwigNode<V> {
    pub(crate) bitmap: u32,
    pub(crate) values: Box<[Arc<V>]>,
}

/// Maps a slot index to its position in a bitmap-compressed cell array:
/// the number of set bits below `slot`.
#[inline]
pub(crate) fn popcount_below(bitmap: u32, slot: u32) -> usize {
    (bitmap & ((1u32 << slot) - 1)).count_ones() as usize
}

impl<V, const W: u32> Node<V, W> {
    /// The unique empty PHAMT root: a depth-0 branch with no children.
    pub(crate) fn empty_root() -> Arc<Self> {
        Arc::new(Node {
            depth: 0,
            address: 0,
            generation: PERSISTENT_GENERATION,
            kind: NodeKind::Branch(BranchNode {
                bitmap: 0,
                children: Box::new([]),
            }),
        })
    }

    pub(crate) fn is_empty_root(&self) -> bool {
        self.depth == 0
            && match &self.kind {
                NodeKind::Branch(b) => b.bitmap == 0,
                NodeKind::Twig(_) => false,
            }
    }

    /// A freshly minted twig holding a single `(hash, value)` pair —
    /// the "singleton subtree" that realizes path compression: inserting
    /// the first key into an empty slot never materializes a chain of
    /// one-child interior nodes, it jumps straight to a twig.
    pub(crate) fn singleton(hash: u128, value: V, generation: Generation) -> Arc<Self> {
        let depth = layout::twig_depth(W);
        let slot = layout::slice_index(W, depth, hash);
        Arc::new(Node {
            depth,
            address: hash,
            generation,
            kind: NodeKind::Twig(TwigNode {
                bitmap: 1u32 << slot,
                values: Box::new([Arc::new(value)]),
            }),
        })
    }

    /// Whether this node may hold `hash`: every bit this node does not
    /// resolve itself (i.e. everything above its own slice) must agree
    /// with `address`, generalized to nodes that were reached via a
    /// compressed — skipped-levels — path.
    #[inline]
    pub(crate) fn address_matches(&self, hash: u128) -> bool {
        let threshold = layout::start_bit(W, self.depth) + layout::shift(W, self.depth);
        let mask = layout::high_mask(threshold);
        (hash & mask) == (self.address & mask)
    }

    #[cfg(debug_assertions)]
    pub(crate) fn debug_check_invariants(&self) {
        match &self.kind {
            NodeKind::Branch(b) => {
                debug_assert_eq!(
                    b.bitmap.count_ones() as usize,
                    b.children.len(),
                    "bitmap/cells disagreement on a branch"
                );
                if !self.is_empty_root() {
                    debug_assert!(b.bitmap != 0, "persistent interior node must not be empty");
                }
                let max = layout::max_cells(W, self.depth);
                let slot_mask: u32 = if max >= 32 { u32::MAX } else { max - 1 };
                debug_assert!(
                    b.bitmap & !slot_mask == 0,
                    "bitmap has bits set beyond max_cells at this depth"
                );
            }
            NodeKind::Twig(t) => {
                debug_assert_eq!(
                    t.bitmap.count_ones() as usize,
                    t.values.len(),
                    "bitmap/cells disagreement on a twig"
                );
                debug_assert!(t.bitmap != 0, "a twig must hold at least one entry");
                debug_assert_eq!(self.depth, layout::twig_depth(W));
            }
        }
    }
}

/// Finds the shallowest depth in `[0, limit_depth)` at which the slices
/// of `a` and `b` disagree. Guaranteed to find one: callers only invoke
/// this once `address_matches` has already failed for a node at
/// `limit_depth`, which is only possible if some depth below it
/// disagrees.
pub(crate) fn first_diverging_depth(w: u32, a: u128, b: u128, limit_depth: u32) -> u32 {
    for depth in 0..limit_depth {
        if layout::slice_index(w, depth, a) != layout::slice_index(w, depth, b) {
            return depth;
        }
    }
    unreachable!("address_matches failed but no diverging depth was found")
}

/// Builds the two-child branch that splits `existing` (a node whose
/// stored `address` disagrees with `hash` somewhere above it) from a
/// freshly inserted `(hash, value)` pair: finds the shallowest
/// diverging depth and introduces a branch there with exactly two of
/// its `max_cells` slots set.
pub(crate) fn split<V, const W: u32>(
    existing: Arc<Node<V, W>>,
    hash: u128,
    value: V,
    generation: Generation,
) -> Arc<Node<V, W>> {
    let dd = first_diverging_depth(W, hash, existing.address, existing.depth);
    let existing_slot = layout::slice_index(W, dd, existing.address);
    let new_slot = layout::slice_index(W, dd, hash);
    debug_assert_ne!(existing_slot, new_slot);

    let new_leaf = Node::singleton(hash, value, generation);
    let bitmap = (1u32 << existing_slot) | (1u32 << new_slot);
    let children: Box<[Arc<Node<V, W>>]> = if existing_slot < new_slot {
        Box::new([existing, new_leaf])
    } else {
        Box::new([new_leaf, existing])
    };
    let node = Arc::new(Node {
        depth: dd,
        address: hash,
        generation,
        kind: NodeKind::Branch(BranchNode { bitmap, children }),
    });
    #[cfg(debug_assertions)]
    node.debug_check_invariants();
    node
}

/// Recursive lookup, shared by `get` and `contains`.
pub(crate) fn get<'a, V, const W: u32>(node: &'a Node<V, W>, hash: u128) -> Option<&'a Arc<V>> {
    if !node.address_matches(hash) {
        return None;
    }
    match &node.kind {
        NodeKind::Twig(twig) => {
            let slot = layout::slice_index(W, node.depth, hash);
            let bit = 1u32 << slot;
            if twig.bitmap & bit == 0 {
                None
            } else {
                Some(&twig.values[popcount_below(twig.bitmap, slot)])
            }
        }
        NodeKind::Branch(branch) => {
            let slot = layout::slice_index(W, node.depth, hash);
            let bit = 1u32 << slot;
            if branch.bitmap & bit == 0 {
                None
            } else {
                get(&branch.children[popcount_below(branch.bitmap, slot)], hash)
            }
        }
    }
}

/// Recursive, persistent `assoc`. Returns the new node and whether
/// `hash` was newly inserted (as opposed to an in-place value
/// replacement), so the caller can maintain `count`.
pub(crate) fn assoc<V, const W: u32>(
    node: &Arc<Node<V, W>>,
    hash: u128,
    value: V,
) -> (Arc<Node<V, W>>, bool) {
    if !node.address_matches(hash) {
        return (
            split(Arc::clone(node), hash, value, PERSISTENT_GENERATION),
            true,
        );
    }
    match &node.kind {
        NodeKind::Twig(twig) => {
            let slot = layout::slice_index(W, node.depth, hash);
            let bit = 1u32 << slot;
            let idx = popcount_below(twig.bitmap, slot);
            let existed = twig.bitmap & bit != 0;
            let mut values: Vec<Arc<V>> = twig.values.to_vec();
            if existed {
                values[idx] = Arc::new(value);
            } else {
                values.insert(idx, Arc::new(value));
            }
            let new_node = Arc::new(Node {
                depth: node.depth,
                address: node.address,
                generation: PERSISTENT_GENERATION,
                kind: NodeKind::Twig(TwigNode {
                    bitmap: twig.bitmap | bit,
                    values: values.into_boxed_slice(),
                }),
            });
            #[cfg(debug_assertions)]
            new_node.debug_check_invariants();
            (new_node, !existed)
        }
        NodeKind::Branch(branch) => {
            let slot = layout::slice_index(W, node.depth, hash);
            let bit = 1u32 << slot;
            let idx = popcount_below(branch.bitmap, slot);
            let (bitmap, children, inserted) = if branch.bitmap & bit != 0 {
                let (new_child, inserted) = assoc(&branch.children[idx], hash, value);
                let mut children = branch.children.to_vec();
                children[idx] = new_child;
                (branch.bitmap, children, inserted)
            } else {
                let new_leaf = Node::singleton(hash, value, PERSISTENT_GENERATION);
                let mut children = branch.children.to_vec();
                children.insert(idx, new_leaf);
                (branch.bitmap | bit, children, true)
            };
            let new_node = Arc::new(Node {
                depth: node.depth,
                address: node.address,
                generation: PERSISTENT_GENERATION,
                kind: NodeKind::Branch(BranchNode {
                    bitmap,
                    children: children.into_boxed_slice(),
                }),
            });
            #[cfg(debug_assertions)]
            new_node.debug_check_invariants();
            (new_node, inserted)
        }
    }
}

/// Outcome of a recursive `dissoc`/`del` walk.
pub(crate) enum DissocResult<V, const W: u32> {
    /// The key was absent; the subtree is unchanged.
    NotFound,
    /// The subtree's last entry was just removed; it no longer exists.
    Removed,
    /// The subtree changed shape but still holds at least one entry.
    Updated(Arc<Node<V, W>>),
}

/// Recursive, persistent `dissoc`, including single-child collapse: when
/// a branch's removal leaves it with exactly one remaining child, that
/// child is lifted directly into the parent's slot, skipping this level
/// entirely — the mirror image of the path-compressed
/// `singleton`/`split` insertion above.
pub(crate) fn dissoc<V, const W: u32>(node: &Arc<Node<V, W>>, hash: u128) -> DissocResult<V, W> {
    if !node.address_matches(hash) {
        return DissocResult::NotFound;
    }
    match &node.kind {
        NodeKind::Twig(twig) => {
            let slot = layout::slice_index(W, node.depth, hash);
            let bit = 1u32 << slot;
            if twig.bitmap & bit == 0 {
                return DissocResult::NotFound;
            }
            if twig.bitmap.count_ones() == 1 {
                return DissocResult::Removed;
            }
            let idx = popcount_below(twig.bitmap, slot);
            let mut values: Vec<Arc<V>> = twig.values.to_vec();
            values.remove(idx);
            let new_node = Arc::new(Node {
                depth: node.depth,
                address: node.address,
                generation: PERSISTENT_GENERATION,
                kind: NodeKind::Twig(TwigNode {
                    bitmap: twig.bitmap & !bit,
                    values: values.into_boxed_slice(),
                }),
            });
            #[cfg(debug_assertions)]
            new_node.debug_check_invariants();
            DissocResult::Updated(new_node)
        }
        NodeKind::Branch(branch) => {
            let slot = layout::slice_index(W, node.depth, hash);
            let bit = 1u32 << slot;
            if branch.bitmap & bit == 0 {
                return DissocResult::NotFound;
            }
            let idx = popcount_below(branch.bitmap, slot);
            match dissoc(&branch.children[idx], hash) {
                DissocResult::NotFound => DissocResult::NotFound,
                DissocResult::Removed => {
                    let new_bitmap = branch.bitmap & !bit;
                    if new_bitmap == 0 {
                        DissocResult::Removed
                    } else if new_bitmap.count_ones() == 1 {
                        let mut children = branch.children.to_vec();
                        children.remove(idx);
                        DissocResult::Updated(children.into_iter().next().unwrap())
                    } else {
                        let mut children = branch.children.to_vec();
                        children.remove(idx);
                        let new_node = Arc::new(Node {
                            depth: node.depth,
                            address: node.address,
                            generation: PERSISTENT_GENERATION,
                            kind: NodeKind::Branch(BranchNode {
                                bitmap: new_bitmap,
                                children: children.into_boxed_slice(),
                            }),
                        });
                        #[cfg(debug_assertions)]
                        new_node.debug_check_invariants();
                        DissocResult::Updated(new_node)
                    }
                }
                DissocResult::Updated(new_child) => {
                    let mut children = branch.children.to_vec();
                    children[idx] = new_child;
                    let new_node = Arc::new(Node {
                        depth: node.depth,
                        address: node.address,
                        generation: PERSISTENT_GENERATION,
                        kind: NodeKind::Branch(BranchNode {
                            bitmap: branch.bitmap,
                            children: children.into_boxed_slice(),
                        }),
                    });
                    #[cfg(debug_assertions)]
                    new_node.debug_check_invariants();
                    DissocResult::Updated(new_node)
                }
            }
        }
    }
}

/// Transient `set`: mutates in place when `*node` is uniquely owned and
/// already tagged with `generation`; otherwise path-copies exactly once
/// and re-tags. Returns whether the key was newly inserted.
pub(crate) fn thamt_set<V, const W: u32>(
    node: &mut Arc<Node<V, W>>,
    hash: u128,
    value: V,
    generation: Generation,
) -> bool {
    if !node.address_matches(hash) {
        let existing = Arc::clone(node);
        *node = split(existing, hash, value, generation);
        return true;
    }

    let owned = Arc::get_mut(node).is_some_and(|n| n.generation == generation);
    if !owned {
        let fresh = Arc::new((**node).shallow_clone(generation));
        *node = fresh;
    }
    // `node` is now uniquely owned and tagged with `generation`.
    let n = Arc::get_mut(node).expect("just made unique above");
    match &mut n.kind {
        NodeKind::Twig(twig) => {
            let slot = layout::slice_index(W, n.depth, hash);
            let bit = 1u32 << slot;
            let idx = popcount_below(twig.bitmap, slot);
            let existed = twig.bitmap & bit != 0;
            if existed {
                twig.values[idx] = Arc::new(value);
            } else {
                let mut values: Vec<Arc<V>> = std::mem::take(&mut twig.values).into_vec();
                values.insert(idx, Arc::new(value));
                twig.values = values.into_boxed_slice();
                twig.bitmap |= bit;
            }
            #[cfg(debug_assertions)]
            n.debug_check_invariants();
            !existed
        }
        NodeKind::Branch(branch) => {
            let slot = layout::slice_index(W, n.depth, hash);
            let bit = 1u32 << slot;
            if branch.bitmap & bit != 0 {
                let idx = popcount_below(branch.bitmap, slot);
                let inserted = thamt_set(&mut branch.children[idx], hash, value, generation);
                inserted
            } else {
                let idx = popcount_below(branch.bitmap, slot);
                let new_leaf = Node::singleton(hash, value, generation);
                let mut children: Vec<Arc<Node<V, W>>> = std::mem::take(&mut branch.children).into_vec();
                children.insert(idx, new_leaf);
                branch.children = children.into_boxed_slice();
                branch.bitmap |= bit;
                #[cfg(debug_assertions)]
                n.debug_check_invariants();
                true
            }
        }
    }
}

/// Outcome of a transient `del` walk (the in-place counterpart of
/// [`DissocResult`]): `Updated` means `*node` already reflects the
/// removal (mutated in place or path-copied in place); `Removed` means
/// the subtree vanished and the caller must drop this slot entirely.
pub(crate) enum ThamtDissoc {
    NotFound,
    Removed,
    Updated,
}

/// Transient `del`. Mirrors [`dissoc`]'s recursive shape — including
/// single-child collapse — but mutates in place wherever `*node` is
/// uniquely owned and already tagged with `generation`, path-copying
/// (via [`ensure_owned`]) only the nodes on the path to the removed key
/// that are still shared.
pub(crate) fn thamt_del<V, const W: u32>(
    node: &mut Arc<Node<V, W>>,
    hash: u128,
    generation: Generation,
) -> ThamtDissoc {
    if !node.address_matches(hash) {
        return ThamtDissoc::NotFound;
    }

    let slot = layout::slice_index(W, node.depth, hash);
    let bit = 1u32 << slot;
    let is_twig = matches!(node.kind, NodeKind::Twig(_));
    let bitmap = match &node.kind {
        NodeKind::Twig(t) => t.bitmap,
        NodeKind::Branch(b) => b.bitmap,
    };
    if bitmap & bit == 0 {
        return ThamtDissoc::NotFound;
    }

    if is_twig {
        if bitmap.count_ones() == 1 {
            return ThamtDissoc::Removed;
        }
        ensure_owned(node, generation);
        let n = Arc::get_mut(node).expect("just made unique above");
        if let NodeKind::Twig(twig) = &mut n.kind {
            let idx = popcount_below(twig.bitmap, slot);
            let mut values: Vec<Arc<V>> = std::mem::take(&mut twig.values).into_vec();
            values.remove(idx);
            twig.values = values.into_boxed_slice();
            twig.bitmap &= !bit;
        }
        #[cfg(debug_assertions)]
        n.debug_check_invariants();
        return ThamtDissoc::Updated;
    }

    // Branch: become uniquely owned before taking `&mut` into the child
    // array, then recurse into the addressed child.
    ensure_owned(node, generation);
    let idx = {
        let n = Arc::get_mut(node).expect("just made unique above");
        match &n.kind {
            NodeKind::Branch(b) => popcount_below(b.bitmap, slot),
            NodeKind::Twig(_) => unreachable!(),
        }
    };
    let child_outcome = {
        let n = Arc::get_mut(node).expect("still unique");
        match &mut n.kind {
            NodeKind::Branch(b) => thamt_del(&mut b.children[idx], hash, generation),
            NodeKind::Twig(_) => unreachable!(),
        }
    };

    match child_outcome {
        ThamtDissoc::NotFound => ThamtDissoc::NotFound,
        ThamtDissoc::Updated => ThamtDissoc::Updated,
        ThamtDissoc::Removed => {
            let (new_bitmap, lifted) = {
                let n = Arc::get_mut(node).expect("still unique");
                match &mut n.kind {
                    NodeKind::Branch(b) => {
                        let new_bitmap = b.bitmap & !bit;
                        let mut children: Vec<Arc<Node<V, W>>> =
                            std::mem::take(&mut b.children).into_vec();
                        children.remove(idx);
                        let lifted = if new_bitmap.count_ones() == 1 {
                            Some(Arc::clone(&children[0]))
                        } else {
                            None
                        };
                        b.bitmap = new_bitmap;
                        b.children = children.into_boxed_slice();
                        (new_bitmap, lifted)
                    }
                    NodeKind::Twig(_) => unreachable!(),
                }
            };
            if new_bitmap == 0 {
                ThamtDissoc::Removed
            } else if let Some(lifted) = lifted {
                *node = lifted;
                ThamtDissoc::Updated
            } else {
                #[cfg(debug_assertions)]
                node.debug_check_invariants();
                ThamtDissoc::Updated
            }
        }
    }
}

/// Ensures `*node` is uniquely owned and tagged with `generation`,
/// path-copying once if necessary.
fn ensure_owned<V, const W: u32>(node: &mut Arc<Node<V, W>>, generation: Generation) {
    let owned = Arc::get_mut(node).is_some_and(|n| n.generation == generation);
    if !owned {
        *node = Arc::new((**node).shallow_clone(generation));
    }
}

impl<V, const W: u32> Node<V, W> {
    /// A shallow copy: same bitmap/address, children or values array
    /// re-pointed (cheap `Arc`/child-pointer clones, no recursive deep
    /// copy), re-tagged with a new generation.
    fn shallow_clone(&self, generation: Generation) -> Self {
        Node {
            depth: self.depth,
            address: self.address,
            generation,
            kind: match &self.kind {
                NodeKind::Branch(b) => NodeKind::Branch(BranchNode {
                    bitmap: b.bitmap,
                    children: b.children.clone(),
                }),
                NodeKind::Twig(t) => NodeKind::Twig(TwigNode {
                    bitmap: t.bitmap,
                    values: t.values.clone(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popcount_below_counts_only_lower_bits() {
        let bitmap = 0b1011_0100u32;
        assert_eq!(popcount_below(bitmap, 0), 0);
        assert_eq!(popcount_below(bitmap, 3), 1); // bit 2 is set
        assert_eq!(popcount_below(bitmap, 5), 2); // bits 2 and 4
        assert_eq!(popcount_below(bitmap, 8), 4); // every set bit
    }

    #[test]
    fn empty_root_has_no_cells_and_is_recognized_as_empty() {
        let root: Arc<Node<u32, 64>> = Node::empty_root();
        assert!(root.is_empty_root());
        match &root.kind {
            NodeKind::Branch(b) => assert_eq!(b.bitmap, 0),
            NodeKind::Twig(_) => panic!("empty root must be a branch"),
        }
    }

    #[test]
    fn singleton_places_the_value_at_the_twigs_own_slot() {
        let hash: u128 = 0xABCD;
        let leaf: Arc<Node<&str, 64>> = Node::singleton(hash, "v", PERSISTENT_GENERATION);
        assert_eq!(leaf.depth, layout::twig_depth(64));
        match &leaf.kind {
            NodeKind::Twig(t) => {
                let slot = layout::slice_index(64, leaf.depth, hash);
                assert_eq!(t.bitmap, 1u32 << slot);
                assert_eq!(*t.values[0], "v");
            }
            NodeKind::Branch(_) => panic!("singleton must be a twig"),
        }
    }

    #[test]
    fn address_matches_rejects_a_hash_diverging_above_this_nodes_slice() {
        let a: Arc<Node<u32, 64>> = Node::singleton(0b10_00000, 1, PERSISTENT_GENERATION);
        assert!(a.address_matches(0b10_00000));
        // Same twig slot, but the bits above the twig's own slice differ.
        assert!(!a.address_matches(0b01_00000));
    }

    #[test]
    fn first_diverging_depth_finds_the_shallowest_mismatch() {
        let w = 64;
        let d = layout::twig_depth(w);
        let a: u128 = 0;
        let b: u128 = 1u128 << layout::start_bit(w, d); // only the twig slice differs
        assert_eq!(first_diverging_depth(w, a, b, d), d);
    }

    #[test]
    fn split_places_children_in_ascending_slot_order() {
        // Two hashes that agree below bit 15 but diverge well above the
        // twig's own slice, forcing a split somewhere in the interior.
        let existing_hash: u128 = 0;
        let new_hash: u128 = 1u128 << 15;
        let existing: Arc<Node<&str, 64>> =
            Node::singleton(existing_hash, "existing", PERSISTENT_GENERATION);
        let dd = first_diverging_depth(64, new_hash, existing.address, existing.depth);
        let existing_slot = layout::slice_index(64, dd, existing_hash);
        let new_slot = layout::slice_index(64, dd, new_hash);

        let branch = split(existing, new_hash, "new", PERSISTENT_GENERATION);
        assert_eq!(branch.depth, dd);
        match &branch.kind {
            NodeKind::Branch(b) => {
                assert_eq!(b.bitmap, (1u32 << existing_slot) | (1u32 << new_slot));
                assert_eq!(b.children.len(), 2);
                let (lo, hi) = if existing_slot < new_slot { (0, 1) } else { (1, 0) };
                assert!(
                    matches!(&b.children[lo].kind, NodeKind::Twig(t) if *t.values[0] == "existing")
                );
                assert!(matches!(&b.children[hi].kind, NodeKind::Twig(t) if *t.values[0] == "new"));
            }
            NodeKind::Twig(_) => panic!("split must produce a branch"),
        }
    }

    #[test]
    fn assoc_then_get_round_trips_and_dissoc_removes() {
        let root: Arc<Node<i32, 64>> = Node::empty_root();
        let (root, inserted) = assoc(&root, 10, 100);
        assert!(inserted);
        let (root, inserted) = assoc(&root, 20, 200);
        assert!(inserted);
        assert_eq!(get(&root, 10).map(|v| **v), Some(100));
        assert_eq!(get(&root, 20).map(|v| **v), Some(200));
        assert_eq!(get(&root, 30), None);

        match dissoc(&root, 10) {
            DissocResult::Updated(new_root) => {
                assert_eq!(get(&new_root, 10), None);
                assert_eq!(get(&new_root, 20).map(|v| **v), Some(200));
            }
            _ => panic!("expected the 2-entry tree to survive removing one key"),
        }
        match dissoc(&root, 999) {
            DissocResult::NotFound => {}
            _ => panic!("removing an absent key must report NotFound"),
        }
    }

    #[test]
    fn thamt_set_mutates_in_place_for_a_matching_generation() {
        let generation: Generation = 1;
        let mut node: Arc<Node<i32, 64>> = Node::singleton(1, 10, generation);
        let before = Arc::as_ptr(&node);
        let inserted = thamt_set(&mut node, 1, 11, generation);
        assert!(!inserted); // replacing an existing key, not adding one
        assert_eq!(Arc::as_ptr(&node), before, "same generation must mutate in place");
        assert_eq!(get(&node, 1).map(|v| **v), Some(11));
    }

    #[test]
    fn thamt_set_path_copies_when_the_generation_differs() {
        let mut node: Arc<Node<i32, 64>> = Node::singleton(1, 10, PERSISTENT_GENERATION);
        let before = Arc::as_ptr(&node);
        let inserted = thamt_set(&mut node, 1, 11, 7);
        assert!(!inserted);
        assert_ne!(Arc::as_ptr(&node), before, "a foreign generation must be copied, not mutated");
        assert_eq!(node.generation, 7);
    }

    #[test]
    fn thamt_del_reports_removed_when_the_last_entry_is_cleared() {
        let mut node: Arc<Node<i32, 64>> = Node::singleton(1, 10, 1);
        match thamt_del(&mut node, 1, 1) {
            ThamtDissoc::Removed => {}
            _ => panic!("deleting a twig's only entry must report Removed"),
        }
        match thamt_del(&mut node, 2, 1) {
            ThamtDissoc::NotFound => {}
            _ => panic!("deleting an absent key must report NotFound"),
        }
    }
}
