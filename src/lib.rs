//! A persistent hash array mapped trie (PHAMT) keyed by fixed-width
//! signed integers, with a transient (THAMT) builder for fast bulk
//! mutation.
//!
//! [`Phamt`] is immutable and cheap to clone: every operation returns a
//! new map that shares every subtree untouched by the change with the
//! map it was derived from. [`Thamt`] trades that sharing for single-owner,
//! in-place mutation — useful when building up a map from many inserts
//! before it is ever shared — and freezes back into a [`Phamt`] with
//! [`Thamt::persistent`].
//!
//! The hash width `W` (16, 32, 64 or 128 bits) is a compile-time knob, a
//! const generic defaulting to 64. It bounds the domain of representable
//! keys to `[key_min, key_max]` for that width; see [`PhamtError::KeyDomainError`].

mod error;
mod iter;
mod layout;
mod node;
mod phamt;
mod thamt;

pub use error::{PhamtError, Result};
pub use iter::Iter;
pub use phamt::Phamt;
pub use thamt::Thamt;

/// The inclusive lower bound of the key domain for hash width `W`.
pub fn key_min<const W: u32>() -> i128 {
    layout::key_min(W)
}

/// The inclusive upper bound of the key domain for hash width `W`.
pub fn key_max<const W: u32>() -> i128 {
    layout::key_max(W)
}
