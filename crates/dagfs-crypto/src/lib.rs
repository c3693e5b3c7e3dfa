//! Digest capability for dagfs.
//!
//! Content addressing is injected, not hard-wired: callers hand the tree
//! builder and resolver a [`DigestFactory`], and every independent hash
//! computation runs on a fresh [`Digest`] instance from that factory. This
//! is what makes sibling subtree builds safe to run in parallel — there is
//! no shared digest to reset between objects.
//!
//! All crypto operations wrap established libraries — no custom hashing.

pub mod digest;

pub use digest::{Blake3Factory, Digest, DigestFactory};
