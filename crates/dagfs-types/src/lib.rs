//! Foundation types for dagfs.
//!
//! Every other dagfs crate depends on `dagfs-types`. The crate is
//! deliberately small: it defines the content address used to key every
//! stored object and nothing else. Hashing itself lives behind the digest
//! capability in `dagfs-crypto` so that the algorithm stays injectable.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
