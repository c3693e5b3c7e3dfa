//! Content-addressed Merkle trees over file and directory trees.
//!
//! This crate is the core of dagfs. [`add`] splits files into fixed-size
//! chunks, assembles a fixed-fan-out hash tree over them (and over directory
//! structure), and persists every object in a pluggable [`BlockStore`] keyed
//! by content hash. [`resolve`] walks a stored tree by root hash and
//! slash-delimited path and reconstructs the original bytes.
//!
//! # Object model
//!
//! Every tree node is an [`Object`] of ordered [`Link`]s plus a data buffer.
//! A *leaf* object carries raw chunk bytes and no links; a *non-leaf* object
//! carries one aligned 4-byte type tag per link ([`LinkKind`]) and no content
//! of its own. Link order is semantically significant: it encodes byte order
//! for files and iteration order for directories.
//!
//! # Leaf storage asymmetry
//!
//! A leaf's content address is the digest of its canonical encoding
//! (`{links: [], data: chunk}`), but the value stored under that address is
//! the bare chunk bytes. Non-leaf objects hash and store the same encoding.
//! The resolver exploits this: a `blob`-tagged fetch returns content
//! directly, anything else is decoded before further traversal.

pub mod builder;
pub mod error;
pub mod object;
pub mod resolver;
pub mod source;

pub use builder::{add, CHUNK_SIZE, FAN_OUT};
pub use error::{TreeError, TreeResult};
pub use object::{Link, LinkKind, Object, ObjectError, TAG_LEN};
pub use resolver::resolve;
pub use source::{DirSource, FileSource, MemoryDir, MemoryEntry, MemoryFile, SourceNode};

// Re-export collaborator types for ergonomic imports.
pub use dagfs_crypto::{Blake3Factory, DigestFactory};
pub use dagfs_store::{BlockStore, MemoryBlockStore};
pub use dagfs_types::ObjectId;
