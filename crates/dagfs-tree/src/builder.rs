//! Bottom-up Merkle tree construction.
//!
//! Files are split into [`CHUNK_SIZE`] leaves and wrapped in a fixed-fan-out
//! tree of list nodes; directories serialize their children into a single
//! tree object. Every object is hashed and deduplication-written the moment
//! it is built, before its parent is assembled, so a parent only ever holds
//! its children's hash/size pairs.

use tracing::debug;

use dagfs_crypto::DigestFactory;
use dagfs_store::BlockStore;
use dagfs_types::ObjectId;

use crate::error::{TreeError, TreeResult};
use crate::object::{Link, LinkKind, Object};
use crate::source::{DirSource, SourceNode};

/// Fixed chunk size for file leaves: 256 KiB.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Maximum number of children per tree node.
pub const FAN_OUT: usize = 4096;

/// Build and persist the full Merkle tree for `node`, returning the content
/// hash of the root.
///
/// Construction is recursive and bottom-up; each object is written exactly
/// once per distinct content (a repeated chunk or subtree anywhere in the
/// input incurs a single store write). The digest factory supplies one
/// independent instance per hash computation, so no digest state is shared
/// between objects.
pub fn add(
    store: &dyn BlockStore,
    node: SourceNode<'_>,
    digests: &dyn DigestFactory,
) -> TreeResult<ObjectId> {
    let builder = Builder { store, digests };
    let root = match node {
        SourceNode::File(file) => builder.build_file(file.content())?,
        SourceNode::Dir(dir) => builder.build_dir(dir)?,
    };
    debug!(
        root = %root.hash.short_hex(),
        size = root.size,
        kind = %root.kind,
        "built merkle root"
    );
    Ok(root.hash)
}

/// Number of tree levels needed above the raw bytes of a `len`-byte file so
/// that no single node exceeds [`FAN_OUT`] children: the minimal `height >= 1`
/// with `FAN_OUT^height >= ceil(len / CHUNK_SIZE)`.
fn tree_height(len: usize) -> usize {
    let leaves = (len as u64).div_ceil(CHUNK_SIZE as u64).max(1);
    let mut height = 1;
    let mut capacity = FAN_OUT as u64;
    while capacity < leaves {
        capacity *= FAN_OUT as u64;
        height += 1;
    }
    height
}

/// A built subtree: its root hash, the bytes it spans, and how a parent
/// should tag a link to it.
struct Built {
    hash: ObjectId,
    size: u64,
    kind: LinkKind,
}

struct Builder<'a> {
    store: &'a dyn BlockStore,
    digests: &'a dyn DigestFactory,
}

impl Builder<'_> {
    /// Hash a leaf's canonical wrapper encoding and store the bare chunk
    /// bytes under that hash (the leaf storage asymmetry).
    fn write_leaf(&self, chunk: &[u8]) -> TreeResult<ObjectId> {
        let wrapper = Object::leaf(chunk.to_vec());
        let encoded = wrapper
            .encode()
            .map_err(|e| TreeError::Serialization(e.to_string()))?;
        let id = self.digests.hash(&encoded);
        if !self.store.has(&id)? {
            self.store.put(&id, wrapper.into_data())?;
        }
        Ok(id)
    }

    /// Hash a non-leaf object's canonical encoding and store that same
    /// encoding under the hash.
    fn write_branch(&self, object: &Object) -> TreeResult<ObjectId> {
        let encoded = object
            .encode()
            .map_err(|e| TreeError::Serialization(e.to_string()))?;
        let id = self.digests.hash(&encoded);
        if !self.store.has(&id)? {
            self.store.put(&id, encoded)?;
        }
        Ok(id)
    }

    fn build_file(&self, content: &[u8]) -> TreeResult<Built> {
        // Whole small file: a single bare leaf, no wrapping list.
        if content.len() <= CHUNK_SIZE {
            let hash = self.write_leaf(content)?;
            return Ok(Built {
                hash,
                size: content.len() as u64,
                kind: LinkKind::Blob,
            });
        }
        self.build_level(content, tree_height(content.len()), 0)
    }

    /// Build one subtree of the given height starting at `offset`, consuming
    /// as many bytes as the height allows.
    fn build_level(&self, content: &[u8], height: usize, offset: usize) -> TreeResult<Built> {
        let mut offset = offset;

        if height == 1 {
            // The remaining bytes fit in one chunk: emit a bare leaf. This
            // also covers the last partial chunk of a deeper tree.
            if content.len() - offset <= CHUNK_SIZE {
                let chunk = &content[offset..];
                let hash = self.write_leaf(chunk)?;
                return Ok(Built {
                    hash,
                    size: chunk.len() as u64,
                    kind: LinkKind::Blob,
                });
            }

            let mut object = Object::branch();
            let mut size = 0u64;
            for _ in 0..FAN_OUT {
                let end = (offset + CHUNK_SIZE).min(content.len());
                let chunk = &content[offset..end];
                let hash = self.write_leaf(chunk)?;
                object.push_link(LinkKind::Blob, Link::unnamed(hash, chunk.len() as u64));
                size += chunk.len() as u64;
                offset = end;
                if offset >= content.len() {
                    break;
                }
            }
            let hash = self.write_branch(&object)?;
            return Ok(Built {
                hash,
                size,
                kind: LinkKind::List,
            });
        }

        let mut object = Object::branch();
        let mut size = 0u64;
        for _ in 0..FAN_OUT {
            if offset >= content.len() {
                break;
            }
            let child = self.build_level(content, height - 1, offset)?;
            object.push_link(child.kind, Link::unnamed(child.hash, child.size));
            offset += child.size as usize;
            size += child.size;
        }
        let hash = self.write_branch(&object)?;
        Ok(Built {
            hash,
            size,
            kind: LinkKind::List,
        })
    }

    fn build_dir(&self, dir: &dyn DirSource) -> TreeResult<Built> {
        let mut object = Object::branch();
        for child in dir.children() {
            match child {
                SourceNode::File(file) => {
                    let built = self.build_file(file.content())?;
                    object.push_link(built.kind, Link::new(file.name(), built.hash, file.len()));
                }
                SourceNode::Dir(sub) => {
                    let built = self.build_dir(sub)?;
                    object.push_link(LinkKind::Tree, Link::new(sub.name(), built.hash, sub.size()));
                }
            }
        }
        let hash = self.write_branch(&object)?;
        Ok(Built {
            hash,
            size: dir.size(),
            kind: LinkKind::Tree,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagfs_crypto::Blake3Factory;
    use dagfs_store::MemoryBlockStore;
    use crate::source::{MemoryDir, MemoryFile};

    fn content(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn add_file(store: &MemoryBlockStore, name: &str, bytes: Vec<u8>) -> ObjectId {
        let file = MemoryFile::new(name, bytes);
        add(store, file.as_node(), &Blake3Factory).unwrap()
    }

    // -----------------------------------------------------------------------
    // Height computation
    // -----------------------------------------------------------------------

    #[test]
    fn height_one_for_single_chunk() {
        assert_eq!(tree_height(0), 1);
        assert_eq!(tree_height(1), 1);
        assert_eq!(tree_height(CHUNK_SIZE), 1);
    }

    #[test]
    fn height_one_up_to_full_fan_out() {
        assert_eq!(tree_height(CHUNK_SIZE + 1), 1);
        assert_eq!(tree_height(FAN_OUT * CHUNK_SIZE), 1);
    }

    #[test]
    fn height_two_past_full_fan_out() {
        assert_eq!(tree_height(FAN_OUT * CHUNK_SIZE + 1), 2);
        assert_eq!(tree_height(FAN_OUT * FAN_OUT * CHUNK_SIZE), 2);
    }

    #[test]
    fn height_three_past_two_levels() {
        assert_eq!(tree_height(FAN_OUT * FAN_OUT * CHUNK_SIZE + 1), 3);
    }

    // -----------------------------------------------------------------------
    // Object counts
    // -----------------------------------------------------------------------

    #[test]
    fn empty_file_is_one_empty_block() {
        let store = MemoryBlockStore::new();
        let root = add_file(&store, "empty", Vec::new());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&root).unwrap().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn small_file_is_one_raw_block() {
        // Leaf asymmetry: the stored value under the root hash is the bare
        // content, not an encoding.
        let store = MemoryBlockStore::new();
        let bytes = content(100);
        let root = add_file(&store, "small", bytes.clone());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&root).unwrap().unwrap(), bytes);
    }

    #[test]
    fn chunk_boundary_is_still_one_block() {
        let store = MemoryBlockStore::new();
        add_file(&store, "exact", content(CHUNK_SIZE));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn one_byte_past_chunk_adds_a_list_node() {
        // Two leaves plus the list node above them.
        let store = MemoryBlockStore::new();
        let root = add_file(&store, "split", content(CHUNK_SIZE + 1));
        assert_eq!(store.len(), 3);

        let encoded = store.get(&root).unwrap().unwrap();
        let object = Object::decode(&encoded).unwrap();
        let entries = object.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, LinkKind::Blob);
        assert_eq!(entries[0].1.size, CHUNK_SIZE as u64);
        assert_eq!(entries[1].0, LinkKind::Blob);
        assert_eq!(entries[1].1.size, 1);
    }

    #[test]
    fn multi_chunk_sizes_sum_to_length() {
        let store = MemoryBlockStore::new();
        let len = 3 * CHUNK_SIZE + 17;
        let root = add_file(&store, "multi", content(len));

        let object = Object::decode(&store.get(&root).unwrap().unwrap()).unwrap();
        let total: u64 = object.links().iter().map(|link| link.size).sum();
        assert_eq!(total, len as u64);
    }

    // -----------------------------------------------------------------------
    // Determinism & deduplication
    // -----------------------------------------------------------------------

    #[test]
    fn identical_builds_yield_identical_roots() {
        let store_a = MemoryBlockStore::new();
        let store_b = MemoryBlockStore::new();
        let bytes = content(2 * CHUNK_SIZE + 9);
        let root_a = add_file(&store_a, "f", bytes.clone());
        let root_b = add_file(&store_b, "f", bytes);
        assert_eq!(root_a, root_b);
        assert_eq!(store_a.all_ids(), store_b.all_ids());
    }

    #[test]
    fn identical_file_added_twice_stores_nothing_new() {
        let store = MemoryBlockStore::new();
        add_file(&store, "first", content(CHUNK_SIZE + 1));
        let count = store.len();
        add_file(&store, "second", content(CHUNK_SIZE + 1));
        assert_eq!(store.len(), count);
    }

    #[test]
    fn shared_leading_chunk_is_stored_once() {
        let store = MemoryBlockStore::new();

        let mut a = content(CHUNK_SIZE);
        a.extend_from_slice(b"tail of file a");
        let mut b = content(CHUNK_SIZE);
        b.extend_from_slice(b"a different tail");

        add_file(&store, "a", a);
        add_file(&store, "b", b);

        // Shared chunk + two distinct tails + two distinct list roots.
        assert_eq!(store.len(), 5);
    }

    // -----------------------------------------------------------------------
    // Directory objects
    // -----------------------------------------------------------------------

    #[test]
    fn directory_links_carry_names_sizes_and_tags() {
        let store = MemoryBlockStore::new();
        let dir = MemoryDir::new("root")
            .with(MemoryFile::new("small.txt", content(10)))
            .with(MemoryFile::new("big.bin", content(CHUNK_SIZE + 1)))
            .with(MemoryDir::new("sub").with(MemoryFile::new("inner", content(7))));

        let root = add(&store, dir.as_node(), &Blake3Factory).unwrap();
        let object = Object::decode(&store.get(&root).unwrap().unwrap()).unwrap();
        let entries = object.entries().unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, LinkKind::Blob);
        assert_eq!(entries[0].1.name, "small.txt");
        assert_eq!(entries[0].1.size, 10);
        assert_eq!(entries[1].0, LinkKind::List);
        assert_eq!(entries[1].1.name, "big.bin");
        assert_eq!(entries[1].1.size, (CHUNK_SIZE + 1) as u64);
        assert_eq!(entries[2].0, LinkKind::Tree);
        assert_eq!(entries[2].1.name, "sub");
        assert_eq!(entries[2].1.size, 7);
    }

    #[test]
    fn empty_directory_stores_its_encoding() {
        let store = MemoryBlockStore::new();
        let dir = MemoryDir::new("empty");
        let root = add(&store, dir.as_node(), &Blake3Factory).unwrap();

        let object = Object::decode(&store.get(&root).unwrap().unwrap()).unwrap();
        assert!(object.links().is_empty());
        assert!(object.data().is_empty());
    }

    #[test]
    fn directory_hash_depends_on_child_order() {
        let store = MemoryBlockStore::new();
        let ab = MemoryDir::new("d")
            .with(MemoryFile::new("a", content(1)))
            .with(MemoryFile::new("b", content(2)));
        let ba = MemoryDir::new("d")
            .with(MemoryFile::new("b", content(2)))
            .with(MemoryFile::new("a", content(1)));

        let root_ab = add(&store, ab.as_node(), &Blake3Factory).unwrap();
        let root_ba = add(&store, ba.as_node(), &Blake3Factory).unwrap();
        assert_ne!(root_ab, root_ba);
    }

    #[test]
    fn identical_subtrees_are_deduplicated() {
        let store = MemoryBlockStore::new();
        let twin = || MemoryDir::new("twin").with(MemoryFile::new("f", content(50)));
        let dir = MemoryDir::new("root").with(twin()).with(twin());

        add(&store, dir.as_node(), &Blake3Factory).unwrap();
        // leaf + twin dir object (written once) + root.
        assert_eq!(store.len(), 3);
    }
}
