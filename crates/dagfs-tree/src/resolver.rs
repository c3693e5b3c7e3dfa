//! Path resolution and file reassembly over stored trees.
//!
//! Resolution exactly inverts construction using only link names and the
//! aligned type tags: `tree` links are decoded and descended, `blob` links
//! are fetched as raw content (the leaf storage asymmetry), and `list` links
//! are decoded and reassembled by concatenating their children in link
//! order, which by construction is byte-offset order.
//!
//! Every fetched value is verified against its content address before use;
//! raw leaf bytes are verified by re-wrapping them in an empty-links object
//! and hashing that encoding.

use tracing::debug;

use dagfs_crypto::DigestFactory;
use dagfs_store::BlockStore;
use dagfs_types::ObjectId;

use crate::error::{TreeError, TreeResult};
use crate::object::{Link, LinkKind, Object};

/// Reconstruct the byte content addressed by `path` under `root`.
///
/// The path is slash-delimited and root-relative: its leading empty segment
/// is skipped and matching starts at the second segment. An absent hash or
/// an unmatched segment yields `Ok(None)`; store failures, undecodable
/// objects, and hash mismatches are errors.
pub fn resolve(
    store: &dyn BlockStore,
    root: &ObjectId,
    path: &str,
    digests: &dyn DigestFactory,
) -> TreeResult<Option<Vec<u8>>> {
    let resolver = Resolver { store, digests };
    let Some(object) = resolver.fetch_object(root)? else {
        debug!(root = %root.short_hex(), path, "root object not found");
        return Ok(None);
    };
    let segments: Vec<&str> = path.split('/').collect();
    let result = resolver.resolve_in(root, &object, &segments, 1)?;
    debug!(
        root = %root.short_hex(),
        path,
        found = result.is_some(),
        "resolved path"
    );
    Ok(result)
}

struct Resolver<'a> {
    store: &'a dyn BlockStore,
    digests: &'a dyn DigestFactory,
}

impl Resolver<'_> {
    /// Fetch and decode a non-leaf object, verifying its encoding hashes
    /// back to `id`.
    fn fetch_object(&self, id: &ObjectId) -> TreeResult<Option<Object>> {
        let Some(bytes) = self.store.get(id)? else {
            return Ok(None);
        };
        let computed = self.digests.hash(&bytes);
        if computed != *id {
            return Err(TreeError::HashMismatch { id: *id, computed });
        }
        let object = Object::decode(&bytes).map_err(|e| TreeError::decode(*id, e))?;
        Ok(Some(object))
    }

    /// Fetch raw leaf content, verifying via the wrapper encoding that was
    /// hashed at construction time.
    fn fetch_chunk(&self, id: &ObjectId) -> TreeResult<Option<Vec<u8>>> {
        let Some(bytes) = self.store.get(id)? else {
            return Ok(None);
        };
        let wrapper = Object::leaf(bytes);
        let encoded = wrapper
            .encode()
            .map_err(|e| TreeError::Serialization(e.to_string()))?;
        let computed = self.digests.hash(&encoded);
        if computed != *id {
            return Err(TreeError::HashMismatch { id: *id, computed });
        }
        Ok(Some(wrapper.into_data()))
    }

    fn entries<'o>(
        &self,
        id: &ObjectId,
        object: &'o Object,
    ) -> TreeResult<Vec<(LinkKind, &'o Link)>> {
        object.entries().map_err(|e| TreeError::decode(*id, e))
    }

    fn resolve_in(
        &self,
        id: &ObjectId,
        object: &Object,
        segments: &[&str],
        cur: usize,
    ) -> TreeResult<Option<Vec<u8>>> {
        if cur >= segments.len() {
            return Ok(None);
        }
        for (kind, link) in self.entries(id, object)? {
            if link.name != segments[cur] {
                continue;
            }
            match kind {
                LinkKind::Tree => {
                    let Some(child) = self.fetch_object(&link.hash)? else {
                        continue;
                    };
                    if let Some(bytes) = self.resolve_in(&link.hash, &child, segments, cur + 1)? {
                        return Ok(Some(bytes));
                    }
                    // Absent below this subtree: a later identically-named
                    // link may still match.
                }
                LinkKind::Blob => return self.fetch_chunk(&link.hash),
                LinkKind::List => {
                    let Some(child) = self.fetch_object(&link.hash)? else {
                        return Ok(None);
                    };
                    return self.read_list(&link.hash, &child);
                }
            }
        }
        Ok(None)
    }

    /// Reassemble a chunked file from its list node. Concatenation order is
    /// link order.
    fn read_list(&self, id: &ObjectId, object: &Object) -> TreeResult<Option<Vec<u8>>> {
        let capacity: usize = object.links().iter().map(|link| link.size as usize).sum();
        let mut out = Vec::with_capacity(capacity);
        for (kind, link) in self.entries(id, object)? {
            match kind {
                LinkKind::Blob => {
                    let Some(chunk) = self.fetch_chunk(&link.hash)? else {
                        return Ok(None);
                    };
                    out.extend_from_slice(&chunk);
                }
                LinkKind::List => {
                    let Some(child) = self.fetch_object(&link.hash)? else {
                        return Ok(None);
                    };
                    let Some(bytes) = self.read_list(&link.hash, &child)? else {
                        return Ok(None);
                    };
                    out.extend_from_slice(&bytes);
                }
                LinkKind::Tree => {
                    return Err(TreeError::decode(*id, "directory link inside a file list"));
                }
            }
        }
        Ok(Some(out))
    }
}
