//! The tree object model and its canonical encoding.
//!
//! Objects serialize through `serde_json` with fixed field order and
//! preserved array order, so equal `{links, data}` always encode — and hash —
//! identically. The encoding is the hashing input for every object and the
//! stored value for every non-leaf object.

use serde::{Deserialize, Serialize};

use dagfs_types::ObjectId;

/// Width of the per-link type tag packed into a non-leaf object's data.
pub const TAG_LEN: usize = 4;

/// The kind of child an object link points at, as a typed view over the
/// 4-byte wire tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A leaf chunk: the stored value is raw content bytes.
    Blob,
    /// A file-internal list node bounding per-node fan-out.
    List,
    /// A directory.
    Tree,
}

impl LinkKind {
    /// The 4-byte wire tag for this kind.
    pub const fn tag(&self) -> &'static [u8; TAG_LEN] {
        match self {
            Self::Blob => b"blob",
            Self::List => b"list",
            Self::Tree => b"tree",
        }
    }

    /// Parse a wire tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"blob" => Some(Self::Blob),
            b"list" => Some(Self::List),
            b"tree" => Some(Self::Tree),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::List => write!(f, "list"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

/// A reference to a child object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Entry name. Empty for file-internal chunk links, populated for
    /// directory entries.
    pub name: String,
    /// Content address of the canonical encoding of the child.
    pub hash: ObjectId,
    /// Byte size of the subtree the link represents (not the encoded size).
    pub size: u64,
}

impl Link {
    /// Create a named link (directory entry).
    pub fn new(name: impl Into<String>, hash: ObjectId, size: u64) -> Self {
        Self {
            name: name.into(),
            hash,
            size,
        }
    }

    /// Create an unnamed link (file-internal chunk reference).
    pub fn unnamed(hash: ObjectId, size: u64) -> Self {
        Self::new("", hash, size)
    }
}

/// A tree node: ordered links plus a data buffer.
///
/// For a leaf, `data` is the literal chunk content and `links` is empty.
/// For a non-leaf, `data` is one aligned [`TAG_LEN`]-byte tag per link, in
/// link order (`data.len() == TAG_LEN * links.len()`), and the object
/// carries no content of its own. Links are only appended through
/// [`push_link`], which keeps the tag buffer aligned by construction.
///
/// [`push_link`]: Object::push_link
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    links: Vec<Link>,
    data: Vec<u8>,
}

impl Object {
    /// Create a leaf object wrapping raw chunk bytes.
    pub fn leaf(data: Vec<u8>) -> Self {
        Self {
            links: Vec::new(),
            data,
        }
    }

    /// Create an empty non-leaf object.
    pub fn branch() -> Self {
        Self::default()
    }

    /// Append a link and its type tag.
    pub fn push_link(&mut self, kind: LinkKind, link: Link) {
        self.data.extend_from_slice(kind.tag());
        self.links.push(link);
    }

    /// Returns `true` if this object has no links.
    pub fn is_leaf(&self) -> bool {
        self.links.is_empty()
    }

    /// The ordered links of this object.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The raw data buffer (chunk content for a leaf, tag buffer otherwise).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the object, returning its data buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// The typed per-link view: each link paired with its parsed tag.
    ///
    /// Fails if the tag buffer is misaligned or contains an unknown tag.
    pub fn entries(&self) -> Result<Vec<(LinkKind, &Link)>, ObjectError> {
        if self.data.len() != TAG_LEN * self.links.len() {
            return Err(ObjectError::MisalignedTags {
                links: self.links.len(),
                tag_bytes: self.data.len(),
            });
        }
        self.links
            .iter()
            .zip(self.data.chunks_exact(TAG_LEN))
            .map(|(link, tag)| {
                LinkKind::from_tag(tag)
                    .map(|kind| (kind, link))
                    .ok_or_else(|| {
                        ObjectError::UnknownTag(String::from_utf8_lossy(tag).into_owned())
                    })
            })
            .collect()
    }

    /// Canonically encode this object.
    pub fn encode(&self) -> Result<Vec<u8>, ObjectError> {
        serde_json::to_vec(self).map_err(|e| ObjectError::Encoding(e.to_string()))
    }

    /// Decode a stored non-leaf encoding.
    ///
    /// Validates the tag buffer of linked objects so that traversal never
    /// needs offset arithmetic against unchecked data.
    pub fn decode(bytes: &[u8]) -> Result<Self, ObjectError> {
        let object: Self =
            serde_json::from_slice(bytes).map_err(|e| ObjectError::Encoding(e.to_string()))?;
        if !object.links.is_empty() {
            object.entries()?;
        }
        Ok(object)
    }
}

/// Errors from object encoding, decoding, and tag parsing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ObjectError {
    /// The tag buffer length does not equal `TAG_LEN * links`.
    #[error("tag buffer misaligned: {links} links, {tag_bytes} tag bytes")]
    MisalignedTags { links: usize, tag_bytes: usize },

    /// A tag value is not one of `blob`, `list`, `tree`.
    #[error("unknown link tag {0:?}")]
    UnknownTag(String),

    /// The bytes are not a valid object encoding.
    #[error("invalid object encoding: {0}")]
    Encoding(String),
}
