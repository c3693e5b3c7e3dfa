//! The file/directory tree abstraction consumed by the builder.
//!
//! The builder never touches a filesystem. It consumes a [`SourceNode`]
//! tagged variant through two capability traits, so any tree-shaped input —
//! an on-disk directory, an archive, fixtures in memory — can be chunked the
//! same way. The only contract a directory must honor is a stable,
//! deterministic, finite iteration order: link order in the resulting
//! objects is iteration order, and hashes depend on it.

/// A node of the input tree: a file or a directory.
#[derive(Clone, Copy)]
pub enum SourceNode<'a> {
    File(&'a dyn FileSource),
    Dir(&'a dyn DirSource),
}

/// A file to be chunked.
pub trait FileSource {
    /// The entry name of this file.
    fn name(&self) -> &str;

    /// The byte length of the content.
    fn len(&self) -> u64;

    /// The full byte content.
    fn content(&self) -> &[u8];
}

/// A directory to be serialized.
pub trait DirSource {
    /// The entry name of this directory.
    fn name(&self) -> &str;

    /// Aggregate byte size of everything beneath this directory.
    fn size(&self) -> u64;

    /// Iterate this directory's children in stable order.
    ///
    /// Each call yields a fresh iterator; a single iterator is finite and
    /// non-restartable. Two iterations of the same directory must yield the
    /// same children in the same order.
    fn children(&self) -> Box<dyn Iterator<Item = SourceNode<'_>> + '_>;
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// In-memory file, for tests and embedding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryFile {
    name: String,
    content: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    pub fn as_node(&self) -> SourceNode<'_> {
        SourceNode::File(self)
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.content.len() as u64
    }

    fn content(&self) -> &[u8] {
        &self.content
    }
}

/// In-memory directory, for tests and embedding. Children keep insertion
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MemoryDir {
    name: String,
    entries: Vec<MemoryEntry>,
}

/// A child of a [`MemoryDir`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemoryEntry {
    File(MemoryFile),
    Dir(MemoryDir),
}

impl MemoryEntry {
    fn size(&self) -> u64 {
        match self {
            Self::File(file) => file.len(),
            Self::Dir(dir) => dir.size(),
        }
    }
}

impl From<MemoryFile> for MemoryEntry {
    fn from(file: MemoryFile) -> Self {
        Self::File(file)
    }
}

impl From<MemoryDir> for MemoryEntry {
    fn from(dir: MemoryDir) -> Self {
        Self::Dir(dir)
    }
}

impl MemoryDir {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Append a child entry.
    pub fn push(&mut self, entry: impl Into<MemoryEntry>) {
        self.entries.push(entry.into());
    }

    /// Builder-style [`push`](MemoryDir::push).
    pub fn with(mut self, entry: impl Into<MemoryEntry>) -> Self {
        self.push(entry);
        self
    }

    pub fn as_node(&self) -> SourceNode<'_> {
        SourceNode::Dir(self)
    }
}

impl DirSource for MemoryDir {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.entries.iter().map(MemoryEntry::size).sum()
    }

    fn children(&self) -> Box<dyn Iterator<Item = SourceNode<'_>> + '_> {
        Box::new(self.entries.iter().map(|entry| match entry {
            MemoryEntry::File(file) => SourceNode::File(file),
            MemoryEntry::Dir(dir) => SourceNode::Dir(dir),
        }))
    }
}
