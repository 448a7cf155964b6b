use serde::Deserialize;

/// Kind of a git tree entry. Only blobs are changelog candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeEntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One entry of a directory-listing query against the forge API. `url` is
/// the entry's browse URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeEntry {
    pub path: String,
    pub url: String,
    pub kind: TreeEntryKind,
}
