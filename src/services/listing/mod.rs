// Directory listing layer: pluggable, async sources of a node's children
//
// The tree widget only ever asks one question: "what are the immediate
// children of this directory?". Backends answer it over HTTP, from the local
// filesystem, or from memory, and decorators (SlowFetcher) wrap any of them.

pub mod fragment;
#[cfg(feature = "runtime")]
pub mod http;
pub mod local;
pub mod memory;
pub mod slow;

use crate::primitives::path_utils::{base_name, dir_key, file_key};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use fragment::parse_listing;
#[cfg(feature = "runtime")]
pub use http::HttpFetcher;
pub use local::LocalFetcher;
pub use memory::{Gate, MemoryFetcher};
pub use slow::{FetchMetrics, SlowFetcher};

/// Category of a listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    #[serde(alias = "dir")]
    Directory,
}

impl EntryKind {
    /// Short label used by host code when persisting a choice (`dir`/`file`)
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "dir",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One child reported by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Absolute slash path; directories end with `/`
    pub path: String,
    /// Display name
    pub name: String,
    pub kind: EntryKind,
}

impl ListingEntry {
    /// Create an entry, normalizing the path for its kind.
    ///
    /// An empty name falls back to the last path segment.
    pub fn new(path: &str, name: impl Into<String>, kind: EntryKind) -> Self {
        let path = match kind {
            EntryKind::Directory => dir_key(path),
            EntryKind::File => file_key(path),
        };
        let mut name = name.into();
        if name.is_empty() {
            name = base_name(&path).to_string();
        }
        Self { path, name, kind }
    }

    pub fn directory(path: &str) -> Self {
        Self::new(path, String::new(), EntryKind::Directory)
    }

    pub fn file(path: &str) -> Self {
        Self::new(path, String::new(), EntryKind::File)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Lowercased extension of a file entry (`ext_txt` class in markup)
    pub fn extension(&self) -> Option<String> {
        if self.is_dir() {
            return None;
        }
        let name = base_name(&self.path);
        name.rsplit_once('.')
            .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
            .map(|(_, ext)| ext.to_lowercase())
    }
}

/// Children of one directory, in server (document) order
pub type Listing = Vec<ListingEntry>;

/// Ambient filters sent with every listing request
///
/// Unset flags are transmitted with an empty value so the endpoint applies
/// its own default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingParams {
    pub group: String,
    pub show_files: Option<bool>,
    pub show_root: Option<bool>,
    pub show_hidden: Option<bool>,
    pub delete_icons: bool,
}

fn flag_value(flag: Option<bool>) -> String {
    flag.map(|b| b.to_string()).unwrap_or_default()
}

impl ListingParams {
    /// Query pairs for the listing endpoint, `dir` first
    pub fn query_pairs(&self, dir: &str) -> Vec<(&'static str, String)> {
        vec![
            ("dir", dir.to_string()),
            ("group", self.group.clone()),
            ("showFiles", flag_value(self.show_files)),
            ("showRoot", flag_value(self.show_root)),
            ("showHidden", flag_value(self.show_hidden)),
            ("deleteIcons", self.delete_icons.to_string()),
        ]
    }
}

/// Failure to obtain a node's children
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// Endpoint answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Connection, TLS or timeout failure
    #[error("transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body could not be understood as a listing
    #[error("malformed listing: {message}")]
    Parse { message: String },

    #[error("invalid listing URL: {0}")]
    Url(String),

    /// The fetch task went away before answering
    #[error("listing request cancelled")]
    Cancelled,
}

impl ListingError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

/// Source of directory listings
///
/// Implementations must answer for exactly one directory per call and
/// report their children in display order.
#[async_trait]
pub trait DirectoryFetcher: Send + Sync {
    /// List the immediate children of `path`
    ///
    /// `path` is the node path as known by the tree (leading and trailing
    /// slash for directories); backends derive their own request form from
    /// it.
    ///
    /// # Errors
    ///
    /// Returns a [`ListingError`] on network, I/O or format failure.
    async fn list_children(
        &self,
        path: &str,
        params: &ListingParams,
    ) -> Result<Listing, ListingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_normalizes_path_by_kind() {
        let dir = ListingEntry::directory("data");
        assert_eq!(dir.path, "/data/");
        assert_eq!(dir.name, "data");
        assert!(dir.is_dir());

        let file = ListingEntry::new("/data/report.PDF/", "Report", EntryKind::File);
        assert_eq!(file.path, "/data/report.PDF");
        assert_eq!(file.name, "Report");
        assert!(file.is_file());
    }

    #[test]
    fn test_entry_extension() {
        assert_eq!(
            ListingEntry::file("/a/report.PDF").extension().as_deref(),
            Some("pdf")
        );
        assert_eq!(ListingEntry::file("/a/.bashrc").extension(), None);
        assert_eq!(ListingEntry::file("/a/Makefile").extension(), None);
        assert_eq!(ListingEntry::directory("/a.d/").extension(), None);
    }

    #[test]
    fn test_query_pairs_default_flags_are_empty() {
        let params = ListingParams {
            group: "astro".to_string(),
            ..Default::default()
        };
        let pairs = params.query_pairs("data/");
        assert_eq!(
            pairs,
            vec![
                ("dir", "data/".to_string()),
                ("group", "astro".to_string()),
                ("showFiles", String::new()),
                ("showRoot", String::new()),
                ("showHidden", String::new()),
                ("deleteIcons", "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_with_flags() {
        let params = ListingParams {
            show_hidden: Some(true),
            show_files: Some(false),
            delete_icons: true,
            ..Default::default()
        };
        let pairs = params.query_pairs("");
        assert!(pairs.contains(&("showHidden", "true".to_string())));
        assert!(pairs.contains(&("showFiles", "false".to_string())));
        assert!(pairs.contains(&("deleteIcons", "true".to_string())));
    }

    #[test]
    fn test_entry_kind_serde() {
        let kind: EntryKind = serde_json::from_str("\"dir\"").unwrap();
        assert_eq!(kind, EntryKind::Directory);
        let kind: EntryKind = serde_json::from_str("\"file\"").unwrap();
        assert_eq!(kind, EntryKind::File);
        assert_eq!(EntryKind::Directory.to_string(), "dir");
    }
}
