use super::{DirectoryFetcher, EntryKind, Listing, ListingEntry, ListingError, ListingParams};
use crate::primitives::path_utils::{dir_key, request_dir};
use async_trait::async_trait;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Serves listings from a local directory
///
/// Tree paths map onto `root`: the tree path `/data/` lists `root/data`.
/// Entries are returned directories first, then by case-insensitive name.
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    root: PathBuf,
}

impl LocalFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a tree path onto the local filesystem, refusing to leave `root`
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let relative = Path::new(request_dir(path));
        let mut resolved = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        format!("path escapes listing root: {}", path),
                    ))
                }
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl DirectoryFetcher for LocalFetcher {
    async fn list_children(
        &self,
        path: &str,
        params: &ListingParams,
    ) -> Result<Listing, ListingError> {
        let dir = self.resolve(path)?;
        let parent = dir_key(path);
        let show_hidden = params.show_hidden.unwrap_or(false);
        let show_files = params.show_files.unwrap_or(true);

        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !show_hidden && name.starts_with('.') {
                continue;
            }

            let file_type = entry.file_type().await?;
            let is_dir = if file_type.is_symlink() {
                tokio::fs::metadata(entry.path())
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false)
            } else {
                file_type.is_dir()
            };
            if !is_dir && !show_files {
                continue;
            }

            let kind = if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let child_path = format!("{}{}", parent, name);
            entries.push(ListingEntry::new(&child_path, name, kind));
        }

        entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        });

        Ok(entries)
    }
}
