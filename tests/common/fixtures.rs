// Listing fixtures

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use treepick::services::listing::{ListingEntry, MemoryFetcher};

/// In-memory hierarchy used by most widget tests
///
/// ```text
/// /
/// ├── archive/
/// │   └── old.zip
/// ├── broken/        (listing fails)
/// ├── data/
/// │   ├── raw/
/// │   │   └── 2024/
/// │   │       └── jan.csv
/// │   ├── run0.csv
/// │   └── run1.csv
/// └── readme.md
/// ```
pub fn sample_fetcher() -> MemoryFetcher {
    let fetcher = MemoryFetcher::new()
        .with_dir(
            "/",
            vec![
                ListingEntry::directory("/archive/"),
                ListingEntry::directory("/broken/"),
                ListingEntry::directory("/data/"),
                ListingEntry::file("/readme.md"),
            ],
        )
        .with_dir("/archive/", vec![ListingEntry::file("/archive/old.zip")])
        .with_dir(
            "/data/",
            vec![
                ListingEntry::directory("/data/raw/"),
                ListingEntry::file("/data/run0.csv"),
                ListingEntry::file("/data/run1.csv"),
            ],
        )
        .with_dir("/data/raw/", vec![ListingEntry::directory("/data/raw/2024/")])
        .with_dir("/data/raw/2024/", vec![ListingEntry::file("/data/raw/2024/jan.csv")])
        .with_dir("/broken/", vec![ListingEntry::file("/broken/never.txt")]);
    fetcher.fail("/broken/");
    fetcher
}

/// Temporary directory tree on disk
pub struct LocalTree {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl LocalTree {
    /// Create `files` (slash paths relative to the root); parents are created
    pub fn new(files: &[&str]) -> anyhow::Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().to_path_buf();
        for file in files {
            let full = path.join(file);
            if file.ends_with('/') {
                fs::create_dir_all(&full)?;
                continue;
            }
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full, file.as_bytes())?;
        }
        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }
}
