use crate::primitives::path_utils::{dir_key, file_key, is_strict_ancestor, parent_dir};
use crate::services::listing::ListingEntry;

/// What the navigator wants done with a freshly rendered entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavAction {
    /// Expand a directory on the way to the target, without selecting it
    Open(String),
    /// Run a full activation (expand + selection rules) on the target folder
    Activate(String),
    /// Bring the entry into view
    Scroll(String),
    /// Close a directory opened on the way to a target that turned out not
    /// to exist
    Close(String),
}

/// Drives the tree towards a requested folder and/or file on load
///
/// Only the root listing and the listings the navigator asked for itself are
/// scanned. It is one-shot: once the chain of listings ends (target reached,
/// missing, or failed to load) it is done and later listings produce no
/// actions.
#[derive(Debug, Clone, Default)]
pub struct AutoNavigator {
    /// Directory to expand towards (directory key)
    folder: Option<String>,
    /// File to reveal and preselect (file key)
    file: Option<String>,
    /// Scroll to the folder once reached (only when no file is targeted)
    scroll_to_folder: bool,
    folder_reached: bool,
    file_revealed: bool,
    /// The root listing has been scanned
    started: bool,
    /// Directory whose listing continues the chain
    awaiting: Option<String>,
    /// Ancestors opened so far, outermost first
    opened: Vec<String>,
    finished: bool,
    preselect_taken: bool,
}

impl AutoNavigator {
    /// Target `folder` and/or `file`; empty strings mean "no target"
    ///
    /// With only a file given, its parent directory becomes the folder to
    /// expand towards.
    pub fn new(folder: &str, file: &str) -> Self {
        let file = (!file.trim().is_empty()).then(|| file_key(file));
        let folder = if folder.trim().is_empty() {
            file.as_deref().and_then(parent_dir)
        } else {
            Some(dir_key(folder))
        };

        Self {
            scroll_to_folder: file.is_none(),
            finished: folder.is_none() && file.is_none(),
            folder,
            file,
            ..Default::default()
        }
    }

    pub fn target_folder(&self) -> Option<&str> {
        self.folder.as_deref()
    }

    pub fn target_file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// Nothing left to do
    pub fn is_done(&self) -> bool {
        self.finished
    }

    /// Directory whose listing the navigator is waiting for
    pub fn awaiting(&self) -> Option<&str> {
        self.awaiting.as_deref()
    }

    /// Stop navigating; nothing already opened is touched
    pub fn cancel(&mut self) {
        if !self.finished {
            tracing::debug!("Auto-navigation cancelled");
        }
        self.finished = true;
        self.awaiting = None;
    }

    /// Scan the entries just rendered under `listed`, in document order
    ///
    /// The first call is taken as the root listing. After that only the
    /// listing of [`AutoNavigator::awaiting`] is looked at.
    pub fn scan(&mut self, listed: &str, entries: &[ListingEntry]) -> Vec<NavAction> {
        if self.finished || (self.started && self.awaiting.as_deref() != Some(listed)) {
            return Vec::new();
        }
        self.started = true;
        self.awaiting = None;

        let mut actions = Vec::new();
        for entry in entries {
            if let Some(target) = self.folder.as_deref() {
                if !self.folder_reached && entry.is_dir() {
                    if entry.path == target {
                        self.folder_reached = true;
                        actions.push(NavAction::Activate(entry.path.clone()));
                        if self.scroll_to_folder {
                            actions.push(NavAction::Scroll(entry.path.clone()));
                        }
                        if self.file.is_some() && !self.file_revealed {
                            self.awaiting = Some(entry.path.clone());
                        }
                        continue;
                    }
                    if is_strict_ancestor(&entry.path, target) {
                        actions.push(NavAction::Open(entry.path.clone()));
                        self.opened.push(entry.path.clone());
                        self.awaiting = Some(entry.path.clone());
                        continue;
                    }
                }
            }

            if !self.file_revealed && self.file.as_deref() == Some(entry.path.as_str()) {
                self.file_revealed = true;
                actions.push(NavAction::Scroll(entry.path.clone()));
            }
        }

        if self.awaiting.is_none() {
            actions.extend(self.finish());
        }
        actions
    }

    /// The listing of `path` failed; ends navigation if the chain needed it
    pub fn abandon(&mut self, path: &str) -> Vec<NavAction> {
        if self.finished || self.awaiting.as_deref() != Some(path) {
            return Vec::new();
        }
        tracing::debug!("Auto-navigation stopped, {} failed to load", path);
        self.awaiting = None;
        self.finish()
    }

    /// Close the opened ancestors if the target folder was never found
    fn finish(&mut self) -> Vec<NavAction> {
        self.finished = true;
        if self.folder.is_none() || self.folder_reached {
            return Vec::new();
        }
        match self.opened.first() {
            Some(outermost) => {
                tracing::debug!(
                    "Auto-navigation target {:?} not found",
                    self.folder.as_deref().unwrap_or_default()
                );
                vec![NavAction::Close(outermost.clone())]
            }
            None => Vec::new(),
        }
    }

    /// File to preselect after the initial render; yields it once
    pub fn take_preselect(&mut self) -> Option<String> {
        if self.preselect_taken {
            return None;
        }
        self.preselect_taken = true;
        self.file.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root_entries() -> Vec<ListingEntry> {
        vec![
            ListingEntry::directory("/archive/"),
            ListingEntry::directory("/data/"),
            ListingEntry::file("/readme.md"),
        ]
    }

    #[test]
    fn test_no_targets_is_idle() {
        let mut nav = AutoNavigator::new("", "");
        assert!(nav.is_done());
        assert!(nav.scan("/", &root_entries()).is_empty());
        assert_eq!(nav.take_preselect(), None);
    }

    #[test]
    fn test_folder_target_activates_and_scrolls() {
        let mut nav = AutoNavigator::new("/data", "");
        let actions = nav.scan("/", &root_entries());
        assert_eq!(
            actions,
            vec![
                NavAction::Activate("/data/".to_string()),
                NavAction::Scroll("/data/".to_string()),
            ]
        );
        assert!(nav.is_done());
        assert!(nav.scan("/", &root_entries()).is_empty(), "one-shot");
    }

    #[test]
    fn test_folder_with_file_does_not_scroll_to_folder() {
        let mut nav = AutoNavigator::new("/data", "/data/run1.csv");
        let actions = nav.scan("/", &root_entries());
        assert_eq!(actions, vec![NavAction::Activate("/data/".to_string())]);
        assert_eq!(nav.awaiting(), Some("/data/"));

        let actions = nav.scan(
            "/data/",
            &[
                ListingEntry::file("/data/run0.csv"),
                ListingEntry::file("/data/run1.csv"),
            ],
        );
        assert_eq!(actions, vec![NavAction::Scroll("/data/run1.csv".to_string())]);
        assert!(nav.is_done());
    }

    #[test]
    fn test_file_in_first_level_scrolls_without_expanding() {
        let mut nav = AutoNavigator::new("", "/readme.md");
        assert_eq!(nav.target_folder(), None, "root file has no folder to open");
        let actions = nav.scan("/", &root_entries());
        assert_eq!(actions, vec![NavAction::Scroll("/readme.md".to_string())]);
        assert!(nav.is_done());
        assert_eq!(nav.take_preselect().as_deref(), Some("/readme.md"));
        assert_eq!(nav.take_preselect(), None);
    }

    #[test]
    fn test_deep_folder_opens_ancestors() {
        let mut nav = AutoNavigator::new("/data/raw/2024", "");
        assert_eq!(
            nav.scan("/", &root_entries()),
            vec![NavAction::Open("/data/".to_string())]
        );
        assert_eq!(
            nav.scan(
                "/data/",
                &[ListingEntry::directory("/data/raw/"), ListingEntry::directory("/data/rawer/")]
            ),
            vec![NavAction::Open("/data/raw/".to_string())]
        );
        assert_eq!(
            nav.scan("/data/raw/", &[ListingEntry::directory("/data/raw/2024/")]),
            vec![
                NavAction::Activate("/data/raw/2024/".to_string()),
                NavAction::Scroll("/data/raw/2024/".to_string()),
            ]
        );
        assert!(nav.is_done());
    }

    #[test]
    fn test_listings_off_the_chain_are_ignored() {
        let mut nav = AutoNavigator::new("/data/raw/2024", "");
        nav.scan("/", &root_entries());

        let actions = nav.scan("/archive/", &[ListingEntry::directory("/data/raw/")]);
        assert!(actions.is_empty());
        assert_eq!(nav.awaiting(), Some("/data/"));
    }

    #[test]
    fn test_deep_missing_folder_closes_what_it_opened() {
        let mut nav = AutoNavigator::new("/data/raw/2025", "");
        nav.scan("/", &root_entries());
        nav.scan("/data/", &[ListingEntry::directory("/data/raw/")]);

        let actions = nav.scan("/data/raw/", &[ListingEntry::directory("/data/raw/2024/")]);
        assert_eq!(actions, vec![NavAction::Close("/data/".to_string())]);
        assert!(nav.is_done());

        // A later listing of the same chain does nothing
        assert!(nav.scan("/data/", &[ListingEntry::directory("/data/raw/")]).is_empty());
    }

    #[test]
    fn test_failed_chain_listing_ends_navigation() {
        let mut nav = AutoNavigator::new("/data/raw/2024", "");
        nav.scan("/", &root_entries());

        assert!(nav.abandon("/archive/").is_empty());
        assert!(!nav.is_done());
        assert_eq!(nav.abandon("/data/"), vec![NavAction::Close("/data/".to_string())]);
        assert!(nav.is_done());
    }

    #[test]
    fn test_file_only_target_opens_parent_chain() {
        let mut nav = AutoNavigator::new("", "data/run1.csv");
        assert_eq!(nav.target_folder(), Some("/data/"));
        assert_eq!(nav.target_file(), Some("/data/run1.csv"));
        assert_eq!(
            nav.scan("/", &root_entries()),
            vec![NavAction::Activate("/data/".to_string())]
        );
    }

    #[test]
    fn test_unmatched_target_is_silent() {
        let mut nav = AutoNavigator::new("/nowhere", "");
        assert!(nav.scan("/", &root_entries()).is_empty());
        assert!(nav.is_done());
    }

    #[test]
    fn test_cancel() {
        let mut nav = AutoNavigator::new("/data/raw/2024", "");
        nav.scan("/", &root_entries());
        nav.cancel();
        assert!(nav.is_done());
        assert!(nav.scan("/data/", &[ListingEntry::directory("/data/raw/")]).is_empty());
    }
}
