use crate::services::listing::{EntryKind, ListingParams};
use crate::view::file_tree::events::Animation;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Picker configuration supplied by the host
///
/// Keys use the camelCase names of the jQuery File Tree options, so an
/// existing options object can be loaded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeConfig {
    /// Path of the tree root
    #[serde(default = "default_root")]
    pub root: String,

    /// Folder to open on load (empty for none)
    #[serde(default)]
    pub folder: String,

    /// File to reveal and preselect on load (empty for none)
    #[serde(default)]
    pub file: String,

    /// Listing endpoint, absolute or relative to `baseUrl`
    #[serde(default = "default_script")]
    pub script: String,

    /// UI event that expands/collapses folders (`click` or `dblclick`)
    #[serde(default = "default_folder_event")]
    pub folder_event: String,

    /// Open animation in milliseconds; negative disables the animation
    #[serde(default = "default_speed")]
    pub expand_speed: i64,

    /// Close animation in milliseconds; negative disables the animation
    #[serde(default = "default_speed")]
    pub collapse_speed: i64,

    #[serde(default)]
    pub expand_easing: Option<String>,

    #[serde(default)]
    pub collapse_easing: Option<String>,

    #[serde(default = "default_false")]
    pub delete_icons: bool,

    /// Allow several folders to be open at once
    #[serde(default = "default_true")]
    pub multi_folder: bool,

    #[serde(default = "default_false")]
    pub select_file: bool,

    #[serde(default = "default_false")]
    pub select_folder: bool,

    /// Placeholder shown while the root listing loads
    #[serde(default = "default_load_message")]
    pub load_message: String,

    /// Ambient `group` filter forwarded to the endpoint
    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub show_files: Option<bool>,

    #[serde(default)]
    pub show_root: Option<bool>,

    #[serde(default)]
    pub show_hidden: Option<bool>,

    /// Honour ctrl/cmd toggling; when off, at most one entry is chosen
    #[serde(default = "default_true")]
    pub multi_select: bool,

    /// Base URL a relative `script` is resolved against
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Reveal scroll duration in milliseconds
    #[serde(default = "default_scroll_duration")]
    pub scroll_duration: u64,
}

fn default_root() -> String {
    "/".to_string()
}

fn default_script() -> String {
    "jqueryFileTree.php".to_string()
}

fn default_folder_event() -> String {
    "click".to_string()
}

fn default_speed() -> i64 {
    500
}

fn default_load_message() -> String {
    "Loading...".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_scroll_duration() -> u64 {
    2000
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            folder: String::new(),
            file: String::new(),
            script: default_script(),
            folder_event: default_folder_event(),
            expand_speed: default_speed(),
            collapse_speed: default_speed(),
            expand_easing: None,
            collapse_easing: None,
            delete_icons: default_false(),
            multi_folder: default_true(),
            select_file: default_false(),
            select_folder: default_false(),
            load_message: default_load_message(),
            group: String::new(),
            show_files: None,
            show_root: None,
            show_hidden: None,
            multi_select: default_true(),
            base_url: None,
            request_timeout_ms: default_request_timeout_ms(),
            scroll_duration: default_scroll_duration(),
        }
    }
}

fn speed_to_duration(speed: i64) -> Option<Duration> {
    u64::try_from(speed).ok().map(Duration::from_millis)
}

impl TreeConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: TreeConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.script.trim().is_empty() {
            return Err(ConfigError::Validation(
                "script cannot be empty".to_string(),
            ));
        }

        if self.folder_event != "click" && self.folder_event != "dblclick" {
            return Err(ConfigError::Validation(format!(
                "folderEvent must be \"click\" or \"dblclick\", got {:?}",
                self.folder_event
            )));
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "requestTimeoutMs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Ambient filters sent with every listing request
    pub fn listing_params(&self) -> ListingParams {
        ListingParams {
            group: self.group.clone(),
            show_files: self.show_files,
            show_root: self.show_root,
            show_hidden: self.show_hidden,
            delete_icons: self.delete_icons,
        }
    }

    pub fn expand_animation(&self) -> Animation {
        Animation {
            duration: speed_to_duration(self.expand_speed),
            easing: self.expand_easing.clone(),
        }
    }

    pub fn collapse_animation(&self) -> Animation {
        Animation {
            duration: speed_to_duration(self.collapse_speed),
            easing: self.collapse_easing.clone(),
        }
    }

    /// Whether activating an entry of `kind` affects the selection
    pub fn selects(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::File => self.select_file,
            EntryKind::Directory => self.select_folder,
        }
    }

    pub fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TreeConfig::default();
        assert_eq!(config.root, "/");
        assert_eq!(config.script, "jqueryFileTree.php");
        assert_eq!(config.folder_event, "click");
        assert_eq!(config.expand_speed, 500);
        assert!(config.multi_folder);
        assert!(!config.select_file);
        assert!(!config.select_folder);
        assert_eq!(config.load_message, "Loading...");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_object_matches_default() {
        let config: TreeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TreeConfig::default());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{
            "root": "/home",
            "folderEvent": "dblclick",
            "expandSpeed": -1,
            "multiFolder": false,
            "selectFile": true,
            "deleteIcons": true,
            "showHidden": true,
            "group": "astro"
        }"#;

        let config: TreeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.root, "/home");
        assert_eq!(config.folder_event, "dblclick");
        assert!(!config.multi_folder);
        assert!(config.selects(EntryKind::File));
        assert!(!config.selects(EntryKind::Directory));

        let params = config.listing_params();
        assert_eq!(params.group, "astro");
        assert_eq!(params.show_hidden, Some(true));
        assert_eq!(params.show_files, None);
        assert!(params.delete_icons);
    }

    #[test]
    fn test_negative_speed_disables_animation() {
        let config = TreeConfig {
            expand_speed: -1,
            collapse_easing: Some("swing".to_string()),
            ..Default::default()
        };
        assert_eq!(config.expand_animation().duration, None);
        let collapse = config.collapse_animation();
        assert_eq!(collapse.duration, Some(Duration::from_millis(500)));
        assert_eq!(collapse.easing.as_deref(), Some("swing"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = TreeConfig::default();
        config.folder_event = "mouseover".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let config = TreeConfig {
            request_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("picker.json");

        let config = TreeConfig {
            folder: "/data".to_string(),
            select_folder: true,
            ..Default::default()
        };
        config.save_to_file(&config_path).unwrap();

        let loaded = TreeConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("broken.json");
        std::fs::write(&config_path, "{ not json").unwrap();

        assert!(matches!(
            TreeConfig::load_from_file(&config_path),
            Err(ConfigError::Parse(_))
        ));
    }
}
