//! Configuration file discovery and loading.
//!
//! Kept apart from config.rs so the types stay free of filesystem lookups.

use crate::config::{ConfigError, TreeConfig};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "treepick.json";

/// Path of the implicit config file in `working_dir`, if one exists
pub fn find_config(working_dir: &Path) -> Option<PathBuf> {
    let candidate = working_dir.join(CONFIG_FILE_NAME);
    candidate.is_file().then_some(candidate)
}

/// Load and validate a configuration
///
/// With no explicit path, `treepick.json` in `working_dir` is used when
/// present; otherwise the defaults apply.
pub fn load_config(path: Option<&Path>, working_dir: &Path) -> Result<TreeConfig, ConfigError> {
    let path = path.map(Path::to_path_buf).or_else(|| find_config(working_dir));

    let config = match path {
        Some(path) => {
            tracing::debug!("Loading picker config from {:?}", path);
            TreeConfig::load_from_file(&path)?
        }
        None => {
            tracing::debug!("No config file, using defaults");
            TreeConfig::default()
        }
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config, TreeConfig::default());
    }

    #[test]
    fn test_implicit_file_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"{"root": "/srv", "selectFolder": true}"#,
        )
        .unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert_eq!(config.root, "/srv");
        assert!(config.select_folder);
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), r#"{"root": "/srv"}"#).unwrap();
        let explicit = dir.path().join("other.json");
        std::fs::write(&explicit, r#"{"root": "/home"}"#).unwrap();

        let config = load_config(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.root, "/home");
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            load_config(Some(&missing), dir.path()),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"folderEvent": "hover"}"#).unwrap();
        assert!(matches!(
            load_config(Some(&path), dir.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
