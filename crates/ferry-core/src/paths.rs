use crate::error::{FerryError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Names and constants
// ---------------------------------------------------------------------------

pub const ACTIONS_DIR: &str = "actions";
pub const DEFAULT_EXT: &str = "toml";

/// Fixed-name hash record written by a directory batch upload.
pub const MANIFEST_FILE: &str = "ipfs_hashes.csv";

pub fn actions_dir(home: &Path) -> PathBuf {
    home.join(ACTIONS_DIR)
}

/// Storage-path form of a user-facing name: spaces become underscores.
pub fn normalize_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Human-readable form of a stored name: underscores become spaces.
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
}

/// Build a normalized name from command arguments.
pub fn join_args(args: &[String]) -> String {
    normalize_name(&args.join("_"))
}

pub fn definition_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{DEFAULT_EXT}", normalize_name(name)))
}

/// Names become file names, so reject anything that could leave the
/// registry directory.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(FerryError::InvalidName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_round_trips_through_display() {
        assert_eq!(normalize_name("deploy prod"), "deploy_prod");
        assert_eq!(display_name("deploy_prod"), "deploy prod");
    }

    #[test]
    fn join_args_normalizes_every_part() {
        let args = vec!["do".to_string(), "the thing".to_string()];
        assert_eq!(join_args(&args), "do_the_thing");
    }

    #[test]
    fn definition_path_appends_default_extension() {
        let dir = Path::new("/tmp/ferry/actions");
        assert_eq!(
            definition_path(dir, "deploy prod"),
            PathBuf::from("/tmp/ferry/actions/deploy_prod.toml")
        );
    }

    #[test]
    fn invalid_names() {
        for name in ["", "a/b", "a\\b", "../escape"] {
            assert!(validate_name(name).is_err(), "expected invalid: {name}");
        }
        validate_name("deploy_prod").unwrap();
    }
}
