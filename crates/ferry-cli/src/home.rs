use std::path::{Path, PathBuf};

/// Resolve the ferry home directory.
///
/// Priority:
/// 1. `--home` flag / `FERRY_HOME` env var (passed in as `explicit`)
/// 2. `~/.ferry`
/// 3. `.ferry` under the current directory when no home directory exists
pub fn resolve_home(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match home::home_dir() {
        Some(dir) => dir.join(".ferry"),
        None => PathBuf::from(".ferry"),
    }
}
