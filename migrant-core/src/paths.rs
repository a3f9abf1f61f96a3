//! Centralized path configuration for migrant.
//!
//! All default file locations should go through this module so the CLI and
//! library agree on where state lives.

use std::ffi::OsString;
use std::path::PathBuf;

/// Get the migrant data directory.
///
/// Resolution order:
/// 1. `MIGRANT_DATA_DIR` environment variable
/// 2. `~/.migrant`
/// 3. `.migrant` in the working directory if there is no home directory
pub fn data_dir() -> PathBuf {
    data_dir_from(std::env::var_os("MIGRANT_DATA_DIR"), dirs::home_dir())
}

/// Get the configuration directory.
///
/// `MIGRANT_CONFIG_DIR` if set, otherwise the data directory.
pub fn config_dir() -> PathBuf {
    config_dir_from(std::env::var_os("MIGRANT_CONFIG_DIR"), data_dir)
}

/// Get the default snapshot file path.
pub fn snapshot_path() -> PathBuf {
    data_dir().join("snapshot.json")
}

fn data_dir_from(env: Option<OsString>, home: Option<PathBuf>) -> PathBuf {
    match (env, home) {
        (Some(dir), _) if !dir.is_empty() => PathBuf::from(dir),
        (_, Some(home)) => home.join(".migrant"),
        (_, None) => PathBuf::from(".migrant"),
    }
}

fn config_dir_from(env: Option<OsString>, data_dir: impl FnOnce() -> PathBuf) -> PathBuf {
    match env {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => data_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_resolution() {
        let home = Some(PathBuf::from("/home/john"));

        let dir = data_dir_from(Some("/tmp/migrant-test".into()), home.clone());
        assert_eq!(dir, PathBuf::from("/tmp/migrant-test"));

        assert_eq!(data_dir_from(None, home.clone()), PathBuf::from("/home/john/.migrant"));
        let dir = data_dir_from(Some(OsString::new()), home);
        assert_eq!(dir, PathBuf::from("/home/john/.migrant"));
        assert_eq!(data_dir_from(None, None), PathBuf::from(".migrant"));
    }

    #[test]
    fn test_config_dir_resolution() {
        let data = || PathBuf::from("/var/lib/migrant");

        let dir = config_dir_from(Some("/tmp/migrant-config".into()), data);
        assert_eq!(dir, PathBuf::from("/tmp/migrant-config"));
        assert_eq!(config_dir_from(None, data), PathBuf::from("/var/lib/migrant"));
        assert_eq!(config_dir_from(Some(OsString::new()), data), PathBuf::from("/var/lib/migrant"));
    }

    #[test]
    fn test_snapshot_under_data_dir() {
        assert_eq!(snapshot_path(), data_dir().join("snapshot.json"));
    }
}
