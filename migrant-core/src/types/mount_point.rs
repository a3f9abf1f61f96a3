//! Mount point domain types.

use crate::error::{MigrantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named storage volume attached to a workload.
///
/// The name is the key used to match volumes between workloads; the size
/// only takes part in equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MountPoint {
    /// Volume name (e.g. `c:`)
    pub name: String,

    /// Volume size
    pub size: u64,
}

impl MountPoint {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self { name: name.into(), size }
    }

    /// Build a mount point from a signed size as supplied by callers that
    /// only know "an integer".
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::InvalidArgument` if `size` is negative.
    pub fn try_new(name: impl Into<String>, size: i64) -> Result<Self> {
        let size = u64::try_from(size).map_err(|_| {
            MigrantError::invalid_argument("size", format!("must not be negative, got {}", size))
        })?;
        Ok(Self::new(name, size))
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mountpoint:{}:{}", self.name, self.size)
    }
}

/// Render a list of mount points as `[a, b, ...]`.
pub(crate) fn display_list(mount_points: &[MountPoint]) -> String {
    let items: Vec<String> = mount_points.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proper_mount_point() {
        let mp = MountPoint::new("c:", 100);
        assert_eq!(mp.name, "c:");
        assert_eq!(mp.size, 100);
    }

    #[test]
    fn test_try_new() {
        assert_eq!(MountPoint::try_new("d:", 0).unwrap(), MountPoint::new("d:", 0));

        let err = MountPoint::try_new("d:", -1).unwrap_err();
        assert!(matches!(err, MigrantError::InvalidArgument { ref field, .. } if field == "size"));
    }

    #[test]
    fn test_size_not_int_on_decode() {
        assert!(serde_json::from_str::<MountPoint>(r#"{"name": "c:", "size": "100"}"#).is_err());
        assert!(serde_json::from_str::<MountPoint>(r#"{"name": 1, "size": 50}"#).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(MountPoint::new("c:", 100).to_string(), "mountpoint:c:100");
        assert_eq!(
            display_list(&[MountPoint::new("c:", 100), MountPoint::new("d:", 50)]),
            "[mountpoint:c:100, mountpoint:d:50]"
        );
        assert_eq!(display_list(&[]), "[]");
    }
}
