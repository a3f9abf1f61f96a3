//! Workload domain types.

use crate::types::mount_point::display_list;
use crate::types::{Credentials, MountPoint};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry key of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkloadId(pub u64);

impl fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A machine: network address, login credentials and attached volumes.
///
/// Used both as the source of a migration and as the destination VM of a
/// migration target. A successful migration rewrites every field of the
/// destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Network address (e.g., 192.168.1.1)
    pub ip: String,

    /// Login credentials
    pub credentials: Credentials,

    /// Attached volumes, in attachment order
    pub storage: Vec<MountPoint>,
}

impl Workload {
    pub fn new(ip: impl Into<String>, credentials: Credentials, storage: Vec<MountPoint>) -> Self {
        Self { ip: ip.into(), credentials, storage }
    }

    /// Whether a volume with this name is attached.
    #[must_use]
    pub fn has_volume(&self, name: &str) -> bool {
        self.storage.iter().any(|mp| mp.name == name)
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "workload:{}:{}:{}", self.ip, self.credentials, display_list(&self.storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials::new("John", "JohnPass", "domain1")
    }

    fn storage() -> Vec<MountPoint> {
        vec![MountPoint::new("c:", 100), MountPoint::new("d:", 100)]
    }

    #[test]
    fn test_proper_workload() {
        let wl = Workload::new("192.168.1.1", credentials(), storage());
        assert_eq!(wl.ip, "192.168.1.1");
        assert_eq!(wl.credentials, credentials());
        assert_eq!(wl.storage, storage());
    }

    #[test]
    fn test_has_volume() {
        let wl = Workload::new("192.168.1.1", credentials(), storage());
        assert!(wl.has_volume("c:"));
        assert!(wl.has_volume("d:"));
        assert!(!wl.has_volume("e:"));
    }

    #[test]
    fn test_storage_order_matters_for_equality() {
        let a = Workload::new("192.168.1.1", credentials(), storage());
        let mut reversed = storage();
        reversed.reverse();
        let b = Workload::new("192.168.1.1", credentials(), reversed);
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_wrong_shape_on_decode() {
        // storage must be a list of mount points
        let err = serde_json::from_str::<Workload>(
            r#"{
                "ip": "192.168.1.1",
                "credentials": {"username": "u", "password": "p", "domain": "d"},
                "storage": [1, 2, 3]
            }"#,
        );
        assert!(err.is_err());

        let err = serde_json::from_str::<Workload>(
            r#"{"ip": "192.168.1.1", "credentials": "user:pass", "storage": []}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_display() {
        let wl = Workload::new("10.0.0.1", credentials(), vec![MountPoint::new("c:", 1)]);
        assert_eq!(
            wl.to_string(),
            "workload:10.0.0.1:credentials:John:JohnPass:domain1:[mountpoint:c:1]"
        );
        assert_eq!(WorkloadId(7).to_string(), "7");
    }
}
