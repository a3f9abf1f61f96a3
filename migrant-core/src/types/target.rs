//! Migration target domain types.

use crate::error::{MigrantError, Result};
use crate::types::{Credentials, Workload, WorkloadId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudType {
    Aws,
    Azure,
    Vsphere,
    Vcloud,
}

impl CloudType {
    pub const ALL: [CloudType; 4] = [Self::Aws, Self::Azure, Self::Vsphere, Self::Vcloud];

    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Vsphere => "vsphere",
            Self::Vcloud => "vcloud",
        }
    }
}

impl FromStr for CloudType {
    type Err = MigrantError;

    /// Exact, case-sensitive match against the fixed provider set.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| MigrantError::InvalidCloudType { cloud_type: s.to_string() })
    }
}

impl fmt::Display for CloudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a migration lands: a cloud provider account and the destination
/// workload inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTarget {
    cloud_type: CloudType,

    /// Credentials for the cloud provider account
    pub cloud_credentials: Credentials,

    /// Destination workload
    pub target_vm: WorkloadId,
}

impl MigrationTarget {
    /// # Errors
    ///
    /// Returns `MigrantError::InvalidCloudType` if `cloud_type` is not one of
    /// `aws`, `azure`, `vsphere`, `vcloud`.
    pub fn new(
        cloud_type: &str,
        cloud_credentials: Credentials,
        target_vm: WorkloadId,
    ) -> Result<Self> {
        Ok(Self::with_cloud_type(cloud_type.parse()?, cloud_credentials, target_vm))
    }

    /// Build a target from an already-validated cloud type.
    pub fn with_cloud_type(
        cloud_type: CloudType,
        cloud_credentials: Credentials,
        target_vm: WorkloadId,
    ) -> Self {
        Self { cloud_type, cloud_credentials, target_vm }
    }

    /// # Errors
    ///
    /// Returns `MigrantError::InvalidCloudType` and keeps the current value if
    /// `cloud_type` is not a supported provider.
    pub fn change_cloud_type(&mut self, cloud_type: &str) -> Result<()> {
        self.cloud_type = cloud_type.parse()?;
        Ok(())
    }

    #[must_use]
    pub fn cloud_type(&self) -> CloudType {
        self.cloud_type
    }
}

impl fmt::Display for MigrationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "migration_target:{}:{}:workload#{}",
            self.cloud_type, self.cloud_credentials, self.target_vm
        )
    }
}

/// Self-contained copy of a [`MigrationTarget`] with its destination
/// workload resolved.
///
/// This is the form a target takes in a snapshot, where workload keys have
/// no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTargetRecord {
    pub cloud_type: CloudType,
    pub cloud_credentials: Credentials,
    pub target_vm: Workload,
}

impl fmt::Display for MigrationTargetRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "migration_target:{}:{}:{}",
            self.cloud_type, self.cloud_credentials, self.target_vm
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud_credentials() -> Credentials {
        Credentials::new("John", "JohnPass", "domain1")
    }

    #[test]
    fn test_cloud_type_roundtrip() {
        for ct in CloudType::ALL {
            assert_eq!(ct.as_str().parse::<CloudType>().unwrap(), ct);
        }
        assert!("amazon".parse::<CloudType>().is_err());
        assert!("AWS".parse::<CloudType>().is_err());
        assert!("".parse::<CloudType>().is_err());
    }

    #[test]
    fn test_proper_migration_target() {
        let mt = MigrationTarget::new("aws", cloud_credentials(), WorkloadId(1)).unwrap();
        assert_eq!(mt.cloud_type(), CloudType::Aws);
        assert_eq!(mt.cloud_credentials, cloud_credentials());
        assert_eq!(mt.target_vm, WorkloadId(1));
    }

    #[test]
    fn test_cloud_type_not_in_set() {
        let err = MigrationTarget::new("amazon", cloud_credentials(), WorkloadId(1)).unwrap_err();
        assert!(
            matches!(err, MigrantError::InvalidCloudType { ref cloud_type } if cloud_type == "amazon")
        );
    }

    #[test]
    fn test_change_cloud_type() {
        let mut mt = MigrationTarget::new("aws", cloud_credentials(), WorkloadId(1)).unwrap();
        for name in ["aws", "azure", "vsphere", "vcloud"] {
            mt.change_cloud_type(name).unwrap();
            assert_eq!(mt.cloud_type().as_str(), name);
        }

        assert!(mt.change_cloud_type("google").is_err());
        assert_eq!(mt.cloud_type(), CloudType::Vcloud);
    }

    #[test]
    fn test_serialized_cloud_type_is_lowercase() {
        let mt = MigrationTarget::new("vsphere", cloud_credentials(), WorkloadId(3)).unwrap();
        let json = serde_json::to_value(&mt).unwrap();
        assert_eq!(json["cloud_type"], "vsphere");
        assert_eq!(json["target_vm"], 3);

        let bad = r#"{"cloud_type": "google", "cloud_credentials": {"username": "u", "password": "p", "domain": "d"}, "target_vm": 1}"#;
        assert!(serde_json::from_str::<MigrationTarget>(bad).is_err());
    }
}
