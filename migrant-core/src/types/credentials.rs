//! Credential value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Username, password and domain used to log into a workload or a cloud
/// account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub domain: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self { username: username.into(), password: password.into(), domain: domain.into() }
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "credentials:{}:{}:{}", self.username, self.password, self.domain)
    }
}
