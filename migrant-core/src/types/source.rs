//! Source endpoint identity.

use crate::error::{MigrantError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection identity of a source machine.
///
/// Address, username and password can be changed independently. The
/// address can be pinned at construction with [`Source::with_fixed_ip`];
/// a pinned address silently ignores `change_ip` for the lifetime of the
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    ip: String,
    username: String,
    password: String,
    change_ip_possible: bool,
}

impl Source {
    /// Create a source whose address may change later.
    pub fn new(
        ip: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            username: username.into(),
            password: password.into(),
            change_ip_possible: true,
        }
    }

    /// Create a source whose address can never change.
    pub fn with_fixed_ip(
        ip: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self { change_ip_possible: false, ..Self::new(ip, username, password) }
    }

    /// Change the address. No-op if the address is pinned.
    ///
    /// # Errors
    ///
    /// Returns `MigrantError::InvalidArgument` if `ip` is `None`, even when
    /// the address is pinned.
    pub fn change_ip(&mut self, ip: Option<&str>) -> Result<()> {
        let ip = require("ip", ip)?;
        if self.change_ip_possible {
            self.ip = ip.to_string();
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `MigrantError::InvalidArgument` if `username` is `None`.
    pub fn change_username(&mut self, username: Option<&str>) -> Result<()> {
        self.username = require("username", username)?.to_string();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `MigrantError::InvalidArgument` if `password` is `None`.
    pub fn change_password(&mut self, password: Option<&str>) -> Result<()> {
        self.password = require("password", password)?.to_string();
        Ok(())
    }

    #[must_use]
    pub fn ip(&self) -> &str {
        &self.ip
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

fn require<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| MigrantError::invalid_argument(field, "value is absent"))
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source:{}:{}:{}", self.ip, self.username, self.password)
    }
}
