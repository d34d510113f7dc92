//! Account credentials for the registry login exchange.

use std::fmt;

use crate::error::{Error, Result};

/// Username and password for a registry account.
///
/// Both values are required to be non-empty. The password is held only in
/// memory and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates validated credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if either value is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use hubprune_core::Credentials;
    ///
    /// let creds = Credentials::new("acme", "s3cret")?;
    /// assert_eq!(creds.username(), "acme");
    /// assert!(Credentials::new("", "s3cret").is_err());
    /// # Ok::<(), hubprune_core::Error>(())
    /// ```
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();

        if username.trim().is_empty() {
            return Err(Error::MissingCredential { field: "username" });
        }
        if password.is_empty() {
            return Err(Error::MissingCredential { field: "password" });
        }

        Ok(Self { username, password })
    }

    /// Returns the account username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the account password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("acme", "pw").unwrap();
        assert_eq!(creds.username(), "acme");
        assert_eq!(creds.password(), "pw");
    }

    #[test]
    fn test_credentials_reject_empty() {
        assert!(matches!(
            Credentials::new("  ", "pw"),
            Err(Error::MissingCredential { field: "username" })
        ));
        assert!(matches!(
            Credentials::new("acme", ""),
            Err(Error::MissingCredential { field: "password" })
        ));
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials::new("acme", "hunter2").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("acme"));
        assert!(!debug.contains("hunter2"));
    }
}
