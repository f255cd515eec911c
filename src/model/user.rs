use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier handed out by the identity provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub uid: UserId,
    pub email: String,
    pub name: String,
}

impl User {
    /// Builds a user, falling back to the email's local part when no display name is set.
    #[must_use]
    pub fn new(uid: UserId, email: &str, display_name: Option<&str>) -> Self {
        let name = match display_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => email.split('@').next().unwrap_or(email).to_string(),
        };
        Self {
            uid,
            email: email.to_string(),
            name,
        }
    }
}

/// Stored sign-in record. The uid is minted once at sign-up and never
/// changes, so an email change keeps every wedge with its owner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub uid: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub salt: String,
    /// Hex sha256 of salt then password.
    pub digest: String,
}

impl Account {
    #[must_use]
    pub fn user(&self) -> User {
        User::new(self.uid.clone(), &self.email, self.display_name.as_deref())
    }
}
