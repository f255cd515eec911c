//! Local identity provider.
//!
//! Accounts are kept in an [`AccountStore`], so a uid minted at sign-up
//! outlives restarts and email changes. Who is signed in is not tracked
//! here; each browser holds its own session (see [`session`]).

pub mod session;

use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::model::{Account, User, UserId};
use crate::storage::{AccountStore, StorageError};

pub use session::{SESSION_COOKIE, SessionId, Sessions};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("An account already exists for that email")]
    EmailInUse,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Not signed in")]
    NotSignedIn,
    #[error("Enter your current password to change your email.")]
    ReauthRequired,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn verify(account: &Account, password: &str) -> bool {
    hash_password(&account.salt, password) == account.digest
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn display_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

pub struct LocalIdentity {
    accounts: Arc<dyn AccountStore>,
    // serializes the email-uniqueness check with the write that follows it
    writes: Mutex<()>,
}

impl LocalIdentity {
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            accounts,
            writes: Mutex::new(()),
        }
    }

    /// Create an account with a fresh uid.
    ///
    /// # Errors
    ///
    /// `InvalidEmail`, `WeakPassword` or `EmailInUse`; `Storage` if the
    /// account could not be written.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let _guard = self.writes.lock().await;
        if self.accounts.account_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }
        let salt = Uuid::new_v4().to_string();
        let account = Account {
            uid: UserId::from(Uuid::new_v4().simple().to_string()),
            email,
            display_name: display_name(name),
            digest: hash_password(&salt, password),
            salt,
        };
        self.accounts.insert_account(&account).await?;
        let user = account.user();
        tracing::info!(uid = %user.uid, "account created");
        Ok(user)
    }

    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or a wrong password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let account = self
            .accounts
            .account_by_email(&email)
            .await?
            .filter(|account| verify(account, password))
            .ok_or(AuthError::InvalidCredentials)?;
        let user = account.user();
        tracing::info!(uid = %user.uid, "signed in");
        Ok(user)
    }

    /// The current record for `uid`, or `None` once the account is gone.
    ///
    /// # Errors
    ///
    /// `Storage` if the lookup fails.
    pub async fn user(&self, uid: &UserId) -> Result<Option<User>, AuthError> {
        Ok(self.accounts.account(uid).await?.map(|a| a.user()))
    }

    async fn account(&self, uid: &UserId) -> Result<Account, AuthError> {
        self.accounts
            .account(uid)
            .await?
            .ok_or(AuthError::NotSignedIn)
    }

    /// Change the display name; an empty name falls back to the email's local part.
    ///
    /// # Errors
    ///
    /// `NotSignedIn` when `uid` has no account.
    pub async fn update_profile(&self, uid: &UserId, name: &str) -> Result<User, AuthError> {
        let _guard = self.writes.lock().await;
        let mut account = self.account(uid).await?;
        account.display_name = display_name(name);
        self.accounts.update_account(&account).await?;
        Ok(account.user())
    }

    /// Change the email. Requires the current password as fresh proof of
    /// identity. The uid stays the same.
    ///
    /// # Errors
    ///
    /// `ReauthRequired` if no password is given, `InvalidCredentials` if it is
    /// wrong, `InvalidEmail` or `EmailInUse` for the new address.
    pub async fn update_email(
        &self,
        uid: &UserId,
        new_email: &str,
        current_password: &str,
    ) -> Result<User, AuthError> {
        if current_password.is_empty() {
            return Err(AuthError::ReauthRequired);
        }
        let new_email = normalize_email(new_email)?;
        let _guard = self.writes.lock().await;
        let mut account = self.account(uid).await?;
        if !verify(&account, current_password) {
            return Err(AuthError::InvalidCredentials);
        }
        if new_email == account.email {
            return Ok(account.user());
        }
        if self.accounts.account_by_email(&new_email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }
        account.email = new_email;
        self.accounts.update_account(&account).await?;
        let user = account.user();
        tracing::info!(uid = %user.uid, "email changed");
        Ok(user)
    }
}
