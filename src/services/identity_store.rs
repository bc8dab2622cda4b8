//! Account registration and credential checks.

use crate::models::account::Account;
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use thiserror::Error;
use uuid::Uuid;

const IDENTIFIER_MIN_LEN: usize = 5;
const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("email too short. Please enter more than 4 characters")]
    IdentifierTooShort,
    #[error("Please enter at least 8 characters for your password")]
    PasswordTooShort,
    #[error("User already exists with that email")]
    AlreadyExists,
    #[error("Email not found. Please sign up to continue")]
    UnknownAccount,
    #[error("Incorrect password")]
    IncorrectPassword,
    #[error("identity store lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// In-memory mapping of account identifier to salted secret.
#[derive(Debug, Default)]
pub struct IdentityStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted accounts.
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|account| (account.identifier.clone(), account))
            .collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    fn read_guard(&self) -> IdentityResult<RwLockReadGuard<'_, HashMap<String, Account>>> {
        self.accounts
            .read()
            .map_err(|_| IdentityError::LockPoisoned("read"))
    }

    fn write_guard(&self) -> IdentityResult<RwLockWriteGuard<'_, HashMap<String, Account>>> {
        self.accounts
            .write()
            .map_err(|_| IdentityError::LockPoisoned("write"))
    }

    /// Register a new account. Identifiers are immutable once created.
    pub fn register(&self, identifier: &str, password: &str) -> IdentityResult<Account> {
        let mut accounts = self.write_guard()?;
        let account = new_account(&accounts, identifier, password)?;
        accounts.insert(account.identifier.clone(), account.clone());
        Ok(account)
    }

    /// Validate a registration and build the account without storing it.
    ///
    /// Callers must serialize `prepare` and [`IdentityStore::insert`] against
    /// other registrations.
    pub fn prepare(&self, identifier: &str, password: &str) -> IdentityResult<Account> {
        new_account(&*self.read_guard()?, identifier, password)
    }

    pub fn insert(&self, account: Account) -> IdentityResult<()> {
        self.write_guard()?.insert(account.identifier.clone(), account);
        Ok(())
    }

    /// Check a password and return the canonical identifier on success.
    pub fn verify(&self, identifier: &str, password: &str) -> IdentityResult<String> {
        let accounts = self.read_guard()?;
        let account = accounts
            .get(identifier.trim())
            .ok_or(IdentityError::UnknownAccount)?;
        if digest_secret(&account.salt, password) != account.secret {
            return Err(IdentityError::IncorrectPassword);
        }
        Ok(account.identifier.clone())
    }

}

fn new_account(
    accounts: &HashMap<String, Account>,
    identifier: &str,
    password: &str,
) -> IdentityResult<Account> {
    let identifier = identifier.trim();
    if identifier.chars().count() < IDENTIFIER_MIN_LEN {
        return Err(IdentityError::IdentifierTooShort);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(IdentityError::PasswordTooShort);
    }
    if accounts.contains_key(identifier) {
        return Err(IdentityError::AlreadyExists);
    }

    let salt = Uuid::new_v4().simple().to_string();
    Ok(Account {
        identifier: identifier.to_string(),
        secret: digest_secret(&salt, password),
        salt,
    })
}

fn digest_secret(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
