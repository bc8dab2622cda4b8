//! Represents a registered account in the identity store.

use serde::{Deserialize, Serialize};

/// A registered account.
///
/// The secret is never the plain password: it is `hex(sha256(salt || password))`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Unique account identifier (the email used at registration).
    pub identifier: String,

    /// Per-account random salt.
    pub salt: String,

    /// Salted password digest.
    pub secret: String,
}
