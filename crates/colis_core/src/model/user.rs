//! User account model.
//!
//! # Invariants
//! - `username` is not unique; lookups return the first matching row.
//! - `password` is stored and compared as plaintext.

use serde::Serialize;
use std::fmt::{Debug, Formatter};

/// SQLite row id of a user.
pub type UserId = i64;

/// Account created at signup. Never updated or deleted afterwards.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Plaintext credential; never serialized.
    #[serde(skip_serializing)]
    pub password: String,
    pub phone: Option<String>,
}

impl Debug for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .finish()
    }
}
