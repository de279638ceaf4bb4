//! User account repository.
//!
//! # Invariants
//! - No uniqueness check on `username`; the first row by id wins on lookup.
//! - Credentials are matched exactly and case-sensitively, in plaintext.
//! - There is no update or delete path.

use crate::model::user::{User, UserId};
use crate::repo::schema::{ensure_connection_ready, USERS_COLUMNS};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};

/// Repository interface for user accounts.
pub trait UserRepository {
    fn create_user(&self, username: &str, password: &str, phone: Option<&str>)
        -> RepoResult<UserId>;
    /// Returns the first user whose username and password both match.
    fn find_by_credentials(&self, username: &str, password: &str) -> RepoResult<Option<User>>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("users", USERS_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(
        &self,
        username: &str,
        password: &str,
        phone: Option<&str>,
    ) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (username, password, phone) VALUES (?1, ?2, ?3);",
            params![username, password, phone],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn find_by_credentials(&self, username: &str, password: &str) -> RepoResult<Option<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, password, phone
             FROM users
             WHERE username = ?1 AND password = ?2
             ORDER BY id ASC
             LIMIT 1;",
        )?;
        let mut rows = stmt.query([username, password])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, password, phone FROM users WHERE id = ?1;")?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        password: row.get("password")?,
        phone: parse_phone(row)?,
    })
}

/// Older schemas typed `users.phone` as INTEGER and stored `''` for
/// "no phone"; both shapes are normalized here.
fn parse_phone(row: &Row<'_>) -> RepoResult<Option<String>> {
    match row.get_ref("phone")? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(value) => Ok(Some(value.to_string())),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| RepoError::InvalidData("non UTF-8 text in users.phone".to_string()))?;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        other => Err(RepoError::InvalidData(format!(
            "unexpected {} value in users.phone",
            other.data_type()
        ))),
    }
}
