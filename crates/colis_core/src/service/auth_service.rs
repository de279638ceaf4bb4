//! Signup and login use-cases.
//!
//! Passwords are stored and compared in plaintext, matching existing
//! databases. Hashing would need a data migration and is not done here.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum password length, in characters, accepted at signup.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AuthError {
    /// A required form field is empty.
    MissingField(&'static str),
    PasswordTooShort { min_chars: usize },
    PasswordMismatch,
    InvalidCredentials,
    Store(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "field `{field}` is required"),
            Self::PasswordTooShort { min_chars } => {
                write!(f, "password must contain at least {min_chars} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords do not match"),
            Self::InvalidCredentials => write!(f, "incorrect username or password"),
            Self::Store(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}

/// Account service facade over a user repository.
pub struct AuthService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an account after checking the signup form.
    ///
    /// Checks run in order: all fields present, password length, confirmation.
    /// Accounts are created without a phone number.
    pub fn sign_up(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserId, AuthError> {
        for (name, value) in [
            ("username", username),
            ("password", password),
            ("confirm_password", confirm_password),
        ] {
            if value.is_empty() {
                return Err(AuthError::MissingField(name));
            }
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::PasswordTooShort {
                min_chars: MIN_PASSWORD_CHARS,
            });
        }
        if password != confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let id = self.repo.create_user(username, password, None)?;
        info!("event=user_signup module=service status=ok user_id={id}");
        Ok(id)
    }

    /// Returns the account matching both credentials exactly.
    pub fn log_in(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        match self.repo.find_by_credentials(username, password)? {
            Some(user) => {
                info!("event=user_login module=service status=ok user_id={}", user.id);
                Ok(user)
            }
            None => {
                warn!("event=user_login module=service status=rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
