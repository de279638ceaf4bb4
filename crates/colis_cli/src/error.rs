//! CLI error type: wraps core errors and command-line input problems.

use colis_core::print::PrinterRegistryError;
use colis_core::{AuthError, DbError, LabelError, LoggingError, RecordServiceError, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub enum CliError {
    Db(DbError),
    Repo(RepoError),
    Record(RecordServiceError),
    Auth(AuthError),
    Logging(LoggingError),
    Label(LabelError),
    Printer(PrinterRegistryError),
    PrintFailed(String),
    UnknownField(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "database error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Record(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Label(err) => write!(f, "{err}"),
            Self::Printer(err) => write!(f, "{err}"),
            Self::PrintFailed(reason) => write!(f, "print failed: {reason}"),
            Self::UnknownField(key) => write!(f, "unknown record field `{key}`"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "cannot encode JSON output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Record(err) => Some(err),
            Self::Auth(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Label(err) => Some(err),
            Self::Printer(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::PrintFailed(_) | Self::UnknownField(_) => None,
        }
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<RecordServiceError> for CliError {
    fn from(value: RecordServiceError) -> Self {
        Self::Record(value)
    }
}

impl From<AuthError> for CliError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<LabelError> for CliError {
    fn from(value: LabelError) -> Self {
        Self::Label(value)
    }
}

impl From<PrinterRegistryError> for CliError {
    fn from(value: PrinterRegistryError) -> Self {
        Self::Printer(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
