use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};
use std::{
  backtrace::Backtrace,
  fmt,
  fmt::{Debug, Display},
};
use strum::{Display, EnumIter};

#[derive(Display, Debug, Serialize, Deserialize, Clone, PartialEq, Eq, EnumIter, Hash)]
#[serde(tag = "error", content = "message", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ForumErrorType {
  /// The voter already has a vote recorded on this target.
  DuplicateVote,
  /// The author vote was requested on a target the voter has already voted on.
  InvariantViolation,
  NotFound,
  /// The database failed in the middle of an operation. Nothing was committed.
  StorageError(String),
  CouldntRunMigrations,
  InvalidSettings,
  Unknown(String),
}

pub type ForumResult<T> = Result<T, ForumError>;

pub struct ForumError {
  pub error_type: ForumErrorType,
  pub inner: anyhow::Error,
  pub context: Backtrace,
}

impl ForumError {
  /// Whether retrying the whole operation could succeed. Only failures of the storage layer
  /// itself qualify, never a rejected vote.
  pub fn is_transient(&self) -> bool {
    match self.inner.downcast_ref::<DieselError>() {
      Some(DieselError::DatabaseError(kind, _)) => matches!(
        kind,
        DatabaseErrorKind::SerializationFailure
          | DatabaseErrorKind::ClosedConnection
          | DatabaseErrorKind::UnableToSendCommand
      ),
      Some(DieselError::BrokenTransactionManager) => true,
      _ => false,
    }
  }
}

impl<T> From<T> for ForumError
where
  T: Into<anyhow::Error>,
{
  fn from(t: T) -> Self {
    let cause = t.into();
    let error_type = match cause.downcast_ref::<DieselError>() {
      Some(&DieselError::NotFound) => ForumErrorType::NotFound,
      Some(e) => ForumErrorType::StorageError(e.to_string()),
      None => ForumErrorType::Unknown(format!("{}", &cause)),
    };
    ForumError {
      error_type,
      inner: cause,
      context: Backtrace::capture(),
    }
  }
}

impl Debug for ForumError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ForumError")
      .field("message", &self.error_type)
      .field("inner", &self.inner)
      .field("context", &self.context)
      .finish()
  }
}

impl Display for ForumError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}: ", &self.error_type)?;
    writeln!(f, "{}", self.inner)?;
    fmt::Display::fmt(&self.context, f)
  }
}

impl From<ForumErrorType> for ForumError {
  fn from(error_type: ForumErrorType) -> Self {
    let inner = anyhow::anyhow!("{}", error_type);
    ForumError {
      error_type,
      inner,
      context: Backtrace::capture(),
    }
  }
}

pub trait ForumErrorExt<T, E: Into<anyhow::Error>> {
  fn with_forum_type(self, error_type: ForumErrorType) -> ForumResult<T>;
}

impl<T, E: Into<anyhow::Error>> ForumErrorExt<T, E> for Result<T, E> {
  fn with_forum_type(self, error_type: ForumErrorType) -> ForumResult<T> {
    self.map_err(|error| ForumError {
      error_type,
      inner: error.into(),
      context: Backtrace::capture(),
    })
  }
}

pub trait ForumErrorExt2<T> {
  fn with_forum_type(self, error_type: ForumErrorType) -> ForumResult<T>;
  fn into_anyhow(self) -> Result<T, anyhow::Error>;
}

impl<T> ForumErrorExt2<T> for ForumResult<T> {
  fn with_forum_type(self, error_type: ForumErrorType) -> ForumResult<T> {
    self.map_err(|mut e| {
      e.error_type = error_type;
      e
    })
  }
  // this function can't be an impl From or similar because it would conflict with one of the other
  // broad Into<> implementations
  fn into_anyhow(self) -> Result<T, anyhow::Error> {
    self.map_err(|e| e.inner)
  }
}
