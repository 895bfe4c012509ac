use diesel::result::{DatabaseErrorKind, Error as DieselError};
use forum_utils::error::{ForumError, ForumErrorType};
use std::mem::discriminant;

pub mod functions {
  use diesel::sql_types::Integer;

  // really this function is variadic, this just adds the two-argument version
  define_sql_function!(fn greatest(a: Integer, b: Integer) -> Integer);
}

/// Converts a database error, replacing its type when the error is of the given kind.
pub(crate) fn map_database_error(
  e: DieselError,
  kind: DatabaseErrorKind,
  error_type: ForumErrorType,
) -> ForumError {
  let matched =
    matches!(&e, DieselError::DatabaseError(k, _) if discriminant(k) == discriminant(&kind));
  let mut err = ForumError::from(e);
  if matched {
    err.error_type = error_type;
  }
  err
}
