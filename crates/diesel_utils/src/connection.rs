use deadpool::Runtime;
use diesel::result::Error::{self as DieselError, QueryBuilderError};
use diesel_async::{
  pg::AsyncPgConnection,
  pooled_connection::{
    deadpool::{Hook, HookError, Object as PooledConnection, Pool},
    AsyncDieselConnectionManager,
  },
  scoped_futures::ScopedBoxFuture,
  AsyncConnection,
};
use forum_utils::{
  error::{ForumError, ForumResult},
  settings::SETTINGS,
};
use std::{
  ops::{Deref, DerefMut},
  time::Duration,
};
use tracing::info;

pub type ActualDbPool = Pool<AsyncPgConnection>;

/// References a pool or connection. Functions must take `&mut DbPool<'_>` to allow implicit
/// reborrowing.
///
/// https://github.com/rust-lang/rfcs/issues/1403
pub enum DbPool<'a> {
  Pool(&'a ActualDbPool),
  Conn(&'a mut AsyncPgConnection),
}

pub enum DbConn<'a> {
  Pool(PooledConnection<AsyncPgConnection>),
  Conn(&'a mut AsyncPgConnection),
}

pub async fn get_conn<'a, 'b: 'a>(pool: &'a mut DbPool<'b>) -> Result<DbConn<'a>, DieselError> {
  Ok(match pool {
    DbPool::Pool(pool) => DbConn::Pool(pool.get().await.map_err(|e| QueryBuilderError(e.into()))?),
    DbPool::Conn(conn) => DbConn::Conn(conn),
  })
}

impl DbConn<'_> {
  /// Runs the callback in a transaction. Returning an error from the callback rolls back every
  /// statement it executed. When the connection is already inside a transaction, a savepoint is
  /// used instead.
  pub async fn run_transaction<'a, R, F>(&mut self, callback: F) -> ForumResult<R>
  where
    F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, ForumResult<R>>
      + Send
      + 'a,
    R: Send + 'a,
  {
    self
      .deref_mut()
      .transaction::<_, ForumError, _>(callback)
      .await
  }
}

impl Deref for DbConn<'_> {
  type Target = AsyncPgConnection;

  fn deref(&self) -> &Self::Target {
    match self {
      DbConn::Pool(conn) => conn.deref(),
      DbConn::Conn(conn) => conn.deref(),
    }
  }
}

impl DerefMut for DbConn<'_> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    match self {
      DbConn::Pool(conn) => conn.deref_mut(),
      DbConn::Conn(conn) => conn.deref_mut(),
    }
  }
}

// Allows functions that take `DbPool<'_>` to be called in a transaction by passing `&mut
// conn.into()`
impl<'a> From<&'a mut AsyncPgConnection> for DbPool<'a> {
  fn from(value: &'a mut AsyncPgConnection) -> Self {
    DbPool::Conn(value)
  }
}

impl<'a, 'b: 'a> From<&'a mut DbConn<'b>> for DbPool<'a> {
  fn from(value: &'a mut DbConn<'b>) -> Self {
    DbPool::Conn(value.deref_mut())
  }
}

impl<'a> From<&'a ActualDbPool> for DbPool<'a> {
  fn from(value: &'a ActualDbPool) -> Self {
    DbPool::Pool(value)
  }
}

pub fn build_db_pool() -> ForumResult<ActualDbPool> {
  let db_url = SETTINGS.get_database_url();
  let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&db_url);
  let pool = Pool::builder(manager)
    .max_size(SETTINGS.database.pool_size)
    .runtime(Runtime::Tokio1)
    // Limit connection age to prevent use of prepared statements that have query plans based on
    // very old statistics
    .pre_recycle(Hook::sync_fn(|_conn, metrics| {
      // Preventing the first recycle can cause an infinite loop when trying to get a new connection
      // from the pool
      let conn_was_used = metrics.recycled.is_some();
      if metrics.age() > Duration::from_secs(3 * 24 * 60 * 60) && conn_was_used {
        Err(HookError::Message("Connection is too old".into()))
      } else {
        Ok(())
      }
    }))
    .build()?;

  crate::schema_setup::run(&db_url)?;
  info!("Database pool ready with {} connections", SETTINGS.database.pool_size);

  Ok(pool)
}

#[allow(clippy::expect_used)]
pub fn build_db_pool_for_tests() -> ActualDbPool {
  build_db_pool().expect("db pool missing")
}

#[cfg(test)]
mod tests {
  use super::*;
  use diesel::{dsl::sql, select, sql_types::Integer};
  use diesel_async::{scoped_futures::ScopedFutureExt, RunQueryDsl};
  use forum_utils::error::ForumErrorType;
  use pretty_assertions::assert_eq;
  use serial_test::serial;

  #[tokio::test]
  #[serial]
  async fn test_pool_and_conn_are_interchangeable() -> ForumResult<()> {
    let actual_pool = &build_db_pool_for_tests();
    let pool = &mut actual_pool.into();
    let conn = &mut get_conn(pool).await?;

    let one: i32 = select(sql::<Integer>("1")).get_result(conn).await?;
    assert_eq!(1, one);

    let inner = &mut DbPool::from(conn);
    let two: i32 = select(sql::<Integer>("2"))
      .get_result(&mut get_conn(inner).await?)
      .await?;
    assert_eq!(2, two);

    Ok(())
  }

  #[tokio::test]
  #[serial]
  async fn test_failed_transaction_returns_error() -> ForumResult<()> {
    let actual_pool = &build_db_pool_for_tests();
    let pool = &mut actual_pool.into();
    let conn = &mut get_conn(pool).await?;

    let res = conn
      .run_transaction(|conn| {
        async move {
          select(sql::<Integer>("1")).execute(conn).await?;
          Err::<(), ForumError>(ForumErrorType::InvariantViolation.into())
        }
        .scope_boxed()
      })
      .await;
    assert!(matches!(
      res.map_err(|e| e.error_type),
      Err(ForumErrorType::InvariantViolation)
    ));

    // The connection is usable again after the rollback
    let three: i32 = select(sql::<Integer>("3")).get_result(conn).await?;
    assert_eq!(3, three);

    Ok(())
  }
}
