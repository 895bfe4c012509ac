use anyhow::anyhow;
use diesel::Connection;
use diesel_async::{async_connection_wrapper::AsyncConnectionWrapper, AsyncPgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};
use forum_utils::error::{ForumErrorExt, ForumErrorType, ForumResult};
use std::thread;
use tracing::info;

// `?` can't convert `diesel::migration::Result` to some other types because of https://github.com/dtolnay/anyhow/issues/66

pub const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

/// Migrations don't support async connections, so they run through a blocking wrapper.
pub type BlockingPgConnection = AsyncConnectionWrapper<AsyncPgConnection>;

/// Runs all pending migrations. Safe to call from inside a tokio runtime: the blocking
/// migration connection lives on its own thread.
pub fn run(db_url: &str) -> ForumResult<()> {
  let db_url = db_url.to_owned();
  let handle = thread::spawn(move || run_pending_migrations(&db_url));
  match handle.join() {
    Ok(res) => res,
    Err(e) => Err(anyhow!("Migration thread panicked: {e:?}"))
      .with_forum_type(ForumErrorType::CouldntRunMigrations),
  }
}

fn run_pending_migrations(db_url: &str) -> ForumResult<()> {
  let mut conn = establish(db_url)?;

  if !conn
    .has_pending_migration(MIGRATIONS)
    .map_err(|e| anyhow!("Couldn't check DB migrations: {e}"))
    .with_forum_type(ForumErrorType::CouldntRunMigrations)?
  {
    return Ok(());
  }

  info!("Running Database migrations (This may take a long time)...");
  let executed = conn
    .run_pending_migrations(MIGRATIONS)
    .map_err(|e| anyhow!("Couldn't run DB Migrations: {e}"))
    .with_forum_type(ForumErrorType::CouldntRunMigrations)?;
  info!("Database migrations complete, {} applied.", executed.len());

  Ok(())
}

fn establish(db_url: &str) -> ForumResult<BlockingPgConnection> {
  BlockingPgConnection::establish(db_url).with_forum_type(ForumErrorType::CouldntRunMigrations)
}
