use forum_utils::{error::ForumErrorExt2, settings::SETTINGS};

/// Very minimal wrapper around `forum_diesel_utils::schema_setup::run` to allow running
/// migrations without starting anything else.
fn main() -> anyhow::Result<()> {
  if std::env::args().len() > 1 {
    anyhow::bail!("Configure the database with FORUM_DATABASE_URL or config/config.hjson.");
  }
  forum_utils::init_logging();

  forum_diesel_utils::schema_setup::run(&SETTINGS.get_database_url()).into_anyhow()?;

  Ok(())
}
