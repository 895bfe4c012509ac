use crate::error::{ForumErrorExt, ForumErrorType, ForumResult};
use deser_hjson::from_str;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::{env, fs, io::ErrorKind, sync::LazyLock};
use structs::{DatabaseConnection, Settings};
use tracing::warn;

pub mod structs;

static DEFAULT_CONFIG_FILE: &str = "config/config.hjson";

#[allow(clippy::expect_used)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(|| {
  Settings::init().expect("Failed to load settings file, check FORUM_CONFIG_LOCATION")
});

impl Settings {
  /// Reads config from configuration file.
  ///
  /// Note: The env var `FORUM_DATABASE_URL` is parsed in
  /// `crates/utils/src/settings/mod.rs::get_database_url()`
  pub fn init() -> ForumResult<Self> {
    match Self::read_config_file() {
      Ok(config) => from_str::<Settings>(&config).with_forum_type(ForumErrorType::InvalidSettings),
      Err(e) if e.kind() == ErrorKind::NotFound => {
        warn!(
          "Config file {} not found, running with default settings",
          Self::get_config_location()
        );
        Ok(Settings::default())
      }
      Err(e) => Err(e).with_forum_type(ForumErrorType::InvalidSettings),
    }
  }

  /// Returns the postgres connection url. If FORUM_DATABASE_URL is set, that is used,
  /// otherwise the connection url is generated from the config.
  pub fn get_database_url(&self) -> String {
    if let Ok(url) = env::var("FORUM_DATABASE_URL") {
      return url;
    }
    match &self.database.connection {
      DatabaseConnection::Uri { uri } => uri.clone(),
      DatabaseConnection::Parts(parts) => {
        format!(
          "postgres://{}:{}@{}:{}/{}",
          utf8_percent_encode(&parts.user, NON_ALPHANUMERIC),
          utf8_percent_encode(&parts.password, NON_ALPHANUMERIC),
          parts.host,
          parts.port,
          utf8_percent_encode(&parts.database, NON_ALPHANUMERIC),
        )
      }
    }
  }

  fn get_config_location() -> String {
    env::var("FORUM_CONFIG_LOCATION").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string())
  }

  fn read_config_file() -> std::io::Result<String> {
    fs::read_to_string(Self::get_config_location())
  }
}
