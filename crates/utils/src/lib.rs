#[macro_use]
extern crate smart_default;

pub mod error;
pub mod settings;

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence over the default filter.
pub fn init_logging() {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new("warn,forum_voting=info,forum_diesel_utils=info"));
  // Fails only if a subscriber is already installed, which is fine in tests
  tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}
