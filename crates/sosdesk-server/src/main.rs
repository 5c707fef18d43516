//! sosdesk server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `SOSDESK_*` environment variables, opens the SQLite store and serves the
//! SOS intake and admin API over HTTP.
//!
//! # Admin password hash
//!
//! `admin_password_hash` must be an argon2 PHC string. Generate one with:
//!
//! ```
//! cargo run -p sosdesk-server --bin sosdesk -- --hash-password
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHash, PasswordHasher, password_hash::SaltString};
use clap::Parser;
use rand_core::OsRng;
use sosdesk_server::{AppState, ServerConfig};
use sosdesk_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SOS emergency report server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("SOSDESK")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("cors_allow_origins"),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig (admin_username and admin_password_hash are required)")?;
  check_admin(&server_cfg)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = %store_path.display(), "opened sos store");

  let state = AppState {
    store:  Arc::new(store),
    auth:   Arc::new(server_cfg.auth()),
    config: Arc::new(server_cfg.clone()),
  };

  let app = sosdesk_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Refuse to start with an unusable admin account.
fn check_admin(config: &ServerConfig) -> anyhow::Result<()> {
  if config.admin_username.trim().is_empty() {
    anyhow::bail!("admin_username must not be empty");
  }
  PasswordHash::new(&config.admin_password_hash).map_err(|e| {
    anyhow::anyhow!("admin_password_hash is not an argon2 PHC string: {e}")
  })?;
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
