use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite URL for the mirror; `None` keeps everything in memory.
    pub database_url: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Bucket list tracker API")]
pub struct Args {
    /// Host to bind to (overrides BUCKET_LIST_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKET_LIST_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BUCKET_LIST_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Keep all state in memory; nothing is persisted
    #[arg(long, conflicts_with = "database_url")]
    pub in_memory: bool,

    /// Run migrations and exit
    #[arg(long, conflicts_with = "in_memory")]
    pub migrate: bool,
}

/// Environment lookups, abstracted so config merging can be tested.
pub trait EnvSource {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Reads the real process environment.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();
        let migrate = args.migrate;
        Ok((Self::merge(args, &ProcessEnv)?, migrate))
    }

    /// Merge CLI args over environment values over defaults.
    pub fn merge(args: Args, env: &impl EnvSource) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env
            .var("BUCKET_LIST_HOST")
            .unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env.var("BUCKET_LIST_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKET_LIST_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKET_LIST_PORT"),
        };
        let env_db = env
            .var("BUCKET_LIST_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/bucket_list.db".into());

        // --- Merge ---
        let database_url = if args.in_memory {
            None
        } else {
            Some(args.database_url.unwrap_or(env_db))
        };

        Ok(Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
