use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::model::WedgeInput;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Wedges persisted to a sqlite file
    Sqlite,
    /// Wedges kept in memory, lost on exit
    Memory,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Where wedge records are kept
    #[arg(short = 's', long, value_name = "STORE", value_enum, default_value = "sqlite")]
    pub store: StoreKind,

    /// For sqlite, the database filename.
    #[arg(
        short = 'n',
        long,
        value_name = "DATABASE_NAME",
        default_value = "dialed.db",
        value_parser = crate::args::validation::check_db_name
    )]
    pub db_name: String,

    /// If specified, this sql is run on program startup (sqlite only). Semicolon-separate several files.
    #[arg(long, value_name = "DATABASE_STARTUP_SCRIPT", value_parser = crate::args::validation::check_readable_file)]
    pub db_startup_script: Option<String>,

    /// Json file of accounts and wedges to create on startup.
    #[arg(long, value_name = "SEED_JSON", value_parser = crate::args::validation::check_readable_file_and_json)]
    pub seed_json: Option<SeedFile>,

    #[arg(short = 'b', long, value_name = "ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(short = 'p', long, value_name = "PORT", default_value = "8081")]
    pub port: u16,

    /// Directory served under /static
    #[arg(long, value_name = "DIR", default_value = "./static")]
    pub static_dir: String,

    /// Pause after the last shot of a stage before moving on, in milliseconds.
    #[arg(
        long,
        value_name = "MILLISECONDS",
        default_value = "400",
        value_parser = crate::args::validation::check_auto_advance_ms
    )]
    pub auto_advance_ms: u64,

    /// How long a save may take before it is reported as failed, in seconds.
    #[arg(
        long,
        value_name = "SECONDS",
        default_value = "10",
        value_parser = crate::args::validation::check_write_timeout_secs
    )]
    pub write_timeout_secs: u64,

    /// -v info, -vv debug, -vvv trace
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parsed contents of `--seed-json`.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(transparent)]
pub struct SeedFile(pub Vec<SeedAccount>);

/// One account in the seed file, with the wedges to put in its bag.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub wedges: Vec<WedgeInput>,
}

#[derive(Debug, Clone)]
pub struct CleanArgs {
    pub store: StoreKind,
    pub db_name: String,
    pub db_startup_script: Option<String>,
    pub combined_sql_script: String,
    pub seed_accounts: Vec<SeedAccount>,
    pub bind: String,
    pub port: u16,
    pub static_dir: String,
    pub auto_advance_delay: Duration,
    pub write_timeout: Duration,
    pub verbose: u8,
}
