use clap::Parser;
use std::fs;
use std::time::Duration;

pub mod types;
pub mod validation;

pub use types::{Args, CleanArgs, SeedAccount, SeedFile, StoreKind};

/// Parse the command line into validated settings.
///
/// # Errors
///
/// Will return `Err` if a startup script listed in the arguments cannot be read
pub fn args_checks() -> Result<CleanArgs, String> {
    CleanArgs::new(Args::parse())
}

impl CleanArgs {
    /// # Errors
    ///
    /// Will return `Err` if a startup script cannot be read
    pub fn new(args: Args) -> Result<Self, String> {
        let mut combined_sql_script = String::new();
        if let Some(db_startup_script) = &args.db_startup_script {
            for file in db_startup_script.split(';').map(str::trim).filter(|f| !f.is_empty()) {
                let script = fs::read_to_string(file)
                    .map_err(|e| format!("Failed to read SQL startup script '{file}': {e}"))?;
                combined_sql_script.push_str(&script);
                // push a newline just in case
                combined_sql_script.push('\n');
            }
        }
        Ok(CleanArgs {
            store: args.store,
            db_name: args.db_name,
            db_startup_script: args.db_startup_script,
            combined_sql_script,
            seed_accounts: args.seed_json.map(|seed| seed.0).unwrap_or_default(),
            bind: args.bind,
            port: args.port,
            static_dir: args.static_dir,
            auto_advance_delay: Duration::from_millis(args.auto_advance_ms),
            write_timeout: Duration::from_secs(args.write_timeout_secs),
            verbose: args.verbose,
        })
    }
}
