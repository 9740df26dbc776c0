//! CLI smoke entry point.
//!
//! Loads settings (optionally from the TOML path given as the first argument),
//! starts logging, opens the database and reports schema and row counts.

use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use taskhub_core::db::migrations::latest_version;
use taskhub_core::db::open_db;
use taskhub_core::{core_version, init_from_settings, CoreServices, Settings};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("taskhub: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref())?;
    let logging_active = init_from_settings(&settings.logging)?;

    let conn = open_db(&settings.database.path)?;
    let services = CoreServices::new(&conn, &settings.pagination)?;
    let users = services.users.list()?;

    info!(
        "event=cli_status module=cli status=ok users={}",
        users.len()
    );
    println!("taskhub_core version={}", core_version());
    println!("database={}", settings.database.path.display());
    println!("schema_version={}", latest_version());
    println!("users={}", users.len());
    println!("logging={}", if logging_active { "file" } else { "off" });
    Ok(())
}
