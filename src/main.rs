mod cli;

use std::fs::{self, OpenOptions};
use std::io;
use std::process::ExitCode;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use quill::Notebook;
use quill::core::config::{self, log_path};
use quill::tui;

use crate::cli::{Args, Command};

/// Log to `<data_dir>/quill.log`. The terminal belongs to the UI, so
/// nothing is logged to it; a missing log file is not fatal.
fn init_logging(level: LevelFilter) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let path = log_path();
    if let Some(dir) = path.parent()
        && fs::create_dir_all(dir).is_err()
    {
        return;
    }
    if let Ok(log_file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Log maintenance works without a config or a store.
    if let Some(Command::Logs { action }) = args.command {
        let mut out = io::stdout().lock();
        return match cli::execute_logs(action, &log_path(), &mut out) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("quill: {e}");
                ExitCode::FAILURE
            }
        };
    }

    init_logging(args.log_level.into());
    log::info!("Quill {} starting", env!("CARGO_PKG_VERSION"));

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("quill: {e}");
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(&file_config, args.db.as_deref());
    log::info!("Database: {}", resolved.db_path.display());

    // Must succeed before the terminal changes mode.
    let notebook = match Notebook::open(&resolved.db_path) {
        Ok(n) => n,
        Err(e) => {
            log::error!("Could not open store: {e}");
            eprintln!("quill: could not open {}: {e}", resolved.db_path.display());
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        None => tui::run(resolved, notebook).map_err(|e| e.to_string()),
        Some(command) => {
            let mut out = io::stdout().lock();
            cli::execute(command, &notebook, &resolved, &mut out).map_err(|e| e.to_string())
        }
    };

    match result {
        Ok(()) => {
            log::info!("Quill exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("quill: {e}");
            ExitCode::FAILURE
        }
    }
}
