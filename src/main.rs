use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;

use blas2aie::logging::{set_log_level, LogLevel};
use blas2aie::{codegen, log};

/// AI Engine code generator for BLAS kernel networks.
#[derive(Parser)]
#[command(name = "blas2aie", version, about)]
struct Cli {
    /// JSON file containing BLAS routines
    json: PathBuf,

    /// Output directory
    output: PathBuf,

    /// Set the logging level
    #[arg(short = 'l', long = "log-level")]
    log_level: Option<String>,
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    if let Some(level_str) = &cli.log_level {
        match LogLevel::from_str(&level_str.to_lowercase()) {
            Some(level) => set_log_level(level),
            None => fail(&format!("'{}' is not a supported log level", level_str)),
        }
    }

    if !cli.json.is_file() {
        fail(&format!("'{}' is not a regular file", cli.json.display()));
    }

    if !cli.output.exists() {
        match cli.output.parent() {
            Some(parent) if parent.as_os_str().is_empty() || parent.exists() => {
                if let Err(err) = std::fs::create_dir(&cli.output) {
                    fail(&format!(
                        "cannot create '{}': {}",
                        cli.output.display(),
                        err
                    ));
                }
            }
            _ => fail(&format!(
                "parent of '{}' does not exist",
                cli.output.display()
            )),
        }
    } else if !cli.output.is_dir() {
        fail(&format!("'{}' is not a directory", cli.output.display()));
    }

    if let Err(err) = codegen(&cli.json, &cli.output) {
        fail(&err.to_string());
    }

    log!(LogLevel::Status, "Generation complete");
}
