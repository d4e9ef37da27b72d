// Stockroom CLI - headless delivery reconciliation sessions

mod exit_codes;
mod load;
mod receive;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

/// A command failure carrying its shell exit code.
#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(about = "Procurement delivery reconciliation (CLI mode, headless)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delivery reconciliation sessions
    #[command(subcommand)]
    Receive(receive::ReceiveCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Receive(cmd) => receive::cmd_receive(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}
