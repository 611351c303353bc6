pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pharmabot",
    about = "Pharmabot operator CLI",
    long_about = "Inspect pharmabot configuration, check runtime readiness, and query the vendor price list.",
    after_help = "Examples:\n  pharmabot doctor --json\n  pharmabot config\n  pharmabot prices amlodipine"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, LLM key presence, order log path, and price list reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Fetch the price list and run a product lookup")]
    Prices {
        #[arg(required = true, num_args = 1.., help = "Product name or fragment")]
        query: Vec<String>,
    },
}

pub fn run() -> ExitCode {
    pharmabot_server::load_dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Prices { query } => commands::prices::run(&query.join(" ")),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
