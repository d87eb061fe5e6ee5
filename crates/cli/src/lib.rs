pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "estimo",
    about = "Estimo operator CLI",
    long_about = "Operate Estimo runtime readiness, migrations, config inspection, demo data, and ad-hoc estimates.",
    after_help = "Examples:\n  estimo doctor --json\n  estimo estimate --file answers.json\n  estimo migrate"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load deterministic demo assessments into the configured database")]
    Seed,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, pricing tables, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Price an answers JSON file without touching the database")]
    Estimate {
        #[arg(long, help = "Path to an answers JSON file")]
        file: PathBuf,
        #[arg(long, help = "Emit the raw breakdown as JSON")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Estimate { file, json } => commands::estimate::run(&file, json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
