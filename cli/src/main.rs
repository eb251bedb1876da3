mod commands;
mod display;

use anyhow::Result;
use clap::Parser;
use commands::*;

use weave_config::Config;

#[derive(Parser)]
#[command(name = "weave")]
#[command(about = "Weave tamper-evident ledger", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Demo {
            blocks,
            difficulty,
            json,
        } => demo(blocks, difficulty, json),
        Commands::Tamper { blocks, difficulty } => tamper(blocks, difficulty),
        Commands::Merkle { ids } => merkle(&ids),
        Commands::Hex { subcommand } => hex_command(subcommand),
        Commands::Config { subcommand } => match subcommand {
            ConfigCommands::View => Config::load()?.view(),
            ConfigCommands::Set { key, value } => {
                let mut cfg = Config::load()?;
                cfg.set_value(&key, &value)
            }
            ConfigCommands::Init => Config::init_default(),
        },
    }
}
