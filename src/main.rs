use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

mod clock;
mod config;
mod error;
mod logger;
mod normalize_command;
mod normalizer;
mod retry;
mod round_command;
mod rounding;
mod sink;
mod time_entry;

use clock::SystemClock;
use config::Config;
use normalize_command::{NormalizeArgs, NormalizeCommand};
use round_command::{round_command, RoundArgs};
use sink::JsonLinesSink;

/// time entryの時刻を正規化するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- normalize --start 09:00 --end 09:22
/// $ cargo run -- normalize --type item --quantity 3
/// $ cargo run -- round 22
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        long = "config",
        help = "Path to the config file",
        parse(from_os_str)
    )]
    config: Option<PathBuf>,

    #[clap(
        short = 'v',
        long = "verbose",
        help = "Increases log verbosity",
        parse(from_occurrences)
    )]
    verbose: u64,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    Normalize(NormalizeArgs),
    Round(RoundArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("Failed to load config")?;
    logger::init(logger::raise(
        LevelFilter::from(config.log_level),
        args.verbose,
    ))?;

    match args.subcommand {
        SubCommands::Normalize(normalize) => {
            let writer: Box<dyn Write> = match normalize.output() {
                Some(path) => Box::new(
                    OpenOptions::new()
                        .create(true)
                        .append(true)
                        .open(path)
                        .with_context(|| format!("Failed to open output: {}", path.display()))?,
                ),
                None => Box::new(io::stdout()),
            };
            let mut sink = JsonLinesSink::new(writer);
            let clock = SystemClock;
            let mut command =
                NormalizeCommand::new(&clock, &mut sink, config.policy, &config.retry);
            command.run(normalize).await?;
        }
        SubCommands::Round(round) => round_command(round)?,
    }

    Ok(())
}
