//! ETG CLI
//!
//! Command-line interface for managing versioned card snapshots

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use etg_core::logging_facility::{self, Profile};

mod commands;
mod config;

use commands::Context;
use config::{Config, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "etg")]
#[command(about = "ETG - versioned card snapshots, archives and remote mirrors", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Configuration file; `etg.toml` is used when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding `db/` and `zip/`; overrides `storage.data_root`
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Log output format; overrides `log.format`
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch card data and merge it into a snapshot
    Update(commands::snapshot::UpdateArgs),
    /// Fork a snapshot into the next version
    Increment(commands::VersionArgs),
    /// Compress a snapshot into an archive
    Zip(commands::VersionArgs),
    /// Decompress an archive into a snapshot
    Unzip(commands::VersionArgs),
    /// Upload an archive and prune old remote archives
    Push(commands::remote::PushArgs),
    /// Download an archive and decompress it
    Pull(commands::VersionArgs),
    /// Show row counts and leading rows of each table
    Info(commands::snapshot::InfoArgs),
    /// Reclaim space in a snapshot
    Vacuum(commands::VersionArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(cli.config.as_deref()).map_err(etg_core::ExError::from)?;

    let profile = match cli.log_format.unwrap_or(config.log.format) {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    };
    logging_facility::init(profile);

    let ctx = Context::new(config, cli.data_root);
    match cli.command {
        Commands::Update(args) => commands::snapshot::execute_update(args, &ctx),
        Commands::Increment(args) => commands::snapshot::execute_increment(args, &ctx),
        Commands::Zip(args) => commands::archive::execute_zip(args, &ctx),
        Commands::Unzip(args) => commands::archive::execute_unzip(args, &ctx),
        Commands::Push(args) => commands::remote::execute_push(args, &ctx),
        Commands::Pull(args) => commands::remote::execute_pull(args, &ctx),
        Commands::Info(args) => commands::snapshot::execute_info(args, &ctx),
        Commands::Vacuum(args) => commands::snapshot::execute_vacuum(args, &ctx),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_short_version_flag() {
        let cli = Cli::try_parse_from(["etg", "zip", "-v", "3"]).unwrap();
        match cli.command {
            Commands::Zip(args) => assert_eq!(args.version, Some(3)),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "etg",
            "push",
            "--keep",
            "3",
            "--data-root",
            "/tmp/etg",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.data_root, Some(PathBuf::from("/tmp/etg")));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        match cli.command {
            Commands::Push(args) => {
                assert_eq!(args.keep, Some(3));
                assert_eq!(args.target.version, None);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_update_date_parsing() {
        let cli = Cli::try_parse_from(["etg", "update", "--date", "2024-06-30"]).unwrap();
        match cli.command {
            Commands::Update(args) => {
                assert_eq!(args.date, chrono::NaiveDate::from_ymd_opt(2024, 6, 30));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["etg", "update", "--date", "30/06/2024"]).is_err());
    }
}
