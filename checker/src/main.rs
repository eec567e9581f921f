//! A CLI for splitting reviewer shards and checking their agreement.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use patver_common::DEFAULT_CHECK_GAP;
use patver_common::agreement::{self, AuthorityTable};
use patver_common::shard_split;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check reviewer shards against the authority table and each other
    Check {
        /// Shard CSVs, in ring order
        #[arg(required = true)]
        shards: Vec<PathBuf>,

        /// Overlap fraction sampled from the next shard
        #[arg(long, default_value_t = DEFAULT_CHECK_GAP)]
        gap: f64,

        /// Authoritative patent table (JSON array)
        #[arg(long, default_value = "data/authorizations.json", env = "PATVER_AUTH_TABLE")]
        auth_table: PathBuf,
    },
    /// Split a CSV into overlapping reviewer shards
    Split {
        /// CSV to split (header row required)
        input: PathBuf,

        /// Number of shards
        n: usize,

        /// Overlap fraction copied from the next shard
        #[arg(long, default_value_t = DEFAULT_CHECK_GAP)]
        gap: f64,
    },
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Check {
            shards,
            gap,
            auth_table,
        } => {
            let authority = AuthorityTable::load(&auth_table)?;
            let summary = agreement::check_shards(&shards, gap, &authority)?;

            for report in &summary.reports {
                println!(
                    "{}: {} rows, existence {:.2}%, consistency {:.2}%",
                    report.path.display(),
                    report.rows,
                    report.existence_rate * 100.0,
                    report.consistency_rate * 100.0
                );
            }
            println!(
                "Average existence rate:   {:.2}%",
                summary.avg_existence_rate * 100.0
            );
            println!(
                "Average consistency rate: {:.2}%",
                summary.avg_consistency_rate * 100.0
            );
        }
        Command::Split { input, n, gap } => {
            let output_dir = shard_split::split_csv(&input, n, gap)?;
            println!("Wrote {n} shards to {}", output_dir.display());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
