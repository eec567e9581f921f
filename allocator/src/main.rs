//! A CLI for assigning and validating patent review batches.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use patver_common::manager::TaskManager;
use patver_common::{DEFAULT_GROUP, TeamRoster};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the task store (created on first use)
    #[arg(long, env = "PATVER_DB")]
    db_path: Option<String>,

    /// Directory receiving the per-batch CSV exports
    #[arg(long, default_value = "exports", env = "PATVER_EXPORT_DIR")]
    export_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assign a batch of unassigned records to a team by fixed role ratios
    Assign {
        /// How many records to hand out
        daily_goal: usize,

        /// Team group receiving the batch
        #[arg(long, default_value = DEFAULT_GROUP)]
        group: String,
    },
    /// Mark export batches as completed by their reviewers
    Complete {
        /// File identifiers of the finished batches
        #[arg(required = true)]
        file_ids: Vec<String>,
    },
    /// Route submitted batches into the leader/deputy review queues
    Validate {
        /// Folder holding one subfolder per submitted batch
        folder: PathBuf,

        /// Where the review queue CSVs land
        #[arg(long, default_value = "review")]
        output_dir: PathBuf,

        /// Team group whose leadership does the reviewing
        #[arg(long, default_value = DEFAULT_GROUP)]
        group: String,
    },
    /// Print the team roster
    TeamList,
    /// Merge the reviewed queues back into the record table
    MergeReview {
        /// The leader's reviewed queue
        #[arg(long)]
        leader_csv: PathBuf,

        /// The deputy's reviewed queue
        #[arg(long)]
        deputy_csv: PathBuf,
    },
    /// Load candidate records from a CSV as unassigned work
    Ingest {
        /// CSV of candidate rows (header row required)
        csv_path: PathBuf,
    },
}

fn run(cli: Cli) -> Result<()> {
    let mut manager = TaskManager::open(
        cli.db_path.as_deref(),
        &TeamRoster::default_teams(),
        &cli.export_dir,
    )?;

    match cli.command {
        Command::Assign { daily_goal, group } => {
            let outcome = manager.assign_tasks(daily_goal, &group)?;
            if outcome.assigned == 0 {
                println!("No unassigned records available.");
                return Ok(());
            }
            if outcome.assigned < outcome.requested {
                println!(
                    "Short batch: requested {}, assigned {}.",
                    outcome.requested, outcome.assigned
                );
            }
            println!(
                "Assigned {} records to {} across {} batches:",
                outcome.assigned,
                group,
                outcome.batches.len()
            );
            for file_id in outcome.batches {
                println!("  {file_id}");
            }
        }
        Command::Complete { file_ids } => {
            let affected = manager.mark_tasks_completed(&file_ids)?;
            println!("Completed {affected} records across {} batches.", file_ids.len());
        }
        Command::Validate {
            folder,
            output_dir,
            group,
        } => {
            let pooled = manager.validate_records(&folder, &output_dir, &group)?;
            println!(
                "Review queues exported to {} ({pooled} pooled member rows).",
                output_dir.display()
            );
        }
        Command::TeamList => {
            let roster = manager.team_config()?;
            for name in roster.group_names() {
                let group = roster.group(&name).unwrap_or_default();
                println!("Team [{name}]");
                println!("  members: {}", group.members.join(", "));
                println!("  deputy:  {}", group.deputy.join(", "));
                println!("  leader:  {}", group.leader.join(", "));
            }
        }
        Command::MergeReview {
            leader_csv,
            deputy_csv,
        } => {
            let applied = manager.merge_review(&leader_csv, &deputy_csv)?;
            println!("Merged {applied} reviewed records.");
        }
        Command::Ingest { csv_path } => {
            let inserted = manager.ingest_records(&csv_path)?;
            println!("Ingested {inserted} records.");
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
