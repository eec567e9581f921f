//! A CLI for intern salary calculation.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use patver_common::salary::{SalaryCalculator, parse_piece_items};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Intern name, echoed in the breakdown
    name: String,

    /// Pay level (A/B/C)
    level: String,

    /// Hours worked
    hours: f64,

    /// Itemized piecework, `quantity,price` pairs separated by `;`
    #[arg(short, long, default_value = "")]
    pieces: String,
}

fn run(cli: &Cli) -> Result<()> {
    let calc = SalaryCalculator::default();
    let items = parse_piece_items(&cli.pieces)?;

    let hourly_wage = calc.hourly_wage(&cli.level, cli.hours)?;
    let piecework_wage = calc.piecework_wage(&items)?;
    let total = hourly_wage + piecework_wage;

    println!("===== Salary breakdown for {} =====", cli.name);
    println!("Level: {}", cli.level);
    println!("Hourly rate: {}", calc.hourly_rate(&cli.level)?);
    println!("Hours: {}", cli.hours);
    println!("Hourly wage: {hourly_wage}");
    if !items.is_empty() {
        println!("Piecework:");
        for (i, item) in items.iter().enumerate() {
            println!(
                "  task {}: {} x {} = {}",
                i + 1,
                item.quantity,
                item.price,
                item.subtotal()
            );
        }
    }
    println!("Piecework wage: {piecework_wage}");
    println!("Total salary: {total}");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
