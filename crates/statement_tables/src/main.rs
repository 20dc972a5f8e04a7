use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use statement_tables::{LocatorConfig, StatementDocument, TableCategory};

/// Locate and dump candidate tables from a brokerage HTML statement.
///
/// Output is a human-readable diagnostic dump, one debug-formatted row per
/// line. Not finding any table is not an error; a human reviews the output.
#[derive(Debug, Parser)]
#[command(name = "statement_tables")]
struct Args {
    /// Path to the statement export (.htm/.html)
    statement: PathBuf,

    /// JSON file overriding the default (French IBKR) trigger phrases
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only dump tables of this category
    #[arg(long, value_enum)]
    category: Option<TableCategory>,

    /// Dump header and first data row of every table instead of classifying
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => LocatorConfig::from_file(path)?,
        None => LocatorConfig::default(),
    };

    println!("📖 Scanning statement: {}", args.statement.display());
    let doc = StatementDocument::from_file(&args.statement)?;

    if args.summary {
        for summary in doc.summaries() {
            println!("Table {}: {:?}", summary.index, summary.headers);
            if let Some(row) = &summary.first_row {
                println!("  Row 1: {:?}", row);
            }
        }
        return Ok(());
    }

    let categories: Vec<TableCategory> = match args.category {
        Some(category) => vec![category],
        None => TableCategory::ALL.to_vec(),
    };

    let mut found = 0usize;
    for category in categories {
        for table in doc.tables_in(category, &config) {
            println!("\n--- CANDIDATE {} TABLE ---", table.category.label());
            println!("{:?}", table.headers);
            for row in &table.rows {
                println!("{:?}", row);
            }
            found += 1;
        }
    }

    if found == 0 {
        println!("No matching tables.");
    }

    Ok(())
}
