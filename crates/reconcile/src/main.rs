use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use reconcile::{find_matching_subsets, ReconcileJob};

/// Brute-force reconciliation of statement amounts against a reported total.
///
/// Reads a JSON job file with `deposits`, `transfers`, `dividends`, `target`
/// and optional `tolerance`, then searches near-full-size subsets for sums
/// within tolerance of the target. No match prints nothing but the
/// completion marker; a human reviews the output.
#[derive(Debug, Parser)]
#[command(name = "reconcile")]
struct Args {
    /// Path to the JSON job file
    job: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let job = ReconcileJob::from_file(&args.job)?;
    let values = job.pool.values();

    println!(
        "🔎 Searching {} values for subsets within {} of {}",
        values.len(),
        job.tolerance,
        job.target
    );

    for m in find_matching_subsets(&values, job.target, job.tolerance) {
        println!("MATCH: {} with {:?}", m.sum, m.values);
    }

    println!("Search done.");
    Ok(())
}
