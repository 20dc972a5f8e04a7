use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// A security transferred into the account: its cash value is
/// `quantity * unit_price` at the transfer's cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub quantity: f64,
    pub unit_price: f64,
}

impl TransferRecord {
    pub fn amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// The known cash amounts a reported account total could be composed of.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilePool {
    pub deposits: Vec<f64>,
    pub transfers: Vec<TransferRecord>,
    pub dividends: Vec<f64>,
}

impl ReconcilePool {
    /// Flattens the pool into one value list: deposits, then transfer
    /// amounts, then dividends. Order matters for combination enumeration.
    pub fn values(&self) -> Vec<f64> {
        self.deposits
            .iter()
            .copied()
            .chain(self.transfers.iter().map(TransferRecord::amount))
            .chain(self.dividends.iter().copied())
            .collect()
    }
}

/// One reconciliation run, loadable from a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconcileJob {
    #[serde(flatten)]
    pub pool: ReconcilePool,
    pub target: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl ReconcileJob {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Cannot open {}", path.as_ref().display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid reconcile job {}", path.as_ref().display()))
    }
}

/// A subset whose sum approximates the target.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetMatch {
    pub sum: f64,
    pub values: Vec<f64>,
}

/// Exhaustive combination search over subset sizes `[N-2, N]`.
///
/// The narrow size range is a deliberate shortcut: the target is known to be
/// composed of almost all pool values, and all combinations of a ~25-element
/// pool would be intractable. Sums are compared with an absolute tolerance
/// because the inputs carry currency-rounding noise. No match is not an
/// error; the caller gets an empty list and a human takes it from there.
pub fn find_matching_subsets(values: &[f64], target: f64, tolerance: f64) -> Vec<SubsetMatch> {
    let n = values.len();
    let mut matches = Vec::new();

    for size in n.saturating_sub(2)..=n {
        let mut indices: Vec<usize> = (0..size).collect();
        loop {
            let sum: f64 = indices.iter().map(|&i| values[i]).sum();
            if (sum - target).abs() < tolerance {
                matches.push(SubsetMatch {
                    sum,
                    values: indices.iter().map(|&i| values[i]).collect(),
                });
            }
            if !next_combination(&mut indices, n) {
                break;
            }
        }
    }

    matches
}

/// Advances `indices` to the next combination of `indices.len()` out of `n`,
/// in lexicographic order. Returns false once exhausted.
fn next_combination(indices: &mut [usize], n: usize) -> bool {
    let size = indices.len();
    let mut i = size;
    while i > 0 {
        i -= 1;
        if indices[i] != i + n - size {
            indices[i] += 1;
            for j in i + 1..size {
                indices[j] = indices[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
