use anyhow::{bail, Context, Result};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("valid table selector"));
static TR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid tr selector"));
static HEADER_CELL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid header cell selector"));
static TD_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid td selector"));

/// Table categories found in a brokerage statement export.
///
/// Categories are not mutually exclusive: a table may match several, or none.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TableCategory {
    CashMovement,
    Transaction,
    Forex,
}

impl TableCategory {
    pub const ALL: [TableCategory; 3] = [
        TableCategory::CashMovement,
        TableCategory::Transaction,
        TableCategory::Forex,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TableCategory::CashMovement => "CASH",
            TableCategory::Transaction => "TRANSACTION",
            TableCategory::Forex => "FOREX",
        }
    }
}

/// Trigger phrases used to classify statement tables.
///
/// Defaults match the French IBKR activity statement the tool was written
/// against. Other locales or brokers load a JSON file instead of editing code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Full-text triggers for cash-movement tables (deposits/withdrawals).
    pub cash_keywords: Vec<String>,
    /// Header cells that must all be present in a cash-movement table.
    pub cash_headers: Vec<String>,
    /// Full-text anchor for transaction tables.
    pub symbol_anchor: String,
    /// At least one of these must appear alongside the anchor.
    pub trade_keywords: Vec<String>,
    /// Fallback: headers that together also mark a transaction table.
    pub fallback_headers: Vec<String>,
    /// Full-text triggers for currency-conversion tables.
    pub forex_keywords: Vec<String>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            cash_keywords: vec![
                "Transfert électronique".to_string(),
                "Déboursement".to_string(),
            ],
            cash_headers: vec![
                "Date".to_string(),
                "Description".to_string(),
                "Montant".to_string(),
            ],
            symbol_anchor: "Symbole".to_string(),
            trade_keywords: vec![
                "Achat".to_string(),
                "Vente".to_string(),
                "Dépôts".to_string(),
                "Date".to_string(),
            ],
            fallback_headers: vec!["Date".to_string(), "Montant".to_string()],
            forex_keywords: vec![
                "Forex".to_string(),
                "EUR.USD".to_string(),
                "Conversion".to_string(),
                "Change".to_string(),
            ],
        }
    }
}

impl LocatorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Cannot open {}", path.as_ref().display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid locator config {}", path.as_ref().display()))
    }

    fn matches(&self, category: TableCategory, text: &str, headers: &[String]) -> bool {
        match category {
            TableCategory::CashMovement => {
                self.cash_keywords.iter().any(|k| text.contains(k.as_str()))
                    && self
                        .cash_headers
                        .iter()
                        .all(|h| headers.iter().any(|c| c == h))
            }
            TableCategory::Transaction => {
                let by_text = text.contains(self.symbol_anchor.as_str())
                    && self.trade_keywords.iter().any(|k| text.contains(k.as_str()));
                let by_headers = self
                    .fallback_headers
                    .iter()
                    .all(|h| headers.iter().any(|c| c == h));
                by_text || by_headers
            }
            TableCategory::Forex => {
                self.forex_keywords.iter().any(|k| text.contains(k.as_str()))
            }
        }
    }
}

/// A statement table that matched a category, with its cells extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTable {
    pub category: TableCategory,
    /// First row's cell texts (`th` or `td`).
    pub headers: Vec<String>,
    /// Remaining rows' `td` texts, whitespace-trimmed. Malformed rows may
    /// carry fewer cells than the header row; they are kept as-is.
    pub rows: Vec<Vec<String>>,
}

/// Header row plus first data row of a table, for the structure dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub index: usize,
    pub headers: Vec<String>,
    pub first_row: Option<Vec<String>>,
}

/// A brokerage statement export, parsed once and read-only from then on.
pub struct StatementDocument {
    doc: Html,
}

impl StatementDocument {
    /// Reads and decodes a statement file. Any I/O or decode failure is
    /// fatal for the run; there is no partial recovery.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .with_context(|| format!("Cannot open {}", path.as_ref().display()))?;
        let html = decode_statement(&bytes)
            .with_context(|| format!("Cannot decode {}", path.as_ref().display()))?;
        Ok(Self::parse(&html))
    }

    pub fn parse(html: &str) -> Self {
        Self {
            doc: Html::parse_document(html),
        }
    }

    /// Yields every table matching `category`, in document order.
    ///
    /// Zero-row tables are skipped (no header to match against). Nothing is
    /// an error here: a statement without matching tables yields nothing.
    pub fn tables_in<'a>(
        &'a self,
        category: TableCategory,
        config: &'a LocatorConfig,
    ) -> impl Iterator<Item = ExtractedTable> + 'a {
        self.doc.select(&TABLE_SELECTOR).filter_map(move |table| {
            let rows: Vec<ElementRef> = table.select(&TR_SELECTOR).collect();
            let first = rows.first()?;
            let headers = cell_texts(*first, &HEADER_CELL_SELECTOR);
            let text: String = table.text().collect();

            if !config.matches(category, &text, &headers) {
                return None;
            }

            let body = rows[1..]
                .iter()
                .map(|r| cell_texts(*r, &TD_SELECTOR))
                .collect();

            Some(ExtractedTable {
                category,
                headers,
                rows: body,
            })
        })
    }

    /// Runs every category in turn. A table matching several categories is
    /// yielded once per match; this is an extraction aid, not a partition.
    pub fn classified_tables<'a>(
        &'a self,
        config: &'a LocatorConfig,
    ) -> impl Iterator<Item = ExtractedTable> + 'a {
        TableCategory::ALL
            .into_iter()
            .flat_map(move |category| self.tables_in(category, config))
    }

    /// Header and first data row of every table, classification aside.
    /// Used to eyeball the structure of an unfamiliar export.
    pub fn summaries(&self) -> Vec<TableSummary> {
        self.doc
            .select(&TABLE_SELECTOR)
            .enumerate()
            .filter_map(|(index, table)| {
                let rows: Vec<ElementRef> = table.select(&TR_SELECTOR).collect();
                let first = rows.first()?;
                Some(TableSummary {
                    index,
                    headers: cell_texts(*first, &HEADER_CELL_SELECTOR),
                    first_row: rows.get(1).map(|r| cell_texts(*r, &HEADER_CELL_SELECTOR)),
                })
            })
            .collect()
    }
}

fn cell_texts(row: ElementRef, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Decodes statement bytes. Exports carry a UTF-8 BOM; strip it and decode
/// strictly so a corrupt file aborts the run instead of yielding garbage.
fn decode_statement(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    let (decoded, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        bail!("Statement is not valid UTF-8");
    }
    Ok(decoded.into_owned())
}
