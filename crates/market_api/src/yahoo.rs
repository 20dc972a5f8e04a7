use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::provider::{PeRatios, QuoteProvider, SymbolMatch};

const QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

// Yahoo's endpoints reject requests without a browser user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance client (async HTTP, 5s timeout per call).
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    http: Client,
}

impl YahooFinanceClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    async fn pe_ratios(&self, symbol: &str) -> Result<PeRatios> {
        let body: Value = self
            .http
            .get(QUOTE_URL)
            .query(&[("symbols", symbol)])
            .send()
            .await
            .with_context(|| format!("GET {QUOTE_URL} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {QUOTE_URL} returned non-success status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {QUOTE_URL}"))?;

        let quote = body
            .pointer("/quoteResponse/result/0")
            .ok_or_else(|| anyhow!("No quote data for '{symbol}'"))?;

        Ok(pe_from_quote(quote))
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let body: Value = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("q", query),
                ("quotesCount", "8"),
                ("newsCount", "0"),
                ("listsCount", "0"),
                ("enableFuzzyQuery", "false"),
            ])
            .send()
            .await
            .with_context(|| format!("GET {SEARCH_URL} failed"))?
            .error_for_status()
            .with_context(|| format!("GET {SEARCH_URL} returned non-success status"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {SEARCH_URL}"))?;

        Ok(matches_from_search(&body))
    }
}

pub(crate) fn pe_from_quote(quote: &Value) -> PeRatios {
    PeRatios {
        trailing_pe: quote.get("trailingPE").and_then(Value::as_f64),
        forward_pe: quote.get("forwardPE").and_then(Value::as_f64),
        trailing_eps: quote.get("epsTrailingTwelveMonths").and_then(Value::as_f64),
        forward_eps: quote.get("epsForward").and_then(Value::as_f64),
    }
}

pub(crate) fn matches_from_search(body: &Value) -> Vec<SymbolMatch> {
    let Some(quotes) = body.get("quotes").and_then(Value::as_array) else {
        return Vec::new();
    };

    quotes
        .iter()
        .map(|quote| SymbolMatch {
            symbol: str_field(quote, "symbol"),
            name: {
                let long = str_field(quote, "longname");
                if long.is_empty() {
                    str_field(quote, "shortname")
                } else {
                    long
                }
            },
            exchange: str_field(quote, "exchDisp"),
            kind: str_field(quote, "quoteType"),
        })
        .collect()
}

fn str_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
