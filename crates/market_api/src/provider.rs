use async_trait::async_trait;
use serde::Serialize;

/// Valuation ratios for one symbol. Every field is nullable: the upstream
/// provider omits ratios it cannot compute (loss-making companies, ETFs).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeRatios {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<f64>,
    #[serde(rename = "trailingEps")]
    pub trailing_eps: Option<f64>,
    #[serde(rename = "forwardEps")]
    pub forward_eps: Option<f64>,
}

/// One hit from the upstream symbol-search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Upstream market-data access, one call per symbol or query.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn pe_ratios(&self, symbol: &str) -> anyhow::Result<PeRatios>;
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SymbolMatch>>;
}
