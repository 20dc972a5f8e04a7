use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::provider::{PeRatios, QuoteProvider};

pub type ProviderState = Arc<dyn QuoteProvider>;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PeQuery {
    pub tickers: String,
}

/// GET /pe?tickers=AAPL,MC.PA
///
/// Returns one entry per requested symbol. An upstream failure for a single
/// ticker is logged and swallowed into an all-null entry; the request as a
/// whole still succeeds.
pub async fn get_pe_ratios(
    State(provider): State<ProviderState>,
    Query(query): Query<PeQuery>,
) -> Result<impl IntoResponse> {
    let tickers = parse_tickers(&query.tickers);
    if tickers.is_empty() {
        return Err(ApiError::BadRequest("missing tickers param".to_string()));
    }

    let mut result = Map::new();
    for ticker in tickers {
        let ratios = match provider.pe_ratios(&ticker).await {
            Ok(ratios) => ratios,
            Err(err) => {
                tracing::error!("Error fetching {}: {:#}", ticker, err);
                PeRatios::default()
            }
        };
        let entry = serde_json::to_value(&ratios).map_err(anyhow::Error::from)?;
        result.insert(ticker, entry);
    }

    Ok(Json(Value::Object(result)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub q: String,
}

/// GET /search?q=air+liquide
pub async fn search_symbols(
    State(provider): State<ProviderState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(ApiError::BadRequest("missing q param".to_string()));
    }

    let hits = provider.search(q).await.map_err(|err| {
        tracing::error!("Search error: {:#}", err);
        ApiError::Upstream(err.to_string())
    })?;

    Ok(Json(hits))
}

pub(crate) fn parse_tickers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::SymbolMatch;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::Response;

    struct MockProvider;

    #[async_trait]
    impl QuoteProvider for MockProvider {
        async fn pe_ratios(&self, symbol: &str) -> anyhow::Result<PeRatios> {
            match symbol {
                "AAPL" => Ok(PeRatios {
                    trailing_pe: Some(30.5),
                    forward_pe: Some(28.0),
                    trailing_eps: Some(6.4),
                    forward_eps: Some(7.0),
                }),
                _ => Err(anyhow!("No quote data for '{symbol}'")),
            }
        }

        async fn search(&self, query: &str) -> anyhow::Result<Vec<SymbolMatch>> {
            if query == "boom" {
                return Err(anyhow!("upstream timed out"));
            }
            Ok(vec![SymbolMatch {
                symbol: "AI.PA".to_string(),
                name: "Air Liquide S.A.".to_string(),
                exchange: "Paris".to_string(),
                kind: "EQUITY".to_string(),
            }])
        }
    }

    fn provider() -> ProviderState {
        Arc::new(MockProvider)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn tickers_param_splits_on_commas_and_drops_blanks() {
        assert_eq!(parse_tickers("AAPL, MC.PA ,,TTE.PA"), vec!["AAPL", "MC.PA", "TTE.PA"]);
        assert!(parse_tickers("").is_empty());
        assert!(parse_tickers(" , ").is_empty());
    }

    #[tokio::test]
    async fn per_ticker_failures_are_swallowed_into_null_entries() {
        let query = Query(PeQuery {
            tickers: "AAPL,BADSYMBOL".to_string(),
        });
        let response = get_pe_ratios(State(provider()), query)
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["AAPL"]["trailingPE"], json!(30.5));
        for field in ["trailingPE", "forwardPE", "trailingEps", "forwardEps"] {
            assert!(body["BADSYMBOL"][field].is_null());
        }
    }

    #[tokio::test]
    async fn missing_tickers_param_is_a_bad_request() {
        let query = Query(PeQuery::default());
        let Err(err) = get_pe_ratios(State(provider()), query).await else {
            panic!("expected bad request");
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("missing tickers param"));
    }

    #[tokio::test]
    async fn empty_search_query_is_a_bad_request() {
        let query = Query(SearchQuery { q: "  ".to_string() });
        let Err(err) = search_symbols(State(provider()), query).await else {
            panic!("expected bad request");
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("missing q param"));
    }

    #[tokio::test]
    async fn upstream_search_failure_surfaces_as_500_with_error_body() {
        let query = Query(SearchQuery {
            q: "boom".to_string(),
        });
        let Err(err) = search_symbols(State(provider()), query).await else {
            panic!("expected upstream failure");
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], json!("upstream timed out"));
    }

    #[tokio::test]
    async fn search_returns_symbol_hits() {
        let query = Query(SearchQuery {
            q: "air liquide".to_string(),
        });
        let response = search_symbols(State(provider()), query)
            .await
            .unwrap()
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body[0]["symbol"], json!("AI.PA"));
        assert_eq!(body[0]["type"], json!("EQUITY"));
    }

    #[tokio::test]
    async fn health_check_reports_ok() {
        let response = health_check().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], json!("ok"));
    }
}
