use market_api::{run_server, YahooFinanceClient};
use std::env;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment overrides with sane defaults
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "5001".to_string())
        .parse()
        .unwrap_or(5001);

    println!("Valuation-ratio proxy");
    println!("=====================");
    println!("Listening on: {}:{}", host, port);
    println!("Example: http://{}:{}/pe?tickers=AAPL,MC.PA", host, port);
    println!();

    let provider = Arc::new(YahooFinanceClient::new()?);

    run_server(provider, &host, port).await?;

    Ok(())
}
