pub mod error;
pub mod handlers;
pub mod provider;
pub mod router;
pub mod server;
pub mod yahoo;

pub use error::{ApiError, Result};
pub use provider::{PeRatios, QuoteProvider, SymbolMatch};
pub use router::create_router;
pub use server::run_server;
pub use yahoo::YahooFinanceClient;
