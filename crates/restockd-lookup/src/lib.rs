pub mod client;
pub mod error;
pub mod normalize;

pub use client::{StockClient, DEFAULT_BASE_URL};
pub use error::{LookupError, NormalizeError};
pub use normalize::{lookup_page_url, normalize_stock_response};
