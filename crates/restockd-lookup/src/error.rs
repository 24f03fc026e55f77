use thiserror::Error;

/// Failure modes of one stock lookup.
///
/// Every variant is non-fatal to the monitoring loop: a failed lookup
/// skips that product for the cycle and leaves its last known status
/// untouched.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The request exceeded the configured timeout.
    #[error("stock lookup for sku {sku} timed out")]
    Timeout { sku: String },

    /// Transport-level failure other than a timeout.
    #[error("stock lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider has no record of the sku (HTTP 404).
    #[error("no stock data found for sku {sku}")]
    NotFound { sku: String },

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// Failure modes of turning a raw provider payload into an
/// availability record.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The payload carried no `items` array, or an empty one. The
    /// provider returns this when it has no data yet for the sku, so
    /// callers treat it as "no data", not a crash.
    #[error("stock response for sku {sku} contained no items")]
    EmptyResponse { sku: String },

    /// The first item lacked a usable `locations` array.
    #[error("stock response for sku {sku} has no readable locations")]
    MalformedLocation { sku: String },

    #[error("unexpected {context}: {reason}")]
    Unexpected { context: String, reason: String },
}
