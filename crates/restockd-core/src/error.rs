use thiserror::Error;

/// Errors raised while building the application configuration from the
/// process environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Errors raised while loading the product catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read product catalog at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse product catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid product catalog: {0}")]
    Validation(String),
}
