pub mod app_config;
pub mod catalog;
pub mod config;
pub mod error;
pub mod status;

pub use app_config::AppConfig;
pub use catalog::{
    load_catalog, load_products, parse_products, AddOutcome, Catalog, InvalidPriority, Priority,
    ProductSpec, RemoveOutcome,
};
pub use config::{
    load_app_config, load_app_config_from_env, DEFAULT_LOOKUP_TIMEOUT_SECS,
    DEFAULT_LOOKUP_USER_AGENT,
};
pub use error::{CatalogError, ConfigError};
pub use status::{AvailabilityRecord, StatusStore, StoreAvailability, UNCAPPED_QUANTITY};
