use crate::app_config::AppConfig;
use crate::ConfigError;

/// Default request timeout for the stock-lookup client, in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Default `User-Agent` sent by the stock-lookup client.
pub const DEFAULT_LOOKUP_USER_AGENT: &str = "restockd/0.1 (stock-monitor)";

/// Default delay between monitoring cycles, in seconds.
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 1800;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files, so the
/// caller stays in charge of env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup instead of `set_var`/`remove_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let require_u64 = |var: &str| -> Result<u64, ConfigError> {
        let raw = require(var)?;
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(default),
        }
    };

    let bot_token = require("RESTOCKD_BOT_TOKEN")?;
    let channel_id = require_u64("RESTOCKD_CHANNEL_ID")?;
    let operator_id = require_u64("RESTOCKD_OPERATOR_ID")?;

    let check_interval_secs =
        parse_u64("RESTOCKD_CHECK_INTERVAL_SECS", DEFAULT_CHECK_INTERVAL_SECS)?;
    let products_path = PathBuf::from(or_default(
        "RESTOCKD_PRODUCTS_PATH",
        "./config/products.json",
    ));
    let log_level = or_default("RESTOCKD_LOG_LEVEL", "info");

    let lookup_timeout_secs =
        parse_u64("RESTOCKD_LOOKUP_TIMEOUT_SECS", DEFAULT_LOOKUP_TIMEOUT_SECS)?;
    let lookup_user_agent = or_default("RESTOCKD_LOOKUP_USER_AGENT", DEFAULT_LOOKUP_USER_AGENT);
    let max_concurrent_checks = parse_usize("RESTOCKD_MAX_CONCURRENT_CHECKS", 1)?;

    Ok(AppConfig {
        bot_token,
        channel_id,
        operator_id,
        check_interval_secs,
        products_path,
        log_level,
        lookup_timeout_secs,
        lookup_user_agent,
        max_concurrent_checks,
    })
}
