use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Reads `.env` (if present) into the process environment, then builds the
/// config from it.
///
/// # Errors
///
/// Returns [`ConfigError`] when a Shopify credential is missing or an
/// optional setting does not parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Builds the config from the current process environment only; `.env` is
/// not consulted.
///
/// # Errors
///
/// Same as [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// `lookup` stands in for `std::env::var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(invalid(var, format!("expected a boolean, got \"{other}\""))),
        }
    };

    let shopify_store = normalize_store_domain(&require("SHOPIFY_STORE")?);
    let shopify_admin_api_token = require("SHOPIFY_ADMIN_API_TOKEN")?;
    let shopify_api_version = or_default("SHOPIFY_API_VERSION", "2024-10");

    let env = parse_environment(&or_default("IMGSHIFT_ENV", "development"))?;
    let log_level = or_default("IMGSHIFT_LOG_LEVEL", "info");
    let work_dir = PathBuf::from(or_default("IMGSHIFT_WORK_DIR", "./work"));
    let output_path = PathBuf::from(or_default("IMGSHIFT_OUTPUT_PATH", "matrixify-import.csv"));

    let request_timeout_secs = parse_u64("IMGSHIFT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("IMGSHIFT_USER_AGENT", "imgshift/0.1 (image-migration)");
    let max_retries = parse_u32("IMGSHIFT_MAX_RETRIES", "5")?;
    let retry_backoff_base_ms = parse_u64("IMGSHIFT_RETRY_BACKOFF_BASE_MS", "1000")?;
    let retry_backoff_factor = parse_u32("IMGSHIFT_RETRY_BACKOFF_FACTOR", "2")?;
    if retry_backoff_factor == 0 {
        return Err(invalid(
            "IMGSHIFT_RETRY_BACKOFF_FACTOR",
            "must be at least 1".to_string(),
        ));
    }
    let inter_request_delay_ms = parse_u64("IMGSHIFT_INTER_REQUEST_DELAY_MS", "1000")?;
    let upload_poll_attempts = parse_u32("IMGSHIFT_UPLOAD_POLL_ATTEMPTS", "10")?;
    let upload_poll_interval_ms = parse_u64("IMGSHIFT_UPLOAD_POLL_INTERVAL_MS", "1000")?;
    let keep_downloads = parse_bool("IMGSHIFT_KEEP_DOWNLOADS", "false")?;

    Ok(AppConfig {
        shopify_store,
        shopify_admin_api_token,
        shopify_api_version,
        env,
        log_level,
        work_dir,
        output_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        retry_backoff_factor,
        inter_request_delay_ms,
        upload_poll_attempts,
        upload_poll_interval_ms,
        keep_downloads,
    })
}

/// Accepts `development`, `test` or `production`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "IMGSHIFT_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

/// Accepts `example.myshopify.com`, `https://example.myshopify.com/` or
/// `https://example.myshopify.com/admin` and returns the bare domain.
fn normalize_store_domain(raw: &str) -> String {
    let without_scheme = raw
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
