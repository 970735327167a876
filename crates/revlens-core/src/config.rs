use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub const DEFAULT_REVIEW_SELECTOR: &str = r#"[data-hook="review-body"] span"#;

pub const DEFAULT_FETCH_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";

pub const DEFAULT_MODEL_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
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
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let gemini_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("REVLENS_ENV", "development"))?;

    // Hosting platforms hand out a bare port; an explicit bind address wins.
    let default_bind = lookup("PORT").map_or_else(|_| "0.0.0.0:5000".to_string(), |p| {
        format!("0.0.0.0:{}", p.trim())
    });
    let raw_bind = or_default("REVLENS_BIND_ADDR", &default_bind);
    let bind_addr = raw_bind
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "REVLENS_BIND_ADDR".to_string(),
            reason: format!("\"{raw_bind}\": {e}"),
        })?;

    let log_level = or_default("REVLENS_LOG_LEVEL", "info");

    let model = or_default("REVLENS_MODEL", DEFAULT_MODEL);
    let model_base_url = or_default("REVLENS_MODEL_BASE_URL", DEFAULT_MODEL_BASE_URL);
    let model_timeout_secs = nonzero(
        "REVLENS_MODEL_TIMEOUT_SECS",
        parse_u64("REVLENS_MODEL_TIMEOUT_SECS", "60")?,
    )?;

    let review_selector = or_default("REVLENS_REVIEW_SELECTOR", DEFAULT_REVIEW_SELECTOR);
    if review_selector.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_REVIEW_SELECTOR".to_string(),
            reason: "selector must not be empty".to_string(),
        });
    }

    let max_batch_size = nonzero(
        "REVLENS_MAX_BATCH_SIZE",
        parse_usize("REVLENS_MAX_BATCH_SIZE", "50")?,
    )?;

    let fetch_timeout_secs = nonzero(
        "REVLENS_FETCH_TIMEOUT_SECS",
        parse_u64("REVLENS_FETCH_TIMEOUT_SECS", "30")?,
    )?;
    let fetch_max_redirects = parse_usize("REVLENS_FETCH_MAX_REDIRECTS", "5")?;
    let fetch_user_agent = or_default("REVLENS_FETCH_USER_AGENT", DEFAULT_FETCH_USER_AGENT);

    let analyze_timeout_secs = nonzero(
        "REVLENS_ANALYZE_TIMEOUT_SECS",
        parse_u64("REVLENS_ANALYZE_TIMEOUT_SECS", "120")?,
    )?;
    let rate_limit_per_minute = nonzero(
        "REVLENS_RATE_LIMIT_PER_MINUTE",
        parse_usize("REVLENS_RATE_LIMIT_PER_MINUTE", "30")?,
    )?;

    let static_dir = lookup("REVLENS_STATIC_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        gemini_api_key,
        model,
        model_base_url,
        model_timeout_secs,
        review_selector,
        max_batch_size,
        fetch_timeout_secs,
        fetch_max_redirects,
        fetch_user_agent,
        analyze_timeout_secs,
        rate_limit_per_minute,
        static_dir,
    })
}

/// Rejects a zero count or duration.
fn nonzero<T: Default + PartialEq>(var: &str, value: T) -> Result<T, ConfigError> {
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "REVLENS_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
