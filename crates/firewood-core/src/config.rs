use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinates;
use crate::ConfigError;

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

/// Build application configuration using the provided env-var lookup function,
/// so tests can drive it from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_value::<u32>(var, &or_default(var, default))
    };

    let supabase_url = require("FIREWOOD_SUPABASE_URL")?
        .trim_end_matches('/')
        .to_string();
    let supabase_anon_key = require("FIREWOOD_SUPABASE_ANON_KEY")?;

    let env = parse_environment(&or_default("FIREWOOD_ENV", "development"))?;
    let log_level = or_default("FIREWOOD_LOG_LEVEL", "info");
    let table_name = or_default("FIREWOOD_TABLE_NAME", "firewood_locations");

    let report_threshold = parse_value::<i64>(
        "FIREWOOD_REPORT_THRESHOLD",
        &or_default("FIREWOOD_REPORT_THRESHOLD", "20"),
    )?;
    if report_threshold < 1 {
        return Err(ConfigError::InvalidEnvVar {
            var: "FIREWOOD_REPORT_THRESHOLD".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let nominatim_url = or_default(
        "FIREWOOD_NOMINATIM_URL",
        "https://nominatim.openstreetmap.org",
    )
    .trim_end_matches('/')
    .to_string();
    let nominatim_country_codes = or_default("FIREWOOD_NOMINATIM_COUNTRY_CODES", "jp");
    let nominatim_limit = parse_u32("FIREWOOD_NOMINATIM_LIMIT", "5")?;
    let user_agent = or_default("FIREWOOD_USER_AGENT", "FirewoodMapApp/1.0");

    let request_timeout_secs = parse("FIREWOOD_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_u32("FIREWOOD_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse("FIREWOOD_RETRY_BACKOFF_BASE_MS", "500")?;

    let default_center = parse_center(&or_default("FIREWOOD_DEFAULT_CENTER", "36.5,138.0"))?;
    let default_zoom =
        parse_value::<u8>("FIREWOOD_DEFAULT_ZOOM", &or_default("FIREWOOD_DEFAULT_ZOOM", "6"))?;

    Ok(AppConfig {
        env,
        log_level,
        supabase_url,
        supabase_anon_key,
        table_name,
        report_threshold,
        nominatim_url,
        nominatim_country_codes,
        nominatim_limit,
        user_agent,
        request_timeout_secs,
        max_retries,
        retry_backoff_base_ms,
        default_center,
        default_zoom,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FIREWOOD_ENV".to_string(),
            reason: format!("expected development, test or production, got {other:?}"),
        }),
    }
}

/// Parse `"lat,lng"` into coordinates.
fn parse_center(raw: &str) -> Result<Coordinates, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar {
        var: "FIREWOOD_DEFAULT_CENTER".to_string(),
        reason: reason.to_string(),
    };

    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid("expected \"latitude,longitude\""))?;
    let lat = lat
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(&e.to_string()))?;
    let lng = lng
        .trim()
        .parse::<f64>()
        .map_err(|e| invalid(&e.to_string()))?;
    Coordinates::new(lat, lng).ok_or_else(|| invalid("coordinates out of range"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
