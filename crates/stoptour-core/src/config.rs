use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::error::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can use a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be greater than 0".to_string()));
        }
        Ok(value)
    };

    let parse_positive_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !(value.is_finite() && value > 0.0) {
            return Err(invalid(var, "must be a finite number greater than 0".to_string()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("STOPTOUR_ENV", "development"))?;
    let log_level = or_default("STOPTOUR_LOG_LEVEL", "info");
    let database_url = lookup("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());

    let db_max_connections = parse_u32("STOPTOUR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("STOPTOUR_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "STOPTOUR_DB_MIN_CONNECTIONS",
            format!("must not exceed STOPTOUR_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }
    let db_acquire_timeout_secs = parse_u64("STOPTOUR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let default_geofence_radius_m = parse_positive_f64("STOPTOUR_DEFAULT_GEOFENCE_RADIUS_M", "50")?;
    let location_buffer = parse_positive_usize("STOPTOUR_LOCATION_BUFFER", "64")?;

    let media_dir = PathBuf::from(or_default("STOPTOUR_MEDIA_DIR", "./media"));
    let media_base_url = or_default("STOPTOUR_MEDIA_BASE_URL", "http://localhost:3000/media")
        .trim_end_matches('/')
        .to_string();

    Ok(AppConfig {
        env,
        log_level,
        database_url,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        default_geofence_radius_m,
        location_buffer,
        media_dir,
        media_base_url,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOPTOUR_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
