use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_DATABASE_URL: &str = "sqlite://kwtier.db?mode=rwc";
const DEFAULT_WEBHOOK_URL: &str =
    "https://hook.integrator.boost.space/0w7dejdvm21p78a4lf4wdjkfi8dlvk25";
const DEFAULT_SUGGEST_URL: &str = "https://suggestqueries.google.com/complete/search";

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let database_url = or_default("DATABASE_URL", DEFAULT_DATABASE_URL);
    let env = parse_environment(&or_default("KWTIER_ENV", "development"))?;
    let log_level = or_default("KWTIER_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("KWTIER_DB_MAX_CONNECTIONS", "5")?;
    let db_acquire_timeout_secs = parse_u64("KWTIER_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let webhook_url = or_default("KWTIER_WEBHOOK_URL", DEFAULT_WEBHOOK_URL);
    let webhook_timeout_secs = parse_u64("KWTIER_WEBHOOK_TIMEOUT_SECS", "30")?;
    let webhook_max_attempts = parse_u32("KWTIER_WEBHOOK_MAX_ATTEMPTS", "3")?;
    if webhook_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "KWTIER_WEBHOOK_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let webhook_retry_delay_ms = parse_u64("KWTIER_WEBHOOK_RETRY_DELAY_MS", "1000")?;

    let suggest_url = or_default("KWTIER_SUGGEST_URL", DEFAULT_SUGGEST_URL);
    let suggest_timeout_secs = parse_u64("KWTIER_SUGGEST_TIMEOUT_SECS", "10")?;
    let suggest_inter_request_delay_ms =
        parse_u64("KWTIER_SUGGEST_INTER_REQUEST_DELAY_MS", "200")?;
    let suggest_user_agent = or_default("KWTIER_SUGGEST_USER_AGENT", "Mozilla/5.0");

    let records_url = optional("KWTIER_RECORDS_URL");
    let records_api_key = optional("KWTIER_RECORDS_API_KEY");

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_acquire_timeout_secs,
        webhook_url,
        webhook_timeout_secs,
        webhook_max_attempts,
        webhook_retry_delay_ms,
        suggest_url,
        suggest_timeout_secs,
        suggest_inter_request_delay_ms,
        suggest_user_agent,
        records_url,
        records_api_key,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "KWTIER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
