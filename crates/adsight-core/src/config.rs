use crate::app_config::{AppConfig, DatasetConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if any env var holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("ADSIGHT_ENV", "development"));
    let bind_addr = parse_addr("ADSIGHT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ADSIGHT_LOG_LEVEL", "info");
    let programs_path = lookup("ADSIGHT_PROGRAMS_PATH").ok().map(PathBuf::from);

    let gemini_api_key = lookup("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
    let gemini_model = or_default("ADSIGHT_GEMINI_MODEL", "gemini-3-flash-preview");
    let gemini_timeout_secs = parse_u64("ADSIGHT_GEMINI_TIMEOUT_SECS", "30")?;

    let dataset = DatasetConfig {
        accounts: parse_usize("ADSIGHT_DATASET_ACCOUNTS", "5")?,
        campaigns_per_account: parse_usize("ADSIGHT_DATASET_CAMPAIGNS_PER_ACCOUNT", "8")?,
        days_history: parse_i64("ADSIGHT_DATASET_DAYS", "90")?,
        seed: match lookup("ADSIGHT_DATASET_SEED") {
            Ok(raw) => Some(raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: "ADSIGHT_DATASET_SEED".to_string(),
                reason: e.to_string(),
            })?),
            Err(_) => None,
        },
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        programs_path,
        gemini_api_key,
        gemini_model,
        gemini_timeout_secs,
        dataset,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
