//! Credential resolution
//!
//! An explicit `api_key` from the config file wins; otherwise the
//! environment variable named by `api_key_env` is read. Blank values count
//! as missing.

use mana_application::ServiceError;

/// Resolve a credential or setting from config, then environment.
pub fn resolve(explicit: Option<&str>, env_var: &str) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(env_var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Resolve an API key, reporting `"<Service> API key not configured"` when
/// absent.
pub fn require_api_key(
    explicit: Option<&str>,
    env_var: &str,
    service_label: &str,
) -> Result<String, ServiceError> {
    resolve(explicit, env_var)
        .ok_or_else(|| ServiceError::Config(format!("{} API key not configured", service_label)))
}
