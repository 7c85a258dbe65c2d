//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks the authorization server block (endpoint, client, resource, timeout)
//! - Checks server / metrics routes, refresh window and logging level

use reqwest::Url;
use tracing::{error, info};

use crate::config::settings::{AuthorityConfig, ServiceConfig, SettingsConfig};
use crate::observability::metrics::get_metrics;

const ONE_YEAR_SECONDS: i64 = 60 * 60 * 24 * 365;

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_authority(&cfg.authority, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        for e in &errors {
            error!("config validation: {}", e);
            metrics.config_validation_errors.inc();
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    let window = settings.refresh_window_seconds;
    if window < 0 {
        errors.push(format!(
            "settings.refresh_window_seconds ({}) must not be negative",
            window
        ));
    } else if window > ONE_YEAR_SECONDS {
        errors.push(format!(
            "settings.refresh_window_seconds ({}) is unreasonably large",
            window
        ));
    }

    let server = &settings.server;
    if server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' must be an integer in range 0-65535",
            server.port
        ));
    }
    if !server.path.starts_with('/') {
        errors.push(format!(
            "settings.server.path '{}' must start with '/'",
            server.path
        ));
    }

    let metrics = &settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!(
            "settings.metrics.path '{}' must start with '/'",
            metrics.path
        ));
    }
    if metrics.is_enabled && metrics.path == server.path {
        errors.push(format!(
            "settings.metrics.path '{}' collides with settings.server.path",
            metrics.path
        ));
    }

    if let Some(logging) = &settings.logging {
        let valid = ["trace", "debug", "info", "warn", "error"];
        if !valid.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, valid
            ));
        }
    }
}

fn validate_authority(authority: &AuthorityConfig, errors: &mut Vec<String>) {
    match Url::parse(&authority.token_endpoint) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "authority.token_endpoint scheme '{}' unsupported; expected http or https",
            url.scheme()
        )),
        Err(e) => errors.push(format!(
            "authority.token_endpoint '{}' is not a valid URL: {}",
            authority.token_endpoint, e
        )),
    }

    if authority.client_id.trim().is_empty() {
        errors.push("authority.client_id must not be empty".to_string());
    }
    if authority.resource.trim().is_empty() {
        errors.push("authority.resource must not be empty".to_string());
    }
    if authority.timeout_ms == 0 {
        errors.push("authority.timeout_ms must be greater than 0".to_string());
    }
}
