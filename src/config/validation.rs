//! Configuration validation.
//!
//! Produces a flat list of [`ValidationIssue`]s; the loader turns any
//! error-severity issue into a hard failure, warnings are surfaced to
//! the caller.

use crate::config::schema::AppConfig;
use crate::error::{Severity, ValidationIssue};
use crate::timer::phase::{MAX_PHASE_TENTHS, MIN_PHASE_TENTHS};

/// Validates a configuration, returning every issue found.
#[must_use]
pub fn validate(config: &AppConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    validate_timer(config, &mut issues);
    validate_store(config, &mut issues);
    validate_gateway(config, &mut issues);

    issues
}

/// Whether any issue in the list is an error.
#[must_use]
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues
        .iter()
        .any(|issue| issue.severity == Severity::Error)
}

fn error(path: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: message.into(),
        severity: Severity::Error,
    }
}

fn warning(path: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: message.into(),
        severity: Severity::Warning,
    }
}

fn validate_timer(config: &AppConfig, issues: &mut Vec<ValidationIssue>) {
    let seconds = config.timer.default_phase_seconds;
    let min = f64::from(MIN_PHASE_TENTHS) / 10.0;
    let max = f64::from(MAX_PHASE_TENTHS) / 10.0;
    if !seconds.is_finite() || seconds < min || seconds > max {
        issues.push(error(
            "timer.default_phase_seconds",
            format!("must be a number in [{min:.1}, {max:.1}], got {seconds}"),
        ));
    }

    let interval = config.timer.sample_interval_ms;
    if interval == 0 {
        issues.push(error("timer.sample_interval_ms", "must be greater than 0"));
    } else if interval > 1000 {
        issues.push(warning(
            "timer.sample_interval_ms",
            format!("{interval} ms is coarser than the display resolution"),
        ));
    }
}

fn validate_store(config: &AppConfig, issues: &mut Vec<ValidationIssue>) {
    if config.store.dir.as_os_str().is_empty() {
        issues.push(error("store.dir", "must not be empty"));
    }
}

fn validate_gateway(config: &AppConfig, issues: &mut Vec<ValidationIssue>) {
    let gateway = &config.gateway;

    if gateway.bind_addr.parse::<std::net::SocketAddr>().is_err() {
        issues.push(error(
            "gateway.bind_addr",
            format!("'{}' is not a valid socket address", gateway.bind_addr),
        ));
    }

    match reqwest::Url::parse(&gateway.origin_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => issues.push(error(
            "gateway.origin_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(err) => issues.push(error(
            "gateway.origin_url",
            format!("'{}' is not a valid URL: {err}", gateway.origin_url),
        )),
    }

    if gateway.cache_version.trim().is_empty() {
        issues.push(error("gateway.cache_version", "must not be empty"));
    }

    if gateway.precache.is_empty() {
        issues.push(error("gateway.precache", "must list at least one path"));
    }
    for (index, path) in gateway.precache.iter().enumerate() {
        if !path.starts_with('/') {
            issues.push(error(
                &format!("gateway.precache[{index}]"),
                format!("'{path}' must be an absolute path"),
            ));
        }
    }

    if !gateway.root_path.starts_with('/') {
        issues.push(error(
            "gateway.root_path",
            format!("'{}' must be an absolute path", gateway.root_path),
        ));
    } else if !gateway.precache.contains(&gateway.root_path) {
        // Without the shell in the manifest the offline fallback can
        // only work after a live visit has populated it.
        issues.push(warning(
            "gateway.precache",
            format!("root path '{}' is not precached", gateway.root_path),
        ));
    }

    if gateway.fetch_timeout_ms == 0 {
        issues.push(error("gateway.fetch_timeout_ms", "must be greater than 0"));
    }
}

// ============================================================================
// Tests
// ============================================================================
