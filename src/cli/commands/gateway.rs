//! Gateway command handlers.
//!
//! Implements `gateway run` and `gateway validate`.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cache::manager::CacheManager;
use crate::cache::network::HttpOrigin;
use crate::cache::storage::MemoryCache;
use crate::cli::args::{GatewayRunArgs, GatewayValidateArgs, OutputFormat};
use crate::config::loader;
use crate::error::{BreathboxError, ConfigError};
use crate::gateway;

/// Install the precache, activate, and serve until interrupted.
///
/// # Errors
///
/// Returns a configuration error if loading fails, a cache error if the
/// install/activate lifecycle fails, or a gateway error from the serve
/// loop.
pub async fn run(args: &GatewayRunArgs, cancel: CancellationToken) -> Result<(), BreathboxError> {
    let loaded = loader::load_or_default(args.config.as_deref())?;
    for warning in &loaded.warnings {
        warn!(location = %warning.path, "{}", warning.message);
    }
    let config = &loaded.config.gateway;

    let origin_url = reqwest::Url::parse(&config.origin_url).map_err(|err| {
        ConfigError::InvalidValue {
            field: "gateway.origin_url".to_string(),
            value: config.origin_url.clone(),
            expected: format!("a valid URL ({err})"),
        }
    })?;

    let origin = Arc::new(HttpOrigin::new(
        origin_url,
        Duration::from_millis(config.fetch_timeout_ms),
    ));
    let backend = Arc::new(MemoryCache::new());
    let manager = Arc::new(CacheManager::new(
        config.cache_version.clone(),
        config.precache.clone(),
        config.root_path.clone(),
        backend,
        origin,
    ));

    info!(origin = %config.origin_url, version = %config.cache_version, "installing precache");
    manager.install().await.map_err(BreathboxError::Cache)?;
    manager.activate().await.map_err(BreathboxError::Cache)?;

    let bind_addr = args.bind.as_deref().unwrap_or(&config.bind_addr);
    gateway::run(manager, bind_addr, cancel)
        .await
        .map_err(BreathboxError::Gateway)
}

/// Validate configuration files without starting the gateway.
///
/// # Errors
///
/// Returns [`ConfigError::FilesFailed`] when any file fails validation
/// (with `--strict`, warnings count as failures).
pub fn validate(args: &GatewayValidateArgs) -> Result<(), BreathboxError> {
    let mut failed = 0usize;

    for path in &args.files {
        match loader::load_config(path) {
            Ok(result) => {
                let strict_failure = args.strict && !result.warnings.is_empty();
                if strict_failure {
                    failed += 1;
                }
                match args.format {
                    OutputFormat::Human => {
                        for warning in &result.warnings {
                            eprintln!("{}: {warning}", path.display());
                        }
                        if strict_failure {
                            println!("{}: FAIL (strict: {} warnings)", path.display(), result.warnings.len());
                        } else {
                            println!("{}: OK ({} warnings)", path.display(), result.warnings.len());
                        }
                    }
                    OutputFormat::Json => print_json_report(
                        path,
                        !strict_failure,
                        &result
                            .warnings
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>(),
                    ),
                }
            }
            Err(err) => {
                failed += 1;
                match args.format {
                    OutputFormat::Human => {
                        println!("{}: FAIL", path.display());
                        match &err {
                            ConfigError::ValidationError { errors, .. } => {
                                for issue in errors {
                                    eprintln!("{}: {issue}", path.display());
                                }
                            }
                            other => eprintln!("{}: {other}", path.display()),
                        }
                    }
                    OutputFormat::Json => {
                        let issues = match &err {
                            ConfigError::ValidationError { errors, .. } => {
                                errors.iter().map(ToString::to_string).collect()
                            }
                            other => vec![other.to_string()],
                        };
                        print_json_report(path, false, &issues);
                    }
                }
            }
        }
    }

    if failed > 0 {
        return Err(ConfigError::FilesFailed {
            failed,
            total: args.files.len(),
        }
        .into());
    }
    Ok(())
}

fn print_json_report(path: &std::path::Path, ok: bool, issues: &[String]) {
    let report = serde_json::json!({
        "file": path.display().to_string(),
        "ok": ok,
        "issues": issues,
    });
    println!("{report}");
}
