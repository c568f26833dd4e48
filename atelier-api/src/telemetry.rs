//! Logging setup.
//!
//! Structured logging via tracing-subscriber. Output is compact
//! human-readable text by default; set `ATELIER_LOG_FORMAT=json` for one
//! JSON object per line in production. `RUST_LOG` overrides the filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ApiError, ApiResult};

/// Filter applied when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "atelier_api=debug,atelier_interpreter=debug,tower_http=debug,info";

/// Initialize the tracing subscriber.
///
/// Call once at startup before any tracing occurs. Fails if a global
/// subscriber is already installed.
pub fn init_telemetry() -> ApiResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_logs = std::env::var("ATELIER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    let init_result = if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    init_result
        .map_err(|e| ApiError::internal_error(format!("subscriber already installed: {}", e)))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        json_logs,
        "telemetry ready"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::new(DEFAULT_FILTER);
        assert!(!filter.to_string().is_empty());
    }
}
