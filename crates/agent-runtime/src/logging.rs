//! Logging setup.
//!
//! `RUST_LOG` wins over the configured level. JSON output is meant for
//! container log collectors; the plain formatter is for terminals.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AgentError;

/// Install the global subscriber.
pub fn init(log_level: &str, json_logs: bool) -> Result<(), AgentError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| AgentError::Logging(e.to_string()))?;

    if json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| AgentError::Logging(e.to_string()))
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| AgentError::Logging(e.to_string()))
    }
}
