//! # Structured Logging Module
//!
//! Environment-aware structured logging for workflow transitions and
//! notification dispatch. Installs a single global subscriber; later calls
//! are no-ops.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with the level derived from the environment
pub fn init_structured_logging() {
    let environment = get_environment();
    init_with(&LoggingConfig {
        level: get_log_level(&environment),
        json: false,
    });
}

/// Initialize structured logging from loaded configuration
pub fn init_with(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        // RUST_LOG wins over the configured level
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

        let layer = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // Use try_init so an already installed subscriber (tests, host apps) is kept
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            json = config.json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    std::env::var("PUBLISHER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "test" | "development" => "debug".to_string(),
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for workflow transitions
pub fn log_transition_operation(
    workflow: &str,
    record_id: i64,
    from_state: &str,
    to_state: &str,
    event: &str,
    user_id: Option<i64>,
    details: Option<&str>,
) {
    tracing::info!(
        workflow = %workflow,
        record_id = record_id,
        from_state = %from_state,
        to_state = %to_state,
        event = %event,
        user_id = user_id,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "🔀 TRANSITION_OPERATION"
    );
}

/// Log structured data for notification dispatch
pub fn log_notification_operation(
    kind: &str,
    notifier: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        kind = %kind,
        notifier = %notifier,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📨 NOTIFICATION_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
