//! # Publisher Configuration
//!
//! Layered configuration for the publishing workflow. Sources are merged in
//! order, later sources winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. `PUBLISHER__*` environment variables (`PUBLISHER__NOTIFICATIONS__ENABLED=false`)
//!
//! The merged result is validated before it is handed out.
//!
//! ```rust,no_run
//! use course_publisher::config::PublisherConfig;
//!
//! let config = PublisherConfig::load(None)?;
//! assert!(config.notifications.from_email.contains('@'));
//! # Ok::<(), course_publisher::config::ConfigurationError>(())
//! ```

use crate::constants::DEFAULT_FROM_EMAIL;
use crate::logging;
use crate::models::PublisherUserRole;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "PUBLISHER";
const ENV_SEPARATOR: &str = "__";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Missing required configuration field '{field}' in {context}")]
    MissingRequiredField { field: String, context: String },

    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },
}

impl ConfigurationError {
    pub fn missing_required_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigurationError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    pub environment: String,
    pub notifications: NotificationsConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// When false, transitions still commit but nothing is dispatched
    pub enabled: bool,
    pub from_email: String,
    /// Host used to build links in email bodies
    pub site_domain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Roles that may approve or reject regardless of who owns the review
    pub override_roles: Vec<PublisherUserRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        let environment = logging::get_environment();
        let level = logging::get_log_level(&environment);
        Self {
            environment,
            notifications: NotificationsConfig::default(),
            workflow: WorkflowConfig::default(),
            logging: LoggingConfig { level, json: false },
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
            site_domain: "localhost:8000".to_string(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            override_roles: vec![PublisherUserRole::Publisher],
        }
    }
}

impl PublisherConfig {
    /// Load from defaults, an optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        Self::load_from_sources(path, None)
    }

    /// Like [`load`](Self::load), but reads environment overrides from `env`
    /// instead of the process environment when given.
    pub fn load_from_sources(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> ConfigResult<Self> {
        let defaults = Self::default();
        let override_roles: Vec<String> = defaults
            .workflow
            .override_roles
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut builder = Config::builder()
            .set_default("environment", defaults.environment.clone())?
            .set_default("notifications.enabled", defaults.notifications.enabled)?
            .set_default("notifications.from_email", defaults.notifications.from_email.clone())?
            .set_default("notifications.site_domain", defaults.notifications.site_domain.clone())?
            .set_default("workflow.override_roles", override_roles)?
            .set_default("logging.level", defaults.logging.level.clone())?
            .set_default("logging.json", defaults.logging.json)?;

        if let Some(path) = path {
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("workflow.override_roles")
                .source(env),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(
            environment = %config.environment,
            notifications_enabled = config.notifications.enabled,
            "Configuration loaded successfully"
        );
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.environment.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "environment",
                "publisher configuration",
            ));
        }

        if self.notifications.from_email.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "notifications.from_email",
                "notification configuration",
            ));
        }

        if !self.notifications.from_email.contains('@') {
            return Err(ConfigurationError::invalid_value(
                "notifications.from_email",
                &self.notifications.from_email,
                "must be an email address",
            ));
        }

        if self.notifications.site_domain.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "notifications.site_domain",
                "notification configuration",
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigurationError::invalid_value(
                "logging.level",
                &self.logging.level,
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        Ok(())
    }

    pub fn is_override_role(&self, role: PublisherUserRole) -> bool {
        self.workflow.override_roles.contains(&role)
    }
}
