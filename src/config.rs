// src/config.rs
// Client configuration from the environment (with optional .env file)

use crate::error::{Result, SdkError};
use std::env;
use std::time::Duration;
use tracing::{error, info, warn};

/// Local development gateway.
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:1984";
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Validation result for configuration checks
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    fn new() -> Self {
        Self {
            valid: true,
            ..Default::default()
        }
    }

    fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn add_error(&mut self, msg: String) {
        self.errors.push(msg);
        self.valid = false;
    }

    pub fn log_summary(&self) {
        for w in &self.warnings {
            warn!("config: {}", w);
        }
        for e in &self.errors {
            error!("config: {}", e);
        }
        if self.valid && self.warnings.is_empty() {
            info!("configuration validation passed");
        }
    }
}

/// Settings for talking to a ledger gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub gateway_url: String,
    pub timeout: Duration,
    pub environment: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            environment: "development".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from `WEAVE_*` environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup and reject invalid settings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = ClientConfig::default();
        let mut validation = ConfigValidation::new();

        if let Some(url) = lookup("WEAVE_GATEWAY_URL").filter(|u| !u.trim().is_empty()) {
            config.gateway_url = url.trim().to_string();
        }

        if let Some(secs) = lookup("WEAVE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(0) => {
                    validation.add_error("WEAVE_TIMEOUT_SECS must be greater than zero".into())
                }
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => validation
                    .add_error(format!("WEAVE_TIMEOUT_SECS is not a number: '{}'", secs)),
            }
        }

        if let Some(environment) = lookup("WEAVE_ENVIRONMENT") {
            config.environment = environment.trim().to_lowercase();
        }

        config.check(&mut validation);
        validation.log_summary();

        if validation.valid {
            Ok(config)
        } else {
            Err(SdkError::Config(validation.errors.join("; ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production" || self.environment == "prod"
    }

    fn check(&self, validation: &mut ConfigValidation) {
        let url = &self.gateway_url;
        if url.starts_with("https://") {
            return;
        }
        if !url.starts_with("http://") {
            validation.add_error(format!("WEAVE_GATEWAY_URL must be an http(s) URL: '{}'", url));
        } else if self.is_production() {
            validation.add_error("Production deployment MUST use an https gateway!".into());
        } else {
            validation.add_warning(format!("gateway {} is not using TLS", url));
        }
    }
}
