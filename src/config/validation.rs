//! Configuration validation.
//!
//! Semantic checks that serde cannot express. Every problem is reported, not
//! just the first one.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::RelayConfig;
use crate::safe::address::{is_restricted_address, parse_address};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem, tagged with the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if url::Url::parse(value).is_err() {
        errors.push(ValidationError::new(field, format!("'{value}' is not a valid URL")));
    }
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "runtime.rpc_url", &config.runtime.rpc_url);
    for url in &config.runtime.failover_urls {
        check_url(&mut errors, "runtime.failover_urls", url);
    }
    if config.runtime.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("runtime.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.runtime.confirmation_blocks == 0 {
        errors.push(ValidationError::new("runtime.confirmation_blocks", "must be at least 1"));
    }

    check_url(&mut errors, "service.url", &config.service.url);
    if config.service.timeout_secs == 0 {
        errors.push(ValidationError::new("service.timeout_secs", "must be greater than 0"));
    }

    if !config.relay.safe_address.is_empty() {
        match parse_address(&config.relay.safe_address) {
            Ok(address) if is_restricted_address(&address) => errors.push(ValidationError::new(
                "relay.safe_address",
                "restricted address cannot be a Safe",
            )),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::new("relay.safe_address", e.to_string())),
        }
    }
    if let Err(e) = parse_address(&config.relay.create_call_address) {
        errors.push(ValidationError::new("relay.create_call_address", e.to_string()));
    }
    if config.relay.polling_delay_ms == 0 {
        errors.push(ValidationError::new("relay.polling_delay_ms", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
