//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the upstream base URL
//! - Validate value ranges (retry ceiling, backoff)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

const MAX_RETRIES_LIMIT: u32 = 10;
const MAX_BACKOFF_MS: u64 = 10_000;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url: {0}")]
    InvalidBaseUrl(String),

    #[error("upstream.root_id must not be empty")]
    EmptyRootId,

    #[error("retries.max_retries: {0} exceeds limit of 10")]
    TooManyRetries(u32),

    #[error("retries.backoff_ms: {0} exceeds limit of 10000")]
    BackoffTooLong(u64),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "server.bind_address",
        &config.server.bind_address,
        &mut errors,
    );
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => {
            errors.push(ValidationError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        Ok(url) if url.host_str().is_none() => {
            errors.push(ValidationError::InvalidBaseUrl("missing host".into()));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::InvalidBaseUrl(e.to_string())),
    }

    if config.upstream.root_id.trim().is_empty() {
        errors.push(ValidationError::EmptyRootId);
    }

    if config.retries.max_retries > MAX_RETRIES_LIMIT {
        errors.push(ValidationError::TooManyRetries(config.retries.max_retries));
    }

    if config.retries.backoff_ms > MAX_BACKOFF_MS {
        errors.push(ValidationError::BackoffTooLong(config.retries.backoff_ms));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
