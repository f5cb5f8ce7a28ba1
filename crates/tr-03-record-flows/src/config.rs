//! Flow configuration

use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Largest power of ten that keeps any `i64` amount in range after scaling.
pub const MAX_FRACTION_DIGITS: u32 = 18;

#[derive(Clone, Debug)]
pub struct RecordFlowConfig {
    /// Notary to use when it is known; otherwise the first known notary.
    pub preferred_notary: Option<String>,
    /// Currency code of issued fiat tokens.
    pub token_type: String,
    /// Fraction digits of `token_type`; amounts are stored in the smallest unit.
    pub fraction_digits: u32,
    /// Bound on each counter-signature exchange.
    pub session_timeout: Duration,
    /// Bound on the consensus authority round trip.
    pub consensus_timeout: Duration,
    /// Bound on waiting for finality or storage acknowledgements.
    pub finality_timeout: Duration,
}

impl Default for RecordFlowConfig {
    fn default() -> Self {
        Self {
            preferred_notary: None,
            token_type: "USD".to_string(),
            fraction_digits: 2,
            session_timeout: Duration::from_secs(10),
            consensus_timeout: Duration::from_secs(10),
            finality_timeout: Duration::from_secs(30),
        }
    }
}

impl RecordFlowConfig {
    /// Defaults overridden by `TR_*` environment variables. Unparsable values
    /// are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(notary) = std::env::var("TR_PREFERRED_NOTARY") {
            if !notary.is_empty() {
                info!(notary = %notary, "Preferred notary from environment");
                config.preferred_notary = Some(notary);
            }
        }
        if let Ok(token_type) = std::env::var("TR_TOKEN_TYPE") {
            config.token_type = token_type;
        }
        if let Some(timeout) = duration_from_env("TR_SESSION_TIMEOUT_MS") {
            config.session_timeout = timeout;
        }
        if let Some(timeout) = duration_from_env("TR_CONSENSUS_TIMEOUT_MS") {
            config.consensus_timeout = timeout;
        }
        if let Some(timeout) = duration_from_env("TR_FINALITY_TIMEOUT_MS") {
            config.finality_timeout = timeout;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_type.trim().is_empty() {
            return Err(ConfigError::EmptyTokenType);
        }
        if self.fraction_digits > MAX_FRACTION_DIGITS {
            return Err(ConfigError::TooManyFractionDigits {
                digits: self.fraction_digits,
                max: MAX_FRACTION_DIGITS,
            });
        }
        for (name, value) in [
            ("session_timeout", self.session_timeout),
            ("consensus_timeout", self.consensus_timeout),
            ("finality_timeout", self.finality_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroTimeout { name });
            }
        }
        Ok(())
    }
}

fn duration_from_env(key: &str) -> Option<Duration> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable timeout");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Token type must not be empty")]
    EmptyTokenType,

    #[error("Fraction digits {digits} exceed maximum {max}")]
    TooManyFractionDigits { digits: u32, max: u32 },

    #[error("Timeout {name} must be non-zero")]
    ZeroTimeout { name: &'static str },
}
