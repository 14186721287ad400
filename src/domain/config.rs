//! Config - Application Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOOKING_HORIZON_MONTHS, MOCK_LATENCY_MS, REQUEST_TIMEOUT_MS, SLOT_AVAILABILITY_RATIO,
    SLOT_END_HOUR, SLOT_START_HOUR, SLOT_STEP_MINUTES, VERIFICATION_COUNTDOWN_SECS,
    VERIFICATION_DELAY_MS, VERIFICATION_FIXED_CODE,
};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// UI locale ("en" or "ru"); detected from the system when unset
    pub locale: Option<String>,
    /// Backend API configuration
    pub api: ApiConfig,
    /// Slot generation
    pub slots: SlotConfig,
    /// Phone verification
    pub verification: VerificationConfig,
}

/// Which backend serves doctors and appointments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-memory data seeded from embedded JSON
    #[default]
    Mock,
    /// Remote JSON API
    Http,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub backend: Backend,
    /// Base URL of the remote API (http backend only)
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout_ms: u64,
    /// Simulated round-trip latency (mock backend only)
    pub latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Mock,
            base_url: "http://localhost:8080".to_string(),
            request_timeout_ms: REQUEST_TIMEOUT_MS,
            latency_ms: MOCK_LATENCY_MS,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Slot generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// First slot starts at this hour
    pub start_hour: u32,
    /// Window closes at this hour (exclusive)
    pub end_hour: u32,
    /// Slot granularity
    pub step_minutes: u32,
    /// Probability that an unbooked slot is offered (1.0 = only bookings block slots)
    pub availability_ratio: f64,
    /// Latest bookable date, in months from today
    pub horizon_months: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            start_hour: SLOT_START_HOUR,
            end_hour: SLOT_END_HOUR,
            step_minutes: SLOT_STEP_MINUTES,
            availability_ratio: SLOT_AVAILABILITY_RATIO,
            horizon_months: BOOKING_HORIZON_MONTHS,
        }
    }
}

/// Phone verification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Code handed out on every send; a random code is generated when unset
    pub fixed_code: Option<String>,
    /// Seconds before a resend is allowed
    pub countdown_secs: u32,
    /// Simulated verification round-trip
    pub verify_delay_ms: u64,
    /// Lock verification after this many mismatches (unbounded when unset)
    pub max_attempts: Option<u32>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            fixed_code: Some(VERIFICATION_FIXED_CODE.to_string()),
            countdown_secs: VERIFICATION_COUNTDOWN_SECS,
            verify_delay_ms: VERIFICATION_DELAY_MS,
            max_attempts: None,
        }
    }
}

impl VerificationConfig {
    pub fn verify_delay(&self) -> Duration {
        Duration::from_millis(self.verify_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            locale = "ru"

            [api]
            backend = "http"
            base_url = "https://clinic.example"

            [verification]
            max_attempts = 5
            "#,
        )
        .expect("parse");

        assert_eq!(config.locale.as_deref(), Some("ru"));
        assert_eq!(config.api.backend, Backend::Http);
        assert_eq!(config.api.request_timeout_ms, REQUEST_TIMEOUT_MS);
        assert_eq!(config.slots.start_hour, 9);
        assert_eq!(config.verification.max_attempts, Some(5));
        assert_eq!(config.verification.fixed_code.as_deref(), Some("123456"));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: AppConfig = toml::from_str("").expect("parse");
        assert_eq!(config.api.backend, Backend::Mock);
        assert_eq!(config.verification.countdown_secs, 60);
    }
}
