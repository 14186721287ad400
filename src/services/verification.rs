//! Phone Verification Service
//!
//! Issues one-time codes, hands them to a [`CodeSender`] and checks the
//! patient's answer after a simulated round-trip.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;

use crate::constants::VERIFICATION_CODE_LEN;
use crate::domain::config::VerificationConfig;
use crate::error::{Error, Result};

/// Delivery channel for verification codes
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send(&self, phone: &str, code: &str) -> Result<()>;
}

/// Writes the code to the log instead of delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCodeSender;

#[async_trait]
impl CodeSender for LogCodeSender {
    async fn send(&self, phone: &str, code: &str) -> Result<()> {
        tracing::info!(phone = %phone, code = %code, "Verification code issued");
        Ok(())
    }
}

/// Whether `input` is exactly six ASCII digits
pub fn is_code_format(input: &str) -> bool {
    input.len() == VERIFICATION_CODE_LEN && input.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug)]
struct IssuedCode {
    phone: String,
    code: String,
    failures: u32,
}

/// Outcome of a well-formed verification attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    Mismatch,
}

pub struct VerificationService {
    config: VerificationConfig,
    sender: Arc<dyn CodeSender>,
    issued: Mutex<Option<IssuedCode>>,
}

impl VerificationService {
    pub fn new(config: VerificationConfig, sender: Arc<dyn CodeSender>) -> Self {
        Self {
            config,
            sender,
            issued: Mutex::new(None),
        }
    }

    /// Service that only logs codes
    pub fn with_log_sender(config: VerificationConfig) -> Self {
        Self::new(config, Arc::new(LogCodeSender))
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    fn generate_code(&self) -> String {
        match &self.config.fixed_code {
            Some(code) => code.clone(),
            None => format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32)),
        }
    }

    /// Issue a fresh code for `phone`, replacing any previous one
    pub async fn send_code(&self, phone: &str) -> Result<()> {
        let code = self.generate_code();
        self.sender.send(phone, &code).await?;
        *self.issued.lock() = Some(IssuedCode {
            phone: phone.to_string(),
            code,
            failures: 0,
        });
        Ok(())
    }

    /// Phone the current code was issued for
    pub fn issued_phone(&self) -> Option<String> {
        self.issued.lock().as_ref().map(|i| i.phone.clone())
    }

    /// Check `submitted` against the issued code after the configured delay
    ///
    /// Malformed input is rejected immediately. When `max_attempts` is set,
    /// further attempts after that many mismatches are refused.
    pub async fn verify(&self, submitted: &str) -> Result<VerifyOutcome> {
        if !is_code_format(submitted) {
            return Err(Error::Verification {
                message: format!("code must be {VERIFICATION_CODE_LEN} digits"),
            });
        }

        {
            let issued = self.issued.lock();
            let Some(issued) = issued.as_ref() else {
                return Err(Error::Verification {
                    message: "no code has been sent".to_string(),
                });
            };
            if self
                .config
                .max_attempts
                .is_some_and(|max| issued.failures >= max)
            {
                return Err(Error::Verification {
                    message: "too many attempts, request a new code".to_string(),
                });
            }
        }

        tokio::time::sleep(self.config.verify_delay()).await;

        let mut guard = self.issued.lock();
        let Some(issued) = guard.as_mut() else {
            return Err(Error::Verification {
                message: "verification was reset".to_string(),
            });
        };
        if issued.code == submitted {
            tracing::info!(phone = %issued.phone, "Phone verified");
            Ok(VerifyOutcome::Verified)
        } else {
            issued.failures += 1;
            tracing::warn!(phone = %issued.phone, failures = issued.failures, "Verification code mismatch");
            Ok(VerifyOutcome::Mismatch)
        }
    }

    /// Forget the issued code
    pub fn clear(&self) {
        *self.issued.lock() = None;
    }
}

impl std::fmt::Debug for VerificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationService")
            .field("config", &self.config)
            .field("issued", &self.issued.lock().is_some())
            .finish()
    }
}
