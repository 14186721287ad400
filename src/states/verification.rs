//! Verification State
//!
//! Phone verification progress shown on the patient details step. The
//! countdown gates resends: a new code may be requested only once it reaches
//! zero.

use crate::services::{VerifyOutcome, is_code_format};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationState {
    code_sent: bool,
    sending: bool,
    verifying: bool,
    verified: bool,
    /// Seconds until a resend is allowed
    countdown: u32,
    entered_code: String,
    code_invalid: bool,
    /// Mismatched attempts for the current code
    attempts: u32,
    /// Normalized phone the code was sent to
    phone: Option<String>,
}

impl VerificationState {
    // ==================== Getters ====================

    pub fn code_sent(&self) -> bool {
        self.code_sent
    }

    pub fn sending(&self) -> bool {
        self.sending
    }

    pub fn verifying(&self) -> bool {
        self.verifying
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn entered_code(&self) -> &str {
        &self.entered_code
    }

    pub fn code_invalid(&self) -> bool {
        self.code_invalid
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Resend is enabled exactly when a code was sent and the countdown ran out
    pub fn can_resend(&self) -> bool {
        self.code_sent && self.countdown == 0
    }

    /// Whether a send (first or repeated) may start now
    pub fn can_send(&self) -> bool {
        !self.verified && !self.sending && (!self.code_sent || self.can_resend())
    }

    /// Nothing has happened yet
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }

    // ==================== Transitions ====================

    pub fn begin_send(&mut self) -> bool {
        if !self.can_send() {
            return false;
        }
        self.sending = true;
        true
    }

    /// Code went out to `phone`; restart the countdown and clear the entered code
    pub fn code_delivered(&mut self, phone: String, countdown_secs: u32) {
        self.sending = false;
        self.code_sent = true;
        self.countdown = countdown_secs;
        self.entered_code.clear();
        self.code_invalid = false;
        self.attempts = 0;
        self.phone = Some(phone);
    }

    pub fn send_failed(&mut self) {
        self.sending = false;
    }

    /// One second elapsed; returns whether the countdown changed
    pub fn tick(&mut self) -> bool {
        if self.countdown == 0 {
            return false;
        }
        self.countdown -= 1;
        true
    }

    pub fn set_entered_code(&mut self, code: &str) {
        self.entered_code = code.trim().to_string();
        self.code_invalid = false;
    }

    /// Start checking the entered code
    ///
    /// Returns the code to submit, or `None` when nothing can be checked.
    /// Malformed input is marked invalid right away.
    pub fn begin_verify(&mut self) -> Option<String> {
        if !self.code_sent || self.verifying || self.verified {
            return None;
        }
        if !is_code_format(&self.entered_code) {
            self.code_invalid = true;
            return None;
        }
        self.verifying = true;
        self.code_invalid = false;
        Some(self.entered_code.clone())
    }

    /// Apply the outcome of a check; the countdown keeps running on mismatch
    pub fn finish_verify(&mut self, outcome: Option<VerifyOutcome>) {
        self.verifying = false;
        match outcome {
            Some(VerifyOutcome::Verified) => {
                self.verified = true;
                self.code_invalid = false;
            }
            Some(VerifyOutcome::Mismatch) | None => {
                self.verified = false;
                self.code_invalid = true;
                self.attempts += 1;
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent() -> VerificationState {
        let mut state = VerificationState::default();
        assert!(state.begin_send());
        state.code_delivered("77771234567".into(), 60);
        state
    }

    #[test]
    fn test_resend_gated_by_countdown() {
        let mut state = sent();
        assert!(!state.can_resend());
        assert!(!state.can_send());
        for remaining in (0..60).rev() {
            assert!(!state.can_resend());
            assert!(state.tick());
            assert_eq!(state.countdown(), remaining);
        }
        assert!(state.can_resend());
        // saturates
        assert!(!state.tick());
        assert_eq!(state.countdown(), 0);
    }

    #[test]
    fn test_mismatch_keeps_countdown() {
        let mut state = sent();
        state.tick();
        state.set_entered_code("000000");
        assert_eq!(state.begin_verify().as_deref(), Some("000000"));
        state.finish_verify(Some(VerifyOutcome::Mismatch));

        assert!(!state.verified());
        assert!(state.code_invalid());
        assert_eq!(state.countdown(), 59);
        assert_eq!(state.attempts(), 1);
    }

    #[test]
    fn test_malformed_code_marked_invalid() {
        let mut state = sent();
        state.set_entered_code("12ab");
        assert_eq!(state.begin_verify(), None);
        assert!(state.code_invalid());
        assert!(!state.verifying());
    }

    #[test]
    fn test_resend_clears_entered_code() {
        let mut state = sent();
        state.set_entered_code("111111");
        for _ in 0..60 {
            state.tick();
        }
        assert!(state.begin_send());
        state.code_delivered("77771234567".into(), 60);
        assert_eq!(state.entered_code(), "");
        assert_eq!(state.countdown(), 60);
    }

    #[test]
    fn test_verified_blocks_further_sends() {
        let mut state = sent();
        state.set_entered_code("123456");
        state.begin_verify();
        state.finish_verify(Some(VerifyOutcome::Verified));
        assert!(state.verified());
        assert!(!state.can_send());
        state.reset();
        assert!(state.is_pristine());
    }
}
