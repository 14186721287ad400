//! UI Events
//!
//! Events emitted from state layer to UI layer for notifications,
//! toasts, and other user-facing feedback.

use std::sync::Arc;

use crate::domain::appointment::AppointmentId;
use crate::states::BookingStep;

/// UI events for user feedback
#[derive(Clone, Debug, PartialEq)]
pub enum UIEvent {
    /// Display a toast notification
    Toast {
        /// i18n key of the message
        key: &'static str,
        /// Untranslated detail appended to the message
        detail: Option<Arc<str>>,
        /// Whether this is an error (affects styling)
        is_error: bool,
    },

    /// Wizard moved to another step
    StepChanged { from: BookingStep, to: BookingStep },

    /// Loading state changed
    LoadingChanged {
        /// Whether loading
        loading: bool,
        /// i18n key describing what is loading
        what: &'static str,
    },

    /// Booking went through
    BookingConfirmed { appointment: AppointmentId },

    /// Error occurred (for logging/display)
    ErrorOccurred {
        /// Error source/task name
        source: Arc<str>,
        /// Error message
        message: Arc<str>,
    },
}

impl UIEvent {
    pub fn info(key: &'static str) -> Self {
        UIEvent::Toast {
            key,
            detail: None,
            is_error: false,
        }
    }

    pub fn error(key: &'static str, detail: impl Into<Arc<str>>) -> Self {
        UIEvent::Toast {
            key,
            detail: Some(detail.into()),
            is_error: true,
        }
    }
}
