//! Booking Controller
//!
//! Drives the patient booking wizard: forwards user input to the
//! [`BookingWizard`] store and runs the backend calls each step needs
//! (doctor list, slots, verification, submission).

use std::time::Duration;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::domain::doctor::DoctorId;
use crate::domain::patient::Gender;
use crate::domain::slot::SlotTime;
use crate::error::Result;
use crate::helpers::today;
use crate::services::ServiceHub;
use crate::states::{BookingWizard, Store, UIEvent};

/// Booking flow controller
pub struct BookingController {
    hub: ServiceHub,
    wizard: Store<BookingWizard>,
    countdown_secs: u32,
    countdown_task: Mutex<Option<JoinHandle<()>>>,
}

impl BookingController {
    pub fn new(hub: ServiceHub, wizard: Store<BookingWizard>) -> Self {
        let countdown_secs = hub.verification().config().countdown_secs;
        Self {
            hub,
            wizard,
            countdown_secs,
            countdown_task: Mutex::new(None),
        }
    }

    pub fn wizard(&self) -> &Store<BookingWizard> {
        &self.wizard
    }

    // ==================== Step 0 ====================

    /// Fetch the directory for the doctor step
    pub async fn load_doctors(&self) -> Result<()> {
        match self.hub.fetch_doctors().await {
            Ok(doctors) => {
                self.wizard.update(|w, cx| w.set_doctors(doctors, cx));
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                self.wizard
                    .update(|_, cx| cx.emit(UIEvent::error("toast-doctors-failed", message)));
                Err(e)
            }
        }
    }

    pub fn set_specialty(&self, specialty: &str) {
        self.wizard.update(|w, cx| w.set_specialty(specialty, cx));
    }

    pub fn set_search(&self, query: &str) {
        self.wizard.update(|w, cx| w.set_search(query, cx));
    }

    pub fn select_doctor(&self, id: DoctorId) -> bool {
        self.wizard.update(|w, cx| w.select_doctor(id, cx))
    }

    // ==================== Step 1 ====================

    /// Pick a date and load its slots
    pub async fn set_date(&self, date: NaiveDate) {
        let Some(doctor) = self.wizard.update(|w, cx| w.set_date(date, cx)) else {
            return;
        };

        let result = self.hub.fetch_slots(doctor, date).await;
        self.wizard.update(|w, cx| match result {
            Ok(slots) => w.slots_loaded(doctor, date, slots, cx),
            Err(e) => w.slots_failed(doctor, date, &e, cx),
        });
    }

    pub fn select_time(&self, time: SlotTime) -> bool {
        self.wizard.update(|w, cx| w.select_time(time, cx))
    }

    // ==================== Step 2 ====================

    pub fn set_name(&self, first: &str, last: &str) {
        self.wizard.update(|w, cx| {
            w.set_first_name(first, cx);
            w.set_last_name(last, cx);
        });
    }

    pub fn set_phone(&self, phone: &str) {
        let reset = self.wizard.update(|w, cx| w.set_phone(phone, cx));
        if reset {
            self.stop_countdown();
            self.hub.verification().clear();
        }
    }

    pub fn set_gender(&self, gender: Gender) {
        self.wizard.update(|w, cx| w.set_gender(gender, cx));
    }

    pub fn set_comment(&self, comment: &str) {
        self.wizard.update(|w, cx| w.set_comment(comment, cx));
    }

    /// Send (or resend) a code; no-op while the countdown runs
    pub async fn send_code(&self) -> bool {
        let Some(phone) = self.wizard.update(|w, cx| w.begin_send_code(cx)) else {
            return false;
        };

        match self.hub.verification().send_code(&phone).await {
            Ok(()) => {
                self.wizard
                    .update(|w, cx| w.code_sent(&phone, self.countdown_secs, cx));
                self.start_countdown();
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "Sending verification code failed");
                self.wizard.update(|w, cx| w.code_send_failed(&e, cx));
                false
            }
        }
    }

    /// Enter and check a code; returns whether the phone is now verified
    pub async fn verify(&self, code: &str) -> bool {
        let Some(code) = self.wizard.update(|w, cx| {
            w.set_code(code, cx);
            w.begin_verify(cx)
        }) else {
            return self.wizard.read(|w| w.verification().verified());
        };

        let result = self.hub.verification().verify(&code).await;
        self.wizard.update(|w, cx| {
            w.finish_verify(result, cx);
            w.verification().verified()
        })
    }

    fn start_countdown(&self) {
        let wizard = self.wizard.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                if !wizard.update(|w, cx| w.tick(cx)) {
                    break;
                }
            }
        });
        if let Some(previous) = self.countdown_task.lock().replace(task) {
            previous.abort();
        }
    }

    fn stop_countdown(&self) {
        if let Some(task) = self.countdown_task.lock().take() {
            task.abort();
        }
    }

    // ==================== Step 3 ====================

    pub fn set_consent(&self, consent: bool) {
        self.wizard.update(|w, cx| w.set_consent(consent, cx));
    }

    pub fn advance(&self) -> bool {
        self.wizard.update(|w, cx| w.advance(cx))
    }

    pub fn retreat(&self) -> bool {
        self.wizard.update(|w, cx| w.retreat(cx))
    }

    /// Submit the booking; returns whether it went through
    pub async fn submit(&self) -> bool {
        let Some(request) = self.wizard.update(|w, cx| w.begin_submit(cx)) else {
            return false;
        };

        let result = self.hub.create_appointment(request).await;
        let ok = result.is_ok();
        if ok {
            self.stop_countdown();
        }
        self.wizard.update(|w, cx| w.finish_submit(result, cx));
        ok
    }

    /// Discard the draft and start over
    pub fn reset(&self) {
        self.stop_countdown();
        self.hub.verification().clear();
        self.wizard.update(|w, cx| w.reset(today(), cx));
    }
}

impl Drop for BookingController {
    fn drop(&mut self) {
        self.stop_countdown();
    }
}
