//! Booking Wizard
//!
//! Linear state machine behind the patient booking flow:
//!
//! ```text
//! SelectDoctor(0) → SelectDateTime(1) → PatientInfo(2) → Confirm(3) ─submit→ Success(4)
//! ```
//!
//! Each step has a guard. [`BookingWizard::advance`] is a silent no-op while
//! the guard fails; [`BookingWizard::blocking_reason`] tells the view why.
//! Success is reached only through [`BookingWizard::finish_submit`] and left
//! only through [`BookingWizard::reset`].

use chrono::{Months, NaiveDate};

use crate::constants::ALL_SPECIALTIES;
use crate::domain::appointment::{Appointment, CreateAppointmentRequest};
use crate::domain::doctor::{Doctor, DoctorId, price_label};
use crate::domain::patient::{Gender, PatientInfo, e164, format_phone, is_valid_phone, normalize_phone};
use crate::domain::slot::{SlotTime, TimeSlot};
use crate::error::Error;
use crate::services::{DoctorChange, ServiceEvent, VerifyOutcome, matches_filter, specialties};
use crate::states::store::Context;
use crate::states::{UIEvent, VerificationState};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookingStep {
    #[default]
    SelectDoctor = 0,
    SelectDateTime = 1,
    PatientInfo = 2,
    Confirm = 3,
    Success = 4,
}

impl BookingStep {
    pub fn index(self) -> u8 {
        self as u8
    }

    fn next(self) -> Option<Self> {
        match self {
            BookingStep::SelectDoctor => Some(BookingStep::SelectDateTime),
            BookingStep::SelectDateTime => Some(BookingStep::PatientInfo),
            BookingStep::PatientInfo => Some(BookingStep::Confirm),
            BookingStep::Confirm | BookingStep::Success => None,
        }
    }

    fn prev(self) -> Option<Self> {
        match self {
            BookingStep::SelectDoctor | BookingStep::Success => None,
            BookingStep::SelectDateTime => Some(BookingStep::SelectDoctor),
            BookingStep::PatientInfo => Some(BookingStep::SelectDateTime),
            BookingStep::Confirm => Some(BookingStep::PatientInfo),
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            BookingStep::SelectDoctor => "step-select-doctor",
            BookingStep::SelectDateTime => "step-select-datetime",
            BookingStep::PatientInfo => "step-patient-info",
            BookingStep::Confirm => "step-confirm",
            BookingStep::Success => "step-success",
        }
    }
}

/// Why the current step cannot be left forward
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockReason {
    NoDoctor,
    NoDate,
    DateOutOfRange,
    NoTime,
    SlotUnavailable,
    MissingName,
    InvalidPhone,
    PhoneNotVerified,
    ConsentRequired,
    Submitting,
    Done,
}

impl BlockReason {
    pub fn label_key(self) -> &'static str {
        match self {
            BlockReason::NoDoctor => "block-no-doctor",
            BlockReason::NoDate => "block-no-date",
            BlockReason::DateOutOfRange => "block-date-out-of-range",
            BlockReason::NoTime => "block-no-time",
            BlockReason::SlotUnavailable => "block-slot-unavailable",
            BlockReason::MissingName => "block-missing-name",
            BlockReason::InvalidPhone => "block-invalid-phone",
            BlockReason::PhoneNotVerified => "block-phone-not-verified",
            BlockReason::ConsentRequired => "block-consent-required",
            BlockReason::Submitting => "block-submitting",
            BlockReason::Done => "block-done",
        }
    }
}

/// Summary rendered on the confirmation step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub doctor_name: String,
    pub specialty: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    pub patient_name: String,
    pub phone: String,
    pub price: String,
}

/// Transient booking draft plus wizard position
#[derive(Clone, Debug)]
pub struct BookingWizard {
    step: BookingStep,
    today: NaiveDate,
    horizon_months: u32,
    doctors: Vec<Doctor>,

    // Step 0
    specialty: String,
    search: String,
    doctor_id: Option<DoctorId>,

    // Step 1
    date: Option<NaiveDate>,
    time: Option<SlotTime>,
    slots: Vec<TimeSlot>,
    loading_slots: bool,

    // Step 2
    patient: PatientInfo,
    verification: VerificationState,

    // Step 3
    consent: bool,
    submitting: bool,
    success: bool,
    appointment: Option<Appointment>,
    last_error: Option<String>,
}

impl BookingWizard {
    pub fn new(today: NaiveDate, horizon_months: u32) -> Self {
        Self {
            step: BookingStep::SelectDoctor,
            today,
            horizon_months,
            doctors: Vec::new(),
            specialty: ALL_SPECIALTIES.to_string(),
            search: String::new(),
            doctor_id: None,
            date: None,
            time: None,
            slots: Vec::new(),
            loading_slots: false,
            patient: PatientInfo::default(),
            verification: VerificationState::default(),
            consent: false,
            submitting: false,
            success: false,
            appointment: None,
            last_error: None,
        }
    }

    // ==================== Getters ====================

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Last bookable date
    pub fn horizon_end(&self) -> NaiveDate {
        self.today
            .checked_add_months(Months::new(self.horizon_months))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn doctor_id(&self) -> Option<DoctorId> {
        self.doctor_id
    }

    pub fn selected_doctor(&self) -> Option<&Doctor> {
        self.doctor_id
            .and_then(|id| self.doctors.iter().find(|d| d.id == id))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<SlotTime> {
        self.time
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn loading_slots(&self) -> bool {
        self.loading_slots
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn verification(&self) -> &VerificationState {
        &self.verification
    }

    pub fn consent(&self) -> bool {
        self.consent
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn appointment(&self) -> Option<&Appointment> {
        self.appointment.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ==================== Derived views ====================

    /// Doctors matching the current search and specialty filter
    pub fn filtered_doctors(&self) -> Vec<&Doctor> {
        self.doctors
            .iter()
            .filter(|d| matches_filter(d, &self.search, &self.specialty))
            .collect()
    }

    pub fn specialties(&self) -> Vec<String> {
        specialties(&self.doctors)
    }

    pub fn available_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|s| s.available)
    }

    fn is_date_in_range(&self, date: NaiveDate) -> bool {
        date >= self.today && date <= self.horizon_end()
    }

    fn step_block(&self, step: BookingStep) -> Option<BlockReason> {
        match step {
            BookingStep::SelectDoctor => {
                self.selected_doctor().is_none().then_some(BlockReason::NoDoctor)
            }
            BookingStep::SelectDateTime => {
                let Some(date) = self.date else {
                    return Some(BlockReason::NoDate);
                };
                if !self.is_date_in_range(date) {
                    return Some(BlockReason::DateOutOfRange);
                }
                let Some(time) = self.time else {
                    return Some(BlockReason::NoTime);
                };
                let offered = self.slots.iter().any(|s| s.time == time && s.available);
                (!offered).then_some(BlockReason::SlotUnavailable)
            }
            BookingStep::PatientInfo => {
                if self.patient.first_name.trim().is_empty()
                    || self.patient.last_name.trim().is_empty()
                {
                    Some(BlockReason::MissingName)
                } else if !is_valid_phone(&self.patient.phone) {
                    Some(BlockReason::InvalidPhone)
                } else if !self.verification.verified() {
                    Some(BlockReason::PhoneNotVerified)
                } else {
                    None
                }
            }
            BookingStep::Confirm => (!self.consent).then_some(BlockReason::ConsentRequired),
            BookingStep::Success => Some(BlockReason::Done),
        }
    }

    /// Why the current step's guard fails, if it does
    pub fn blocking_reason(&self) -> Option<BlockReason> {
        if self.submitting {
            return Some(BlockReason::Submitting);
        }
        self.step_block(self.step)
    }

    pub fn can_advance(&self) -> bool {
        self.step.next().is_some() && self.blocking_reason().is_none()
    }

    /// Every guard from the first step through Confirm holds
    pub fn can_submit(&self) -> bool {
        self.step == BookingStep::Confirm
            && !self.submitting
            && [
                BookingStep::SelectDoctor,
                BookingStep::SelectDateTime,
                BookingStep::PatientInfo,
                BookingStep::Confirm,
            ]
            .into_iter()
            .all(|step| self.step_block(step).is_none())
    }

    /// Summary of the draft once doctor, date and time are chosen
    pub fn confirmation(&self) -> Option<Confirmation> {
        let doctor = self.selected_doctor()?;
        Some(Confirmation {
            doctor_name: doctor.name.clone(),
            specialty: doctor.specialty.clone(),
            date: self.date?,
            time: self.time?,
            patient_name: self.patient.full_name(),
            phone: format_phone(&self.patient.phone),
            price: price_label(doctor.price),
        })
    }

    // ==================== Navigation ====================

    fn go_to(&mut self, to: BookingStep, cx: &mut Context) {
        let from = self.step;
        self.step = to;
        tracing::debug!(from = ?from, to = ?to, "Booking step changed");
        cx.emit(UIEvent::StepChanged { from, to });
        cx.notify();
    }

    /// Move forward when the current guard holds; otherwise nothing changes
    pub fn advance(&mut self, cx: &mut Context) -> bool {
        if !self.can_advance() {
            return false;
        }
        let Some(next) = self.step.next() else {
            return false;
        };
        self.go_to(next, cx);
        true
    }

    /// Move back one step; no-op at the first step, on Success, or while submitting
    pub fn retreat(&mut self, cx: &mut Context) -> bool {
        if self.submitting {
            return false;
        }
        let Some(prev) = self.step.prev() else {
            return false;
        };
        self.go_to(prev, cx);
        true
    }

    /// Start over with an empty draft
    pub fn reset(&mut self, today: NaiveDate, cx: &mut Context) {
        let from = self.step;
        let doctors = std::mem::take(&mut self.doctors);
        *self = Self::new(today, self.horizon_months);
        self.doctors = doctors;
        tracing::info!("Booking wizard reset");
        if from != BookingStep::SelectDoctor {
            cx.emit(UIEvent::StepChanged {
                from,
                to: BookingStep::SelectDoctor,
            });
        }
        cx.notify();
    }

    // ==================== Step 0: doctor ====================

    pub fn set_doctors(&mut self, doctors: Vec<Doctor>, cx: &mut Context) {
        self.doctors = doctors;
        if self.doctor_id.is_some() && self.selected_doctor().is_none() {
            self.clear_doctor();
        }
        cx.notify();
    }

    /// Keep the patient-facing list in step with admin edits
    pub fn apply_event(&mut self, event: &ServiceEvent, cx: &mut Context) {
        match event {
            ServiceEvent::DoctorsLoaded(doctors) => self.set_doctors(doctors.clone(), cx),
            ServiceEvent::DoctorChanged(DoctorChange::Upserted(doctor)) => {
                match self.doctors.iter().position(|d| d.id == doctor.id) {
                    Some(i) => self.doctors[i] = doctor.clone(),
                    None => self.doctors.push(doctor.clone()),
                }
                let still_matches = self
                    .selected_doctor()
                    .is_none_or(|d| matches_filter(d, &self.search, &self.specialty));
                if !still_matches {
                    self.clear_doctor();
                }
                cx.notify();
            }
            ServiceEvent::DoctorChanged(DoctorChange::Removed(id)) => {
                self.doctors.retain(|d| d.id != *id);
                if self.doctor_id == Some(*id) {
                    tracing::info!(doctor_id = %id, "Selected doctor removed from directory");
                    self.clear_doctor();
                }
                cx.notify();
            }
            _ => {}
        }
    }

    /// Changing the specialty clears the chosen doctor
    pub fn set_specialty(&mut self, specialty: &str, cx: &mut Context) {
        let specialty = specialty.trim();
        let specialty = if specialty.is_empty() { ALL_SPECIALTIES } else { specialty };
        if self.specialty != specialty {
            self.specialty = specialty.to_string();
            self.clear_doctor();
        }
        cx.notify();
    }

    pub fn set_search(&mut self, query: &str, cx: &mut Context) {
        self.search = query.to_string();
        cx.notify();
    }

    fn clear_doctor(&mut self) {
        self.doctor_id = None;
        self.clear_schedule();
    }

    fn clear_schedule(&mut self) {
        self.date = None;
        self.time = None;
        self.slots.clear();
        self.loading_slots = false;
    }

    /// Choose a doctor from the filtered list; anything else is ignored
    pub fn select_doctor(&mut self, id: DoctorId, cx: &mut Context) -> bool {
        let listed = self
            .doctors
            .iter()
            .any(|d| d.id == id && matches_filter(d, &self.search, &self.specialty));
        if !listed {
            return false;
        }
        if self.doctor_id != Some(id) {
            self.doctor_id = Some(id);
            // slots belong to a doctor
            self.clear_schedule();
        }
        cx.notify();
        true
    }

    // ==================== Step 1: date and time ====================

    /// Pick a date; clears the time and marks slots as loading
    ///
    /// Returns the doctor to load slots for when the date is bookable.
    pub fn set_date(&mut self, date: NaiveDate, cx: &mut Context) -> Option<DoctorId> {
        self.date = Some(date);
        self.time = None;
        self.slots.clear();
        let doctor = self.doctor_id.filter(|_| self.is_date_in_range(date));
        self.loading_slots = doctor.is_some();
        if self.loading_slots {
            cx.emit(UIEvent::LoadingChanged {
                loading: true,
                what: "slots-loading",
            });
        }
        cx.notify();
        doctor
    }

    /// Apply loaded slots unless the selection moved on meanwhile
    pub fn slots_loaded(
        &mut self,
        doctor: DoctorId,
        date: NaiveDate,
        slots: Vec<TimeSlot>,
        cx: &mut Context,
    ) {
        if self.doctor_id != Some(doctor) || self.date != Some(date) {
            tracing::debug!(%doctor, %date, "Discarding stale slots");
            return;
        }
        self.slots = slots;
        self.loading_slots = false;
        cx.emit(UIEvent::LoadingChanged {
            loading: false,
            what: "slots-loading",
        });
        cx.notify();
    }

    pub fn slots_failed(&mut self, doctor: DoctorId, date: NaiveDate, error: &Error, cx: &mut Context) {
        if self.doctor_id != Some(doctor) || self.date != Some(date) {
            return;
        }
        self.loading_slots = false;
        self.last_error = Some(error.to_string());
        cx.emit(UIEvent::LoadingChanged {
            loading: false,
            what: "slots-loading",
        });
        cx.emit(UIEvent::error("toast-slots-failed", error.to_string()));
        cx.notify();
    }

    /// Choose a time; only available slots of the loaded list are accepted
    pub fn select_time(&mut self, time: SlotTime, cx: &mut Context) -> bool {
        if !self.slots.iter().any(|s| s.time == time && s.available) {
            return false;
        }
        self.time = Some(time);
        cx.notify();
        true
    }

    // ==================== Step 2: patient ====================

    pub fn set_first_name(&mut self, name: &str, cx: &mut Context) {
        self.patient.first_name = name.to_string();
        cx.notify();
    }

    pub fn set_last_name(&mut self, name: &str, cx: &mut Context) {
        self.patient.last_name = name.to_string();
        cx.notify();
    }

    /// Store the phone formatted; a different number invalidates verification
    ///
    /// Returns whether verification was reset.
    pub fn set_phone(&mut self, phone: &str, cx: &mut Context) -> bool {
        let changed = normalize_phone(phone) != normalize_phone(&self.patient.phone);
        self.patient.phone = format_phone(phone);

        let reset = changed && !self.verification.is_pristine();
        if reset {
            self.verification.reset();
            tracing::info!("Phone changed, verification reset");
            cx.emit(UIEvent::info("toast-verification-reset"));
        }
        cx.notify();
        reset
    }

    pub fn set_gender(&mut self, gender: Gender, cx: &mut Context) {
        self.patient.gender = gender;
        cx.notify();
    }

    pub fn set_comment(&mut self, comment: &str, cx: &mut Context) {
        self.patient.comment = comment.to_string();
        cx.notify();
    }

    /// Start sending a code; returns the E.164 phone to send to
    pub fn begin_send_code(&mut self, cx: &mut Context) -> Option<String> {
        if !is_valid_phone(&self.patient.phone) || !self.verification.begin_send() {
            return None;
        }
        cx.notify();
        Some(e164(&self.patient.phone))
    }

    pub fn code_sent(&mut self, phone: &str, countdown_secs: u32, cx: &mut Context) {
        self.verification
            .code_delivered(normalize_phone(phone), countdown_secs);
        cx.emit(UIEvent::info("toast-code-sent"));
        cx.notify();
    }

    pub fn code_send_failed(&mut self, error: &Error, cx: &mut Context) {
        self.verification.send_failed();
        self.last_error = Some(error.to_string());
        cx.emit(UIEvent::error("toast-code-send-failed", error.to_string()));
        cx.notify();
    }

    /// One countdown second elapsed; returns whether the countdown is still running
    pub fn tick(&mut self, cx: &mut Context) -> bool {
        if self.verification.tick() {
            cx.notify();
        }
        self.verification.countdown() > 0
    }

    pub fn set_code(&mut self, code: &str, cx: &mut Context) {
        self.verification.set_entered_code(code);
        cx.notify();
    }

    /// Start verifying the entered code; returns it when a check should run
    pub fn begin_verify(&mut self, cx: &mut Context) -> Option<String> {
        let code = self.verification.begin_verify();
        if code.is_none() && self.verification.code_invalid() {
            cx.emit(UIEvent::info("toast-code-invalid"));
        }
        cx.notify();
        code
    }

    /// Apply a check result; dropped when verification was reset meanwhile
    pub fn finish_verify(&mut self, result: Result<VerifyOutcome, Error>, cx: &mut Context) {
        if !self.verification.verifying() {
            tracing::debug!("Discarding verify result for a reset verification");
            return;
        }
        match result {
            Ok(outcome) => {
                self.verification.finish_verify(Some(outcome));
                match outcome {
                    VerifyOutcome::Verified => cx.emit(UIEvent::info("toast-phone-verified")),
                    VerifyOutcome::Mismatch => cx.emit(UIEvent::info("toast-code-invalid")),
                }
            }
            Err(e) => {
                self.verification.finish_verify(None);
                cx.emit(UIEvent::error("toast-code-invalid", e.to_string()));
            }
        }
        cx.notify();
    }

    // ==================== Step 3: confirm and submit ====================

    pub fn set_consent(&mut self, consent: bool, cx: &mut Context) {
        self.consent = consent;
        cx.notify();
    }

    /// Build the booking request and mark the wizard as submitting
    pub fn begin_submit(&mut self, cx: &mut Context) -> Option<CreateAppointmentRequest> {
        if !self.can_submit() {
            return None;
        }
        let request = CreateAppointmentRequest {
            patient_id: None,
            patient_name: self.patient.full_name(),
            patient_phone: e164(&self.patient.phone),
            patient_email: String::new(),
            patient_gender: self.patient.gender,
            doctor_id: self.doctor_id?,
            date: self.date?,
            time: self.time?,
            notes: self.patient.notes(),
        };
        self.submitting = true;
        self.last_error = None;
        cx.emit(UIEvent::LoadingChanged {
            loading: true,
            what: "block-submitting",
        });
        cx.notify();
        Some(request)
    }

    /// Success moves to the final step; failure stays on Confirm and surfaces the error
    pub fn finish_submit(&mut self, result: Result<Appointment, Error>, cx: &mut Context) {
        self.submitting = false;
        cx.emit(UIEvent::LoadingChanged {
            loading: false,
            what: "block-submitting",
        });
        match result {
            Ok(appointment) => {
                tracing::info!(appointment_id = %appointment.id, "Booking confirmed");
                self.success = true;
                cx.emit(UIEvent::BookingConfirmed {
                    appointment: appointment.id.clone(),
                });
                cx.emit(UIEvent::info("toast-booking-created"));
                self.appointment = Some(appointment);
                self.go_to(BookingStep::Success, cx);
            }
            Err(e) => {
                tracing::error!(error = %e, "Booking submission failed");
                cx.emit(UIEvent::error("toast-booking-failed", e.to_string()));
                self.last_error = Some(e.to_string());
                cx.notify();
            }
        }
    }
}
