//! Directory State
//!
//! Admin view of the doctor list, kept in sync with the backend through
//! [`ServiceEvent`]s.

use ahash::AHashMap;

use crate::constants::ALL_SPECIALTIES;
use crate::domain::doctor::{Doctor, DoctorId};
use crate::domain::schedule::ScheduleConfig;
use crate::services::{DoctorChange, DoctorDirectory, ServiceEvent};
use crate::states::UIEvent;
use crate::states::store::Context;

#[derive(Clone, Debug)]
pub struct DirectoryState {
    directory: DoctorDirectory,
    query: String,
    specialty: String,
    selected: Option<DoctorId>,
    loading: bool,
    /// Schedules fetched or saved this session
    schedules: AHashMap<DoctorId, ScheduleConfig>,
}

impl Default for DirectoryState {
    fn default() -> Self {
        Self {
            directory: DoctorDirectory::default(),
            query: String::new(),
            specialty: ALL_SPECIALTIES.to_string(),
            selected: None,
            loading: false,
            schedules: AHashMap::new(),
        }
    }
}

impl DirectoryState {
    // ==================== Getters ====================

    pub fn doctors(&self) -> Vec<&Doctor> {
        self.directory.all().collect()
    }

    pub fn get(&self, id: DoctorId) -> Option<&Doctor> {
        self.directory.get(id)
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn selected(&self) -> Option<&Doctor> {
        self.selected.and_then(|id| self.directory.get(id))
    }

    pub fn specialties(&self) -> Vec<String> {
        self.directory.specialties()
    }

    pub fn schedule(&self, id: DoctorId) -> Option<&ScheduleConfig> {
        self.schedules.get(&id)
    }

    /// Search over name and specialty, then the specialty filter
    pub fn visible(&self) -> Vec<&Doctor> {
        let matches = if self.query.trim().is_empty() {
            self.directory.all().collect()
        } else {
            self.directory.search(&self.query)
        };
        matches
            .into_iter()
            .filter(|d| self.specialty == ALL_SPECIALTIES || d.specialty == self.specialty)
            .collect()
    }

    // ==================== Mutations ====================

    pub fn set_loading(&mut self, loading: bool, cx: &mut Context) {
        self.loading = loading;
        cx.emit(UIEvent::LoadingChanged {
            loading,
            what: "field-doctor",
        });
        cx.notify();
    }

    pub fn set_query(&mut self, query: &str, cx: &mut Context) {
        self.query = query.to_string();
        cx.notify();
    }

    pub fn set_specialty(&mut self, specialty: &str, cx: &mut Context) {
        self.specialty = specialty.to_string();
        cx.notify();
    }

    pub fn set_schedule(&mut self, id: DoctorId, schedule: ScheduleConfig, cx: &mut Context) {
        self.schedules.insert(id, schedule);
        cx.notify();
    }

    pub fn select(&mut self, id: Option<DoctorId>, cx: &mut Context) {
        self.selected = id.filter(|id| self.directory.get(*id).is_some());
        cx.notify();
    }

    /// Apply a service event; unrelated events are ignored
    pub fn apply_event(&mut self, event: &ServiceEvent, cx: &mut Context) {
        match event {
            ServiceEvent::DoctorsLoaded(doctors) => {
                self.directory = DoctorDirectory::new(doctors.clone());
                self.loading = false;
                if self.selected.is_some_and(|id| self.directory.get(id).is_none()) {
                    self.selected = None;
                }
            }
            ServiceEvent::DoctorChanged(DoctorChange::Upserted(doctor)) => {
                self.directory.upsert(doctor.clone());
                cx.emit(UIEvent::info("toast-doctor-saved"));
            }
            ServiceEvent::DoctorChanged(DoctorChange::Removed(id)) => {
                // already gone is fine
                let _ = self.directory.delete(*id);
                self.schedules.remove(id);
                if self.selected == Some(*id) {
                    self.selected = None;
                }
                cx.emit(UIEvent::info("toast-doctor-deleted"));
            }
            ServiceEvent::ScheduleSaved { doctor, schedule } => {
                self.schedules.insert(*doctor, schedule.clone());
                cx.emit(UIEvent::info("toast-schedule-saved"));
            }
            _ => return,
        }
        cx.notify();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::seed_doctors;

    fn loaded() -> (DirectoryState, Context) {
        let mut cx = Context::default();
        let mut state = DirectoryState::default();
        state.apply_event(
            &ServiceEvent::DoctorsLoaded(seed_doctors().expect("doctors")),
            &mut cx,
        );
        (state, cx)
    }

    #[test]
    fn test_load_and_filter() {
        let (mut state, mut cx) = loaded();
        assert_eq!(state.len(), 5);
        state.set_query("cardio", &mut cx);
        assert_eq!(state.visible().len(), 1);
        state.set_query("", &mut cx);
        state.set_specialty("Therapist", &mut cx);
        assert_eq!(state.visible().len(), 1);
    }

    #[test]
    fn test_removed_doctor_clears_selection() {
        let (mut state, mut cx) = loaded();
        state.select(Some(DoctorId(2)), &mut cx);
        assert!(state.selected().is_some());

        state.apply_event(&ServiceEvent::DoctorChanged(DoctorChange::Removed(DoctorId(2))), &mut cx);
        assert!(state.selected().is_none());
        assert_eq!(state.len(), 4);
    }

    #[test]
    fn test_unrelated_events_do_not_notify() {
        let mut state = DirectoryState::default();
        let mut cx = Context::default();
        state.apply_event(
            &ServiceEvent::RequestFailed {
                operation: "time_slots",
                message: "boom".into(),
            },
            &mut cx,
        );
        assert!(!cx.is_notified());
    }
}
