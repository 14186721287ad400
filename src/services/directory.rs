//! Doctor Directory
//!
//! In-memory doctor list with specialty filtering, search and admin CRUD.
//! Display order is insertion order, mirroring how the directory was loaded.

use ahash::AHashMap;

use crate::assets::seed_doctors;
use crate::constants::ALL_SPECIALTIES;
use crate::domain::doctor::{Doctor, DoctorDraft, DoctorId};
use crate::error::{Error, Result};

/// Whether `doctor` passes the booking-step filter: name contains `query`
/// (case-insensitive, empty matches all) and specialty equals `specialty`
/// (or `specialty` is "all").
pub fn matches_filter(doctor: &Doctor, query: &str, specialty: &str) -> bool {
    let query = query.trim().to_lowercase();
    let matches_search = query.is_empty() || doctor.name.to_lowercase().contains(&query);
    let matches_specialty = specialty == ALL_SPECIALTIES || doctor.specialty == specialty;
    matches_search && matches_specialty
}

/// Distinct specialties, sorted
pub fn specialties<'a>(doctors: impl IntoIterator<Item = &'a Doctor>) -> Vec<String> {
    let mut list: Vec<String> = doctors.into_iter().map(|d| d.specialty.clone()).collect();
    list.sort();
    list.dedup();
    list
}

/// Doctor directory - single source of truth for the mock backend
#[derive(Clone, Debug, Default)]
pub struct DoctorDirectory {
    /// Doctors indexed by ID
    doctors: AHashMap<DoctorId, Doctor>,
    /// Ordered list of IDs (for consistent display order)
    order: Vec<DoctorId>,
}

impl DoctorDirectory {
    /// Create a directory from a list of doctors
    pub fn new(list: Vec<Doctor>) -> Self {
        let mut directory = Self::default();
        for doctor in list {
            directory.insert(doctor);
        }
        directory
    }

    /// Create a directory from the embedded seed data
    pub fn seeded() -> Result<Self> {
        Ok(Self::new(seed_doctors()?))
    }

    fn insert(&mut self, doctor: Doctor) {
        let id = doctor.id;
        if self.doctors.insert(id, doctor).is_none() {
            self.order.push(id);
        }
    }

    fn next_id(&self) -> DoctorId {
        DoctorId(self.doctors.keys().map(|id| id.get()).max().unwrap_or(0) + 1)
    }

    // ==================== Queries ====================

    /// All doctors in display order
    pub fn all(&self) -> impl Iterator<Item = &Doctor> {
        self.order.iter().filter_map(|id| self.doctors.get(id))
    }

    /// Cloned snapshot in display order
    pub fn to_vec(&self) -> Vec<Doctor> {
        self.all().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.doctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty()
    }

    pub fn get(&self, id: DoctorId) -> Option<&Doctor> {
        self.doctors.get(&id)
    }

    pub fn specialties(&self) -> Vec<String> {
        specialties(self.all())
    }

    /// Doctors with the given specialty ("all" returns everyone)
    pub fn by_specialty(&self, specialty: &str) -> Vec<&Doctor> {
        self.all()
            .filter(|d| specialty == ALL_SPECIALTIES || d.specialty == specialty)
            .collect()
    }

    /// Free-text search over name and specialty
    pub fn search(&self, query: &str) -> Vec<&Doctor> {
        let query = query.trim().to_lowercase();
        self.all()
            .filter(|d| {
                d.name.to_lowercase().contains(&query)
                    || d.specialty.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Booking-step filter, see [`matches_filter`]
    pub fn filter(&self, query: &str, specialty: &str) -> Vec<&Doctor> {
        self.all()
            .filter(|d| matches_filter(d, query, specialty))
            .collect()
    }

    // ==================== Admin CRUD ====================

    /// Add a doctor; the directory assigns the next free ID
    pub fn create(&mut self, draft: DoctorDraft) -> Result<Doctor> {
        draft.validate()?;
        let doctor = draft.into_doctor(self.next_id());
        tracing::info!(doctor_id = %doctor.id, name = %doctor.name, "Doctor created");
        self.insert(doctor.clone());
        Ok(doctor)
    }

    /// Replace the editable fields of an existing doctor
    pub fn update(&mut self, id: DoctorId, draft: DoctorDraft) -> Result<Doctor> {
        draft.validate()?;
        let doctor = self
            .doctors
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("doctor", id))?;
        draft.apply_to(doctor);
        tracing::info!(doctor_id = %id, "Doctor updated");
        Ok(doctor.clone())
    }

    /// Replace a whole record (used when syncing from a backend)
    pub fn upsert(&mut self, doctor: Doctor) {
        self.insert(doctor);
    }

    pub fn delete(&mut self, id: DoctorId) -> Result<()> {
        if self.doctors.remove(&id).is_none() {
            return Err(Error::not_found("doctor", id));
        }
        self.order.retain(|d| *d != id);
        tracing::info!(doctor_id = %id, "Doctor deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> DoctorDirectory {
        DoctorDirectory::seeded().expect("seed")
    }

    #[test]
    fn test_specialties_sorted_distinct() {
        let dir = directory();
        let specs = dir.specialties();
        assert_eq!(specs.len(), 5);
        let mut sorted = specs.clone();
        sorted.sort();
        assert_eq!(specs, sorted);
    }

    #[test]
    fn test_filter_by_name_and_specialty() {
        let dir = directory();
        assert_eq!(dir.filter("", ALL_SPECIALTIES).len(), 5);
        assert_eq!(dir.filter("ZHANI", ALL_SPECIALTIES).len(), 1);
        assert_eq!(dir.filter("", "Pediatrician").len(), 1);
        // name query does not match specialty text in the booking filter
        assert!(dir.filter("pediatric", ALL_SPECIALTIES).is_empty());
        // but free-text search does
        assert_eq!(dir.search("pediatric").len(), 1);
    }

    #[test]
    fn test_crud_roundtrip() {
        let mut dir = directory();
        let created = dir
            .create(DoctorDraft {
                name: "Omarov Timur".into(),
                specialty: "Surgeon".into(),
                price: 20000,
                ..Default::default()
            })
            .expect("create");
        assert_eq!(created.id, DoctorId(6));
        assert_eq!(dir.all().last().map(|d| d.id), Some(DoctorId(6)));

        let updated = dir
            .update(
                created.id,
                DoctorDraft {
                    name: "Omarov Timur".into(),
                    specialty: "Orthopedist".into(),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(updated.specialty, "Orthopedist");

        dir.delete(created.id).expect("delete");
        assert!(dir.get(created.id).is_none());
        assert!(matches!(dir.delete(created.id), Err(Error::NotFound { .. })));
    }
}
