//! Appointment - Booking Records, Requests and Statistics

use chrono::{DateTime, Days, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::domain::doctor::DoctorId;
use crate::domain::patient::Gender;
use crate::domain::slot::SlotTime;

/// Unique identifier for an appointment, e.g. "APT-001"
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AppointmentId(pub String);

impl AppointmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AppointmentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Appointment lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Confirmed,
    #[default]
    Pending,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    /// Terminal statuses cannot transition any further
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Completed | AppointmentStatus::NoShow
        )
    }

    /// i18n key for display
    pub fn label_key(self) -> &'static str {
        match self {
            AppointmentStatus::Confirmed => "status-confirmed",
            AppointmentStatus::Pending => "status-pending",
            AppointmentStatus::Cancelled => "status-cancelled",
            AppointmentStatus::Completed => "status-completed",
            AppointmentStatus::NoShow => "status-no-show",
        }
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "pending" => Ok(AppointmentStatus::Pending),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            "no-show" | "noshow" => Ok(AppointmentStatus::NoShow),
            other => Err(crate::error::Error::invalid(format!("unknown status: {other}"))),
        }
    }
}

/// A booked appointment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_phone: String,
    #[serde(default)]
    pub patient_email: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub doctor_specialty: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    /// Duration in minutes
    pub duration: u32,
    pub status: AppointmentStatus,
    /// Price in tenge
    pub price: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment still occupies its slot
    pub fn holds_slot(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// Payload sent when a patient completes the booking wizard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    #[serde(default)]
    pub patient_id: Option<String>,
    pub patient_name: String,
    pub patient_phone: String,
    #[serde(default)]
    pub patient_email: String,
    pub patient_gender: Gender,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub time: SlotTime,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Status change request used by the admin board
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
}

/// Aggregate counters for the dashboard
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentStats {
    pub total: usize,
    pub confirmed: usize,
    pub pending: usize,
    pub cancelled: usize,
    pub completed: usize,
    pub today_total: usize,
    pub tomorrow_total: usize,
    pub week_total: usize,
}

impl AppointmentStats {
    /// Compute statistics relative to `today`
    pub fn compute<'a>(appointments: impl IntoIterator<Item = &'a Appointment>, today: NaiveDate) -> Self {
        let tomorrow = today.checked_add_days(Days::new(1));
        let week_end = today.checked_add_days(Days::new(7));
        let mut stats = Self::default();

        for apt in appointments {
            stats.total += 1;
            match apt.status {
                AppointmentStatus::Confirmed => stats.confirmed += 1,
                AppointmentStatus::Pending => stats.pending += 1,
                AppointmentStatus::Cancelled => stats.cancelled += 1,
                AppointmentStatus::Completed => stats.completed += 1,
                AppointmentStatus::NoShow => {}
            }
            if apt.date == today {
                stats.today_total += 1;
            }
            if Some(apt.date) == tomorrow {
                stats.tomorrow_total += 1;
            }
            if apt.date >= today && week_end.is_none_or(|end| apt.date <= end) {
                stats.week_total += 1;
            }
        }

        stats
    }
}

/// Appointments split around a reference day
#[derive(Clone, Debug, Default)]
pub struct AppointmentPartition {
    pub today: Vec<Appointment>,
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

impl AppointmentPartition {
    pub fn split<'a>(appointments: impl IntoIterator<Item = &'a Appointment>, today: NaiveDate) -> Self {
        let mut partition = Self::default();
        for apt in appointments {
            let bucket = if apt.date == today {
                &mut partition.today
            } else if apt.date > today {
                &mut partition.upcoming
            } else {
                &mut partition.past
            };
            bucket.push(apt.clone());
        }
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apt(id: &str, date: NaiveDate, status: AppointmentStatus) -> Appointment {
        Appointment {
            id: id.into(),
            patient_id: "PAT-1".into(),
            patient_name: "Ivan Petrov".into(),
            patient_phone: "+77771234567".into(),
            patient_email: String::new(),
            doctor_id: DoctorId(1),
            doctor_name: "Doctor".into(),
            doctor_specialty: "Therapist".into(),
            date,
            time: "09:00".parse().expect("time"),
            duration: 30,
            status,
            price: 12000,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn test_stats_counts_windows() {
        let today = day(2026, 3, 10);
        let list = vec![
            apt("APT-1", today, AppointmentStatus::Confirmed),
            apt("APT-2", day(2026, 3, 11), AppointmentStatus::Pending),
            apt("APT-3", day(2026, 3, 17), AppointmentStatus::Pending),
            apt("APT-4", day(2026, 3, 18), AppointmentStatus::Cancelled),
            apt("APT-5", day(2026, 3, 9), AppointmentStatus::Completed),
        ];

        let stats = AppointmentStats::compute(&list, today);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.today_total, 1);
        assert_eq!(stats.tomorrow_total, 1);
        // today .. today+7 inclusive
        assert_eq!(stats.week_total, 3);
    }

    #[test]
    fn test_partition() {
        let today = day(2026, 3, 10);
        let list = vec![
            apt("APT-1", today, AppointmentStatus::Confirmed),
            apt("APT-2", day(2026, 3, 12), AppointmentStatus::Pending),
            apt("APT-3", day(2026, 3, 9), AppointmentStatus::Completed),
        ];
        let p = AppointmentPartition::split(&list, today);
        assert_eq!(p.today.len(), 1);
        assert_eq!(p.upcoming.len(), 1);
        assert_eq!(p.past.len(), 1);
        assert_eq!(p.past[0].id.as_str(), "APT-3");
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(!AppointmentStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("no_show".parse::<AppointmentStatus>().ok(), Some(AppointmentStatus::NoShow));
        assert_eq!("Canceled".parse::<AppointmentStatus>().ok(), Some(AppointmentStatus::Cancelled));
        assert!("archived".parse::<AppointmentStatus>().is_err());
    }
}
