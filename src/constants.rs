//! Booking Constants
//!
//! Centralized defaults for the booking flow and service layer.

/// Working window used for slot generation (hours, 24h clock)
pub const SLOT_START_HOUR: u32 = 9;
pub const SLOT_END_HOUR: u32 = 18;

/// Slot granularity in minutes
pub const SLOT_STEP_MINUTES: u32 = 30;

/// Probability that a free slot is reported as available
pub const SLOT_AVAILABILITY_RATIO: f64 = 0.7;

/// How far ahead a patient may book
pub const BOOKING_HORIZON_MONTHS: u32 = 2;

/// Default appointment duration in minutes
pub const APPOINTMENT_DURATION_MINUTES: u32 = 30;

/// Phone verification
pub const VERIFICATION_CODE_LEN: usize = 6;
pub const VERIFICATION_FIXED_CODE: &str = "123456";
pub const VERIFICATION_COUNTDOWN_SECS: u32 = 60;
pub const VERIFICATION_DELAY_MS: u64 = 1500;

/// Service layer
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const MOCK_LATENCY_MS: u64 = 300;

/// Bounded buffer capacities
pub const RECENT_ACTIVITY_CAPACITY: usize = 200;

/// Specialty filter value matching every doctor
pub const ALL_SPECIALTIES: &str = "all";

/// Config file inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "clinic-booking.toml";

/// Daily-rolling log file prefix inside the data directory
pub const LOG_FILE_PREFIX: &str = "clinic-booking.log";

/// Service event ingest loop
pub const INGEST_INTERVAL_MS: u64 = 50;
pub const INGEST_BATCH_SIZE: usize = 256;
