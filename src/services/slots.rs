//! Slot Generator
//!
//! Produces the bookable times for a doctor on a date. Every date in range
//! yields the full window unless the doctor's schedule closes that day;
//! availability combines existing bookings, the schedule and a random draw
//! standing in for the doctor's real calendar.

use chrono::{Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::config::SlotConfig;
use crate::domain::schedule::ScheduleConfig;
use crate::domain::slot::{SlotTime, TimeSlot};

pub struct SlotGenerator {
    config: SlotConfig,
    rng: StdRng,
}

impl SlotGenerator {
    pub fn new(config: SlotConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator for tests and reproducible demos
    pub fn with_seed(config: SlotConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    /// Every slot start in the working window, ascending
    pub fn window(&self) -> Vec<SlotTime> {
        let start = self.config.start_hour * 60;
        let end = self.config.end_hour.min(24) * 60;
        if self.config.step_minutes == 0 || start >= end {
            return Vec::new();
        }
        (start..end)
            .step_by(self.config.step_minutes as usize)
            .filter_map(|m| SlotTime::from_minutes(m).ok())
            .collect()
    }

    /// Last bookable date
    pub fn horizon_end(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_add_months(Months::new(self.config.horizon_months))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Whether `date` lies in [today, today + horizon]
    pub fn is_bookable_date(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= today && date <= self.horizon_end(today)
    }

    fn ratio(&self) -> f64 {
        let ratio = self.config.availability_ratio;
        if ratio.is_nan() { 1.0 } else { ratio.clamp(0.0, 1.0) }
    }

    /// Slots for `date`; `is_booked` reports times already taken in the store
    ///
    /// With a schedule, days it closes yield nothing and times outside its
    /// working hours stay unavailable.
    pub fn generate(
        &mut self,
        date: NaiveDate,
        today: NaiveDate,
        schedule: Option<&ScheduleConfig>,
        is_booked: impl Fn(SlotTime) -> bool,
    ) -> Vec<TimeSlot> {
        if !self.is_bookable_date(date, today) {
            tracing::debug!(%date, %today, "Date outside booking horizon, no slots");
            return Vec::new();
        }
        if schedule.is_some_and(|s| s.is_day_off(date)) {
            tracing::debug!(%date, "Doctor does not work this day, no slots");
            return Vec::new();
        }

        let ratio = self.ratio();
        self.window()
            .into_iter()
            .map(|time| {
                let drawn = self.rng.gen_bool(ratio);
                let open = schedule.is_none_or(|s| s.is_open_at(date, time));
                TimeSlot::new(time, drawn && open && !is_booked(time))
            })
            .collect()
    }
}

impl std::fmt::Debug for SlotGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotGenerator")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::doctor::DayHours;
    use crate::domain::schedule::{SpecialDate, SpecialDateKind};
    use chrono::Days;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).expect("date")
    }

    fn days(n: u64) -> NaiveDate {
        today().checked_add_days(Days::new(n)).expect("date")
    }

    #[test]
    fn test_default_window_has_18_slots() {
        let mut generator = SlotGenerator::with_seed(SlotConfig::default(), 7);
        for seed_day in 0..5 {
            let slots = generator.generate(days(seed_day), today(), None, |_| false);
            assert_eq!(slots.len(), 18);
        }
        let window = generator.window();
        assert_eq!(window.first().map(|t| t.to_string()).as_deref(), Some("09:00"));
        assert_eq!(window.last().map(|t| t.to_string()).as_deref(), Some("17:30"));
    }

    #[test]
    fn test_ratio_one_uses_bookings_only() {
        let config = SlotConfig {
            availability_ratio: 1.0,
            ..Default::default()
        };
        let mut generator = SlotGenerator::with_seed(config, 1);
        let booked: SlotTime = "10:30".parse().expect("time");
        let slots = generator.generate(days(1), today(), None, |t| t == booked);

        let unavailable: Vec<_> = slots.iter().filter(|s| !s.available).collect();
        assert_eq!(unavailable.len(), 1);
        assert_eq!(unavailable[0].time, booked);
    }

    #[test]
    fn test_ratio_zero_blocks_everything() {
        let config = SlotConfig {
            availability_ratio: 0.0,
            ..Default::default()
        };
        let mut generator = SlotGenerator::with_seed(config, 1);
        assert!(generator.generate(days(1), today(), None, |_| false).iter().all(|s| !s.available));
    }

    #[test]
    fn test_out_of_horizon_dates_are_empty() {
        let mut generator = SlotGenerator::with_seed(SlotConfig::default(), 3);
        let yesterday = today().pred_opt().expect("yesterday");
        assert!(generator.generate(yesterday, today(), None, |_| false).is_empty());

        let horizon = generator.horizon_end(today());
        assert_eq!(horizon, NaiveDate::from_ymd_opt(2026, 7, 20).expect("date"));
        assert_eq!(generator.generate(horizon, today(), None, |_| false).len(), 18);
        let beyond = horizon.succ_opt().expect("beyond");
        assert!(generator.generate(beyond, today(), None, |_| false).is_empty());
    }

    #[test]
    fn test_schedule_shapes_the_day() {
        let config = SlotConfig {
            availability_ratio: 1.0,
            ..Default::default()
        };
        let mut generator = SlotGenerator::with_seed(config, 5);
        let mut schedule = ScheduleConfig::default();

        // 2026-05-21 is a Thursday
        let thursday = days(1);
        schedule.block_date(thursday);
        assert!(generator.generate(thursday, today(), Some(&schedule), |_| false).is_empty());
        // weekends are off in the default week
        assert!(generator.generate(days(3), today(), Some(&schedule), |_| false).is_empty());

        let friday = days(2);
        schedule.set_special_date(SpecialDate::partial(
            friday,
            SpecialDateKind::Conference,
            DayHours::new("09:00".parse().expect("time"), "10:00".parse().expect("time")),
        ));
        let slots = generator.generate(friday, today(), Some(&schedule), |_| false);
        assert_eq!(slots.len(), 18);
        let closed: Vec<String> = slots
            .iter()
            .filter(|s| !s.available)
            .map(|s| s.time.to_string())
            .collect();
        assert_eq!(closed, ["09:00", "09:30", "13:00", "13:30"]);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let mut a = SlotGenerator::with_seed(SlotConfig::default(), 42);
        let mut b = SlotGenerator::with_seed(SlotConfig::default(), 42);
        assert_eq!(
            a.generate(days(2), today(), None, |_| false),
            b.generate(days(2), today(), None, |_| false)
        );
    }
}
