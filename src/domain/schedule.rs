//! Schedule - Weekly Working Schedule of a Doctor
//!
//! Weekly hours and recurring breaks, plus one-off exceptions: blocked dates
//! close the whole day, special dates close all of it or a time range.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::doctor::{Day, DayHours};
use crate::domain::slot::SlotTime;
use crate::error::{Error, Result};

const WEEK: [Day; 7] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
    Day::Sunday,
];

fn is_weekday(day: Day) -> bool {
    !matches!(day, Day::Saturday | Day::Sunday)
}

fn hm(hour: u32, minute: u32) -> SlotTime {
    // Template literals are always in range
    SlotTime::from_minutes(hour * 60 + minute).unwrap_or(SlotTime::MIDNIGHT)
}

/// Working ranges for a single weekday
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day: Day,
    pub enabled: bool,
    pub work_hours: Vec<DayHours>,
}

/// A recurring break subtracted from working time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakTime {
    pub name: String,
    pub start: SlotTime,
    pub end: SlotTime,
    pub apply_to_days: Vec<Day>,
}

impl BreakTime {
    pub fn minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    fn covers(&self, day: Day, time: SlotTime) -> bool {
        self.apply_to_days.contains(&day) && self.start <= time && time < self.end
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecialDateKind {
    Holiday,
    Conference,
    SickLeave,
    Vacation,
}

impl SpecialDateKind {
    pub fn label_key(self) -> &'static str {
        match self {
            SpecialDateKind::Holiday => "special-holiday",
            SpecialDateKind::Conference => "special-conference",
            SpecialDateKind::SickLeave => "special-sick-leave",
            SpecialDateKind::Vacation => "special-vacation",
        }
    }
}

impl std::str::FromStr for SpecialDateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "holiday" => Ok(SpecialDateKind::Holiday),
            "conference" => Ok(SpecialDateKind::Conference),
            "sick-leave" | "sick" => Ok(SpecialDateKind::SickLeave),
            "vacation" => Ok(SpecialDateKind::Vacation),
            other => Err(Error::invalid(format!("unknown special date type: {other}"))),
        }
    }
}

/// One-off absence on a single date
///
/// A partial day closes only `time_range`; without a range it behaves like a
/// full day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialDate {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: SpecialDateKind,
    #[serde(default)]
    pub description: String,
    pub is_full_day: bool,
    #[serde(default)]
    pub time_range: Option<DayHours>,
}

impl SpecialDate {
    pub fn full_day(date: NaiveDate, kind: SpecialDateKind) -> Self {
        Self {
            date,
            kind,
            description: String::new(),
            is_full_day: true,
            time_range: None,
        }
    }

    pub fn partial(date: NaiveDate, kind: SpecialDateKind, range: DayHours) -> Self {
        Self {
            date,
            kind,
            description: String::new(),
            is_full_day: false,
            time_range: Some(range),
        }
    }

    fn closes_day(&self) -> bool {
        self.is_full_day || self.time_range.is_none()
    }
}

/// Predefined weekday schedules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleTemplate {
    /// 09:00-18:00, break 13:00-14:00
    Standard,
    /// 08:00-20:00, break 13:00-14:00
    Extended,
    /// 07:00-14:00, break 11:00-11:30
    Morning,
    /// 14:00-21:00, break 17:00-17:30
    Evening,
}

impl ScheduleTemplate {
    fn hours(self) -> (DayHours, DayHours) {
        let (work, brk) = match self {
            ScheduleTemplate::Standard => ((9, 0, 18, 0), (13, 0, 14, 0)),
            ScheduleTemplate::Extended => ((8, 0, 20, 0), (13, 0, 14, 0)),
            ScheduleTemplate::Morning => ((7, 0, 14, 0), (11, 0, 11, 30)),
            ScheduleTemplate::Evening => ((14, 0, 21, 0), (17, 0, 17, 30)),
        };
        (
            DayHours::new(hm(work.0, work.1), hm(work.2, work.3)),
            DayHours::new(hm(brk.0, brk.1), hm(brk.2, brk.3)),
        )
    }
}

/// Weekly schedule edited by clinic administrators
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    /// Slot length in minutes (15, 30, 45 or 60)
    pub slot_duration: u32,
    pub work_days: Vec<DaySchedule>,
    pub breaks: Vec<BreakTime>,
    /// Sorted, no duplicates
    #[serde(default)]
    pub blocked_dates: Vec<NaiveDate>,
    /// At most one entry per date
    #[serde(default)]
    pub special_dates: Vec<SpecialDate>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        let work_days = WEEK
            .iter()
            .map(|&day| DaySchedule {
                day,
                enabled: is_weekday(day),
                work_hours: if is_weekday(day) {
                    vec![DayHours::new(hm(9, 0), hm(18, 0))]
                } else {
                    Vec::new()
                },
            })
            .collect();

        Self {
            slot_duration: 30,
            work_days,
            breaks: vec![BreakTime {
                name: "Lunch".to_string(),
                start: hm(13, 0),
                end: hm(14, 0),
                apply_to_days: WEEK.iter().copied().filter(|d| is_weekday(*d)).collect(),
            }],
            blocked_dates: Vec::new(),
            special_dates: Vec::new(),
        }
    }
}

impl ScheduleConfig {
    pub fn day(&self, day: Day) -> Option<&DaySchedule> {
        self.work_days.iter().find(|d| d.day == day)
    }

    fn day_mut(&mut self, day: Day) -> Option<&mut DaySchedule> {
        self.work_days.iter_mut().find(|d| d.day == day)
    }

    /// Apply a template to Monday-Friday and the first break
    pub fn apply_template(&mut self, template: ScheduleTemplate) {
        let (work, brk) = template.hours();
        for day in WEEK.iter().copied().filter(|d| is_weekday(*d)) {
            if let Some(schedule) = self.day_mut(day) {
                schedule.enabled = true;
                schedule.work_hours = vec![work];
            }
        }
        if let Some(first) = self.breaks.first_mut() {
            first.start = brk.start;
            first.end = brk.end;
        }
    }

    /// Copy Monday's ranges to Tuesday-Friday
    pub fn copy_monday_to_weekdays(&mut self) {
        let Some(monday) = self.day(Day::Monday).cloned() else {
            return;
        };
        for day in [Day::Tuesday, Day::Wednesday, Day::Thursday, Day::Friday] {
            if let Some(schedule) = self.day_mut(day) {
                schedule.enabled = monday.enabled;
                schedule.work_hours = monday.work_hours.clone();
            }
        }
    }

    /// Reject slot lengths off the 15-minute grid and inverted ranges
    pub fn validate(&self) -> Result<()> {
        if ![15, 30, 45, 60].contains(&self.slot_duration) {
            return Err(Error::invalid(format!(
                "slot duration must be 15, 30, 45 or 60 minutes, got {}",
                self.slot_duration
            )));
        }
        for day in &self.work_days {
            if day.work_hours.iter().any(|r| r.start >= r.end) {
                return Err(Error::invalid(format!("{:?}: work range ends before it starts", day.day)));
            }
        }
        if let Some(b) = self.breaks.iter().find(|b| b.start >= b.end) {
            return Err(Error::invalid(format!("break '{}' ends before it starts", b.name)));
        }
        for special in &self.special_dates {
            if special.time_range.is_some_and(|r| r.start >= r.end) {
                return Err(Error::invalid(format!("{}: time range ends before it starts", special.date)));
            }
        }
        Ok(())
    }

    // ==================== Date exceptions ====================

    /// Close a whole date; returns false if it was already blocked
    pub fn block_date(&mut self, date: NaiveDate) -> bool {
        match self.blocked_dates.binary_search(&date) {
            Ok(_) => false,
            Err(pos) => {
                self.blocked_dates.insert(pos, date);
                true
            }
        }
    }

    pub fn unblock_date(&mut self, date: NaiveDate) -> bool {
        let before = self.blocked_dates.len();
        self.blocked_dates.retain(|d| *d != date);
        self.blocked_dates.len() != before
    }

    /// Add a special date, replacing any entry for the same date
    pub fn set_special_date(&mut self, special: SpecialDate) {
        self.special_dates.retain(|s| s.date != special.date);
        self.special_dates.push(special);
        self.special_dates.sort_by_key(|s| s.date);
    }

    pub fn remove_special_date(&mut self, date: NaiveDate) -> bool {
        let before = self.special_dates.len();
        self.special_dates.retain(|s| s.date != date);
        self.special_dates.len() != before
    }

    pub fn special_date(&self, date: NaiveDate) -> Option<&SpecialDate> {
        self.special_dates.iter().find(|s| s.date == date)
    }

    /// No appointments at all on `date`
    pub fn is_day_off(&self, date: NaiveDate) -> bool {
        if self.blocked_dates.binary_search(&date).is_ok() {
            return true;
        }
        if self.special_date(date).is_some_and(SpecialDate::closes_day) {
            return true;
        }
        !self
            .day(Day::from(date.weekday()))
            .is_some_and(|d| d.enabled && !d.work_hours.is_empty())
    }

    /// Whether a slot starting at `time` on `date` is inside working time
    pub fn is_open_at(&self, date: NaiveDate, time: SlotTime) -> bool {
        if self.is_day_off(date) {
            return false;
        }
        let day = Day::from(date.weekday());
        let working = self
            .day(day)
            .is_some_and(|d| d.work_hours.iter().any(|r| r.contains(time)));
        let on_break = self.breaks.iter().any(|b| b.covers(day, time));
        let away = self
            .special_date(date)
            .and_then(|s| s.time_range)
            .is_some_and(|r| r.contains(time));
        working && !on_break && !away
    }

    /// Total weekly working hours, breaks excluded, rounded to the nearest hour
    pub fn weekly_work_hours(&self) -> u32 {
        let mut total: i64 = 0;
        for day in self.work_days.iter().filter(|d| d.enabled) {
            total += day.work_hours.iter().map(|r| r.minutes() as i64).sum::<i64>();
            total -= self
                .breaks
                .iter()
                .filter(|b| b.apply_to_days.contains(&day.day))
                .map(|b| b.minutes() as i64)
                .sum::<i64>();
        }
        (total.max(0) as f64 / 60.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_week_is_forty_hours() {
        let schedule = ScheduleConfig::default();
        assert_eq!(schedule.weekly_work_hours(), 40);
        assert!(!schedule.day(Day::Sunday).map(|d| d.enabled).unwrap_or(true));
    }

    #[test]
    fn test_extended_template() {
        let mut schedule = ScheduleConfig::default();
        schedule.apply_template(ScheduleTemplate::Extended);
        // 5 x (12h - 1h)
        assert_eq!(schedule.weekly_work_hours(), 55);
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    #[test]
    fn test_blocked_and_special_dates_close_days() {
        let mut schedule = ScheduleConfig::default();
        // 2026-05-20 is a Wednesday, 2026-05-23 a Saturday
        let wednesday = date("2026-05-20");
        assert!(!schedule.is_day_off(wednesday));
        assert!(schedule.is_day_off(date("2026-05-23")));

        assert!(schedule.block_date(wednesday));
        assert!(!schedule.block_date(wednesday));
        assert!(schedule.is_day_off(wednesday));
        assert!(!schedule.is_open_at(wednesday, hm(10, 0)));
        assert!(schedule.unblock_date(wednesday));

        let thursday = date("2026-05-21");
        schedule.set_special_date(SpecialDate::full_day(thursday, SpecialDateKind::Vacation));
        assert!(schedule.is_day_off(thursday));
        assert_eq!(schedule.special_dates.len(), 1);
        assert!(schedule.remove_special_date(thursday));
        assert!(!schedule.is_day_off(thursday));
    }

    #[test]
    fn test_partial_special_date_closes_range() {
        let mut schedule = ScheduleConfig::default();
        let friday = date("2026-05-22");
        schedule.set_special_date(SpecialDate::partial(
            friday,
            SpecialDateKind::Conference,
            DayHours::new(hm(9, 0), hm(11, 0)),
        ));

        assert!(!schedule.is_day_off(friday));
        assert!(!schedule.is_open_at(friday, hm(9, 0)));
        assert!(!schedule.is_open_at(friday, hm(10, 30)));
        assert!(schedule.is_open_at(friday, hm(11, 0)));
        // lunch break and end of day still apply
        assert!(!schedule.is_open_at(friday, hm(13, 30)));
        assert!(!schedule.is_open_at(friday, hm(18, 0)));
        assert!(schedule.is_open_at(friday, hm(17, 30)));
    }

    #[test]
    fn test_schedule_json_shape() {
        let mut schedule = ScheduleConfig::default();
        schedule.block_date(date("2026-06-01"));
        schedule.set_special_date(SpecialDate::full_day(date("2026-06-12"), SpecialDateKind::SickLeave));

        let json = serde_json::to_value(&schedule).expect("json");
        assert_eq!(json["slotDuration"], 30);
        assert_eq!(json["blockedDates"][0], "2026-06-01");
        assert_eq!(json["specialDates"][0]["type"], "sick-leave");
        assert_eq!(json["specialDates"][0]["isFullDay"], true);

        let back: ScheduleConfig = serde_json::from_value(json).expect("schedule");
        assert_eq!(back, schedule);
        assert_eq!("sick_leave".parse::<SpecialDateKind>().ok(), Some(SpecialDateKind::SickLeave));
    }

    #[test]
    fn test_validate() {
        let mut schedule = ScheduleConfig::default();
        assert!(schedule.validate().is_ok());
        schedule.slot_duration = 20;
        assert!(schedule.validate().is_err());

        schedule.slot_duration = 45;
        schedule.set_special_date(SpecialDate::partial(
            date("2026-05-22"),
            SpecialDateKind::Holiday,
            DayHours::new(hm(12, 0), hm(11, 0)),
        ));
        assert!(schedule.validate().is_err());
    }

    #[test]
    fn test_copy_monday() {
        let mut schedule = ScheduleConfig::default();
        if let Some(monday) = schedule.day_mut(Day::Monday) {
            monday.work_hours = vec![DayHours::new(hm(10, 0), hm(14, 0))];
        }
        schedule.copy_monday_to_weekdays();
        let friday = schedule.day(Day::Friday).expect("friday");
        assert_eq!(friday.work_hours[0].start.to_string(), "10:00");
        // 5 x (4h - 1h)
        assert_eq!(schedule.weekly_work_hours(), 15);
    }
}
