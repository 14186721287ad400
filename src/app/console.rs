//! Console - Command Parsing and Rendering
//!
//! Text front-end for the booking wizard and the admin board. Commands are
//! one line each; views are rendered as plain text in the active locale.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
use crate::domain::doctor::{DayHours, Doctor, DoctorDraft, DoctorId};
use crate::domain::patient::Gender;
use crate::domain::schedule::{ScheduleConfig, SpecialDate};
use crate::domain::slot::SlotTime;
use crate::error::{Error, Result};
use crate::i18n::{Locale, t};
use crate::states::{AppointmentsBoard, BookingStep, BookingWizard, DirectoryState, UIEvent};

/// A parsed console line
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Help,
    Quit,

    // Booking wizard
    Doctors,
    Filter(String),
    Search(String),
    Select(DoctorId),
    Date(NaiveDate),
    Time(SlotTime),
    Patient { first: String, last: String },
    Phone(String),
    Gender(Gender),
    Comment(String),
    SendCode,
    Resend,
    Verify(String),
    Consent(bool),
    Next,
    Back,
    Submit,
    Reset,
    Status,

    // Admin
    Appointments(Option<AppointmentStatus>),
    Mark {
        id: AppointmentId,
        status: AppointmentStatus,
    },
    DoctorList,
    DoctorAdd(DoctorDraft),
    DoctorDelete(DoctorId),
    Schedule(DoctorId),
    Block { doctor: DoctorId, date: NaiveDate },
    Unblock { doctor: DoctorId, date: NaiveDate },
    Absence { doctor: DoctorId, special: SpecialDate },
}

fn required<'a>(arg: &'a str, what: &str) -> Result<&'a str> {
    if arg.is_empty() {
        Err(Error::invalid(format!("{what} is required")))
    } else {
        Ok(arg)
    }
}

fn parse_doctor_id(arg: &str) -> Result<DoctorId> {
    required(arg, "doctor id")?
        .parse::<u32>()
        .map(DoctorId)
        .map_err(|_| Error::invalid(format!("not a doctor id: {arg}")))
}

fn parse_date(arg: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(required(arg, "date")?, "%Y-%m-%d")
        .map_err(|_| Error::invalid(format!("expected YYYY-MM-DD, got {arg}")))
}

/// `<doctor> <date>`
fn parse_doctor_date(arg: &str) -> Result<(DoctorId, NaiveDate)> {
    let (id, date) = arg
        .split_once(char::is_whitespace)
        .ok_or_else(|| Error::invalid("usage: <doctor id> <YYYY-MM-DD>"))?;
    Ok((parse_doctor_id(id)?, parse_date(date.trim())?))
}

/// `<doctor> <date> <kind> [HH:MM-HH:MM]`
fn parse_absence(arg: &str) -> Result<(DoctorId, SpecialDate)> {
    let mut parts = arg.split_whitespace();
    let usage = || Error::invalid("usage: absence <doctor id> <YYYY-MM-DD> <kind> [HH:MM-HH:MM]");
    let doctor = parse_doctor_id(parts.next().ok_or_else(usage)?)?;
    let date = parse_date(parts.next().ok_or_else(usage)?)?;
    let kind = parts.next().ok_or_else(usage)?.parse()?;
    let special = match parts.next() {
        None => SpecialDate::full_day(date, kind),
        Some(range) => {
            let (start, end) = range.split_once('-').ok_or_else(usage)?;
            SpecialDate::partial(date, kind, DayHours::new(start.parse()?, end.parse()?))
        }
    };
    Ok((doctor, special))
}

fn parse_bool(arg: &str) -> Result<bool> {
    match arg.to_ascii_lowercase().as_str() {
        "" | "yes" | "y" | "on" | "true" => Ok(true),
        "no" | "n" | "off" | "false" => Ok(false),
        other => Err(Error::invalid(format!("expected yes or no, got {other}"))),
    }
}

/// `name; specialty; price`
fn parse_draft(arg: &str) -> Result<DoctorDraft> {
    let mut parts = arg.split(';').map(str::trim);
    let name = required(parts.next().unwrap_or_default(), "name")?;
    let specialty = required(parts.next().unwrap_or_default(), "specialty")?;
    let price = match parts.next() {
        Some(p) if !p.is_empty() => p
            .parse::<u32>()
            .map_err(|_| Error::invalid(format!("not a price: {p}")))?,
        _ => 0,
    };
    Ok(DoctorDraft {
        name: name.to_string(),
        specialty: specialty.to_string(),
        price,
        ..DoctorDraft::default()
    })
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, arg) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let arg = arg.trim();

        let command = match name.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "doctors" => Command::Doctors,
            "filter" => Command::Filter(arg.to_string()),
            "search" => Command::Search(arg.to_string()),
            "select" => Command::Select(parse_doctor_id(arg)?),
            "date" => Command::Date(parse_date(arg)?),
            "time" => Command::Time(required(arg, "time")?.parse()?),
            "patient" => {
                let (first, last) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
                Command::Patient {
                    first: required(first, "first name")?.to_string(),
                    last: required(last.trim(), "last name")?.to_string(),
                }
            }
            "phone" => Command::Phone(required(arg, "phone")?.to_string()),
            "gender" => Command::Gender(arg.parse()?),
            "comment" => Command::Comment(arg.to_string()),
            "send-code" => Command::SendCode,
            "resend" => Command::Resend,
            "verify" => Command::Verify(required(arg, "code")?.to_string()),
            "consent" => Command::Consent(parse_bool(arg)?),
            "next" => Command::Next,
            "back" => Command::Back,
            "submit" => Command::Submit,
            "reset" => Command::Reset,
            "status" => Command::Status,
            "appointments" => Command::Appointments(match arg {
                "" | "all" => None,
                s => Some(s.parse()?),
            }),
            "mark" => {
                let (id, status) = arg
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| Error::invalid("usage: mark <id> <status>"))?;
                Command::Mark {
                    id: AppointmentId::from(id),
                    status: status.parse()?,
                }
            }
            "doctor-list" => Command::DoctorList,
            "doctor-add" => Command::DoctorAdd(parse_draft(arg)?),
            "doctor-delete" => Command::DoctorDelete(parse_doctor_id(arg)?),
            "schedule" => Command::Schedule(parse_doctor_id(arg)?),
            "block" => {
                let (doctor, date) = parse_doctor_date(arg)?;
                Command::Block { doctor, date }
            }
            "unblock" => {
                let (doctor, date) = parse_doctor_date(arg)?;
                Command::Unblock { doctor, date }
            }
            "absence" => {
                let (doctor, special) = parse_absence(arg)?;
                Command::Absence { doctor, special }
            }
            other => return Err(Error::invalid(format!("unknown command: {other}"))),
        };
        Ok(command)
    }
}

// ==================== Rendering ====================

pub fn render_help(locale: Locale) -> String {
    [
        format!("{}:", t(locale, "console-help")),
        "  doctors | filter <specialty|all> | search <text> | select <id>".to_string(),
        "  date <YYYY-MM-DD> | time <HH:MM>".to_string(),
        "  patient <first> <last> | phone <number> | gender <m|f> | comment <text>".to_string(),
        "  send-code | resend | verify <code> | consent [yes|no]".to_string(),
        "  next | back | submit | reset | status".to_string(),
        "  appointments [status] | mark <id> <status>".to_string(),
        "  doctor-list | doctor-add <name; specialty; price> | doctor-delete <id>".to_string(),
        "  schedule <id> | block <id> <date> | unblock <id> <date>".to_string(),
        "  absence <id> <date> <holiday|conference|sick-leave|vacation> [HH:MM-HH:MM]".to_string(),
        "  quit".to_string(),
    ]
    .join("\n")
}

fn doctor_line(doctor: &Doctor, selected: bool) -> String {
    let marker = if selected { '>' } else { ' ' };
    format!(
        "{marker} [{}] {} ({}) {} ★{:.1}",
        doctor.id,
        doctor.name,
        doctor.specialty,
        doctor.price_label(),
        doctor.rating
    )
}

/// Current wizard step with the fields it collects
pub fn render_wizard(wizard: &BookingWizard, locale: Locale) -> String {
    let step = wizard.step();
    let mut lines = vec![format!(
        "== {}/4 {} ==",
        (step.index() + 1).min(4),
        t(locale, step.label_key())
    )];

    match step {
        BookingStep::SelectDoctor => {
            let specialty = match wizard.specialty() {
                crate::constants::ALL_SPECIALTIES => t(locale, "specialty-all"),
                s => s.to_string(),
            };
            lines.push(format!("{}: {specialty}", t(locale, "field-specialty")));
            if !wizard.search().is_empty() {
                lines.push(format!("{}: {}", t(locale, "field-search"), wizard.search()));
            }
            for doctor in wizard.filtered_doctors() {
                lines.push(doctor_line(doctor, wizard.doctor_id() == Some(doctor.id)));
            }
        }
        BookingStep::SelectDateTime => {
            if let Some(doctor) = wizard.selected_doctor() {
                lines.push(format!("{}: {}", t(locale, "field-doctor"), doctor.name));
            }
            let date = wizard.date().map(|d| d.to_string()).unwrap_or_default();
            lines.push(format!(
                "{}: {date} ({} .. {})",
                t(locale, "field-date"),
                wizard.today(),
                wizard.horizon_end()
            ));
            if wizard.loading_slots() {
                lines.push(t(locale, "slots-loading"));
            } else if wizard.date().is_some() && wizard.slots().is_empty() {
                lines.push(t(locale, "slots-empty"));
            } else {
                let row: Vec<String> = wizard
                    .slots()
                    .iter()
                    .map(|slot| {
                        if wizard.time() == Some(slot.time) {
                            format!("[{}]", slot.time)
                        } else if slot.available {
                            format!(" {} ", slot.time)
                        } else {
                            " --:-- ".to_string()
                        }
                    })
                    .collect();
                for chunk in row.chunks(6) {
                    lines.push(chunk.join(" "));
                }
            }
        }
        BookingStep::PatientInfo => {
            let patient = wizard.patient();
            let verification = wizard.verification();
            lines.push(format!("{}: {}", t(locale, "field-patient"), patient.full_name()));
            lines.push(format!("{}: {}", t(locale, "field-phone"), patient.phone));
            let gender_key = match patient.gender {
                Gender::Male => "gender-male",
                Gender::Female => "gender-female",
            };
            lines.push(format!("{}: {}", t(locale, "field-gender"), t(locale, gender_key)));
            if !patient.comment.is_empty() {
                lines.push(format!("{}: {}", t(locale, "field-comment"), patient.comment));
            }
            if verification.verified() {
                lines.push(t(locale, "verify-verified"));
            } else if verification.verifying() {
                lines.push(t(locale, "verify-checking"));
            } else if verification.code_sent() {
                if verification.code_invalid() {
                    lines.push(t(locale, "verify-invalid"));
                }
                if verification.can_resend() {
                    lines.push(t(locale, "verify-resend-ready"));
                } else {
                    lines.push(format!(
                        "{} {}s",
                        t(locale, "verify-resend-in"),
                        verification.countdown()
                    ));
                }
            }
        }
        BookingStep::Confirm => {
            if let Some(summary) = wizard.confirmation() {
                lines.push(format!(
                    "{}: {} ({})",
                    t(locale, "field-doctor"),
                    summary.doctor_name,
                    summary.specialty
                ));
                lines.push(format!(
                    "{}: {} {}",
                    t(locale, "field-date"),
                    summary.date,
                    summary.time
                ));
                lines.push(format!("{}: {}", t(locale, "field-patient"), summary.patient_name));
                lines.push(format!("{}: {}", t(locale, "field-phone"), summary.phone));
                lines.push(format!("{}: {}", t(locale, "field-price"), summary.price));
            }
            let mark = if wizard.consent() { 'x' } else { ' ' };
            lines.push(format!("[{mark}] {}", t(locale, "field-consent")));
        }
        BookingStep::Success => {
            if let Some(apt) = wizard.appointment() {
                lines.push(appointment_line(apt, locale));
            }
        }
    }

    if let Some(reason) = wizard.blocking_reason()
        && step != BookingStep::Success
    {
        lines.push(format!("! {}", t(locale, reason.label_key())));
    }
    if let Some(error) = wizard.last_error() {
        lines.push(format!("! {error}"));
    }

    lines.join("\n")
}

fn appointment_line(apt: &Appointment, locale: Locale) -> String {
    format!(
        "{} {} {} | {} | {} | {}",
        apt.id,
        apt.date,
        apt.time,
        apt.patient_name,
        apt.doctor_name,
        t(locale, apt.status.label_key())
    )
}

/// Admin board: stats, today/upcoming/past and recent activity
pub fn render_board(board: &AppointmentsBoard, locale: Locale) -> String {
    let stats = board.stats();
    let mut lines = vec![format!(
        "== {} == total {} | {} {} | {} {} | {} {} | {} {}",
        t(locale, "board-stats"),
        stats.total,
        t(locale, "status-confirmed"),
        stats.confirmed,
        t(locale, "status-pending"),
        stats.pending,
        t(locale, "status-cancelled"),
        stats.cancelled,
        t(locale, "status-completed"),
        stats.completed
    )];

    if board.status_filter().is_some() {
        for apt in board.visible() {
            lines.push(appointment_line(apt, locale));
        }
    } else {
        let partition = board.partition();
        for (key, bucket) in [
            ("board-today", &partition.today),
            ("board-upcoming", &partition.upcoming),
            ("board-past", &partition.past),
        ] {
            lines.push(format!("-- {} ({})", t(locale, key), bucket.len()));
            for apt in bucket {
                lines.push(appointment_line(apt, locale));
            }
        }
    }

    for activity in board.recent_activity().take(5) {
        let mark = if activity.is_error { '!' } else { '*' };
        lines.push(format!("{mark} {} {}", activity.at.format("%H:%M:%S"), activity.message));
    }

    lines.join("\n")
}

pub fn render_directory(directory: &DirectoryState) -> String {
    let selected = directory.selected().map(|d| d.id);
    directory
        .visible()
        .into_iter()
        .map(|d| doctor_line(d, selected == Some(d.id)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Weekly hours, breaks and date exceptions
pub fn render_schedule(schedule: &ScheduleConfig, locale: Locale) -> String {
    let mut lines = vec![format!(
        "{}: {}",
        t(locale, "schedule-weekly-hours"),
        schedule.weekly_work_hours()
    )];
    for day in &schedule.work_days {
        let hours = if day.enabled && !day.work_hours.is_empty() {
            day.work_hours
                .iter()
                .map(|r| format!("{}-{}", r.start, r.end))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            t(locale, "schedule-day-off")
        };
        lines.push(format!("  {:<10} {hours}", format!("{:?}", day.day).to_lowercase()));
    }
    for brk in &schedule.breaks {
        lines.push(format!("  {} {}-{}", brk.name, brk.start, brk.end));
    }
    if !schedule.blocked_dates.is_empty() {
        let dates: Vec<String> = schedule.blocked_dates.iter().map(|d| d.to_string()).collect();
        lines.push(format!("{}: {}", t(locale, "schedule-blocked"), dates.join(", ")));
    }
    for special in &schedule.special_dates {
        let range = match special.time_range {
            Some(r) if !special.is_full_day => format!(" {}-{}", r.start, r.end),
            _ => String::new(),
        };
        lines.push(format!("{} {}{range}", special.date, t(locale, special.kind.label_key())));
    }
    lines.join("\n")
}

/// One-line rendering of a toast; other events print nothing
pub fn render_event(event: &UIEvent, locale: Locale) -> Option<String> {
    match event {
        UIEvent::Toast {
            key,
            detail,
            is_error,
        } => {
            let mark = if *is_error { '!' } else { '*' };
            Some(match detail {
                Some(detail) => format!("{mark} {}: {detail}", t(locale, key)),
                None => format!("{mark} {}", t(locale, key)),
            })
        }
        UIEvent::ErrorOccurred { source, message } => Some(format!("! {source}: {message}")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::seed_doctors;
    use crate::states::Context;

    #[test]
    fn test_parse_commands() {
        assert_eq!("select 3".parse::<Command>().ok(), Some(Command::Select(DoctorId(3))));
        assert_eq!(
            "patient Ivan Petrov".parse::<Command>().ok(),
            Some(Command::Patient {
                first: "Ivan".into(),
                last: "Petrov".into()
            })
        );
        assert_eq!("consent".parse::<Command>().ok(), Some(Command::Consent(true)));
        assert_eq!("consent no".parse::<Command>().ok(), Some(Command::Consent(false)));
        assert_eq!(
            "phone +7 777 123 45 67".parse::<Command>().ok(),
            Some(Command::Phone("+7 777 123 45 67".into()))
        );
        assert_eq!(
            "appointments no-show".parse::<Command>().ok(),
            Some(Command::Appointments(Some(AppointmentStatus::NoShow)))
        );
        assert!(matches!(
            "time 10:30".parse::<Command>(),
            Ok(Command::Time(time)) if time.to_string() == "10:30"
        ));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("select abc".parse::<Command>().is_err());
        assert!("date 20-05-2026".parse::<Command>().is_err());
        assert!("patient Ivan".parse::<Command>().is_err());
        assert!("mark APT-001".parse::<Command>().is_err());
        assert!("fly".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_doctor_draft() {
        let Ok(Command::DoctorAdd(draft)) = "doctor-add Aigerim Sadykova; Dermatologist; 9000".parse()
        else {
            panic!("expected doctor-add");
        };
        assert_eq!(draft.name, "Aigerim Sadykova");
        assert_eq!(draft.specialty, "Dermatologist");
        assert_eq!(draft.price, 9000);
        assert!("doctor-add OnlyName".parse::<Command>().is_err());

        let expected = Command::DoctorAdd(DoctorDraft {
            name: "Test Doc".into(),
            specialty: "Therapist".into(),
            price: 5000,
            ..DoctorDraft::default()
        });
        assert_eq!("doctor-add Test Doc; Therapist; 5000".parse::<Command>().ok(), Some(expected));
        assert_ne!(
            "doctor-add Test Doc; Therapist".parse::<Command>().ok(),
            "doctor-add Test Doc; Therapist; 5000".parse::<Command>().ok()
        );
    }

    #[test]
    fn test_render_doctor_step() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 20).expect("date");
        let mut wizard = BookingWizard::new(today, 3);
        let mut cx = Context::default();
        wizard.set_doctors(seed_doctors().expect("doctors"), &mut cx);
        wizard.select_doctor(DoctorId(3), &mut cx);

        let view = render_wizard(&wizard, Locale::En);
        assert!(view.starts_with("== 1/4 Choose a doctor =="));
        assert!(view.contains("> [3]"));
        assert!(!view.contains("! "));

        let ru = render_wizard(&wizard, Locale::Ru);
        assert!(ru.contains("Выбор врача"));
    }

    #[test]
    fn test_parse_schedule_commands() {
        let date = NaiveDate::from_ymd_opt(2026, 6, 1).expect("date");
        assert_eq!(
            "block 3 2026-06-01".parse::<Command>().ok(),
            Some(Command::Block { doctor: DoctorId(3), date })
        );
        assert_eq!(
            "unblock 3 2026-06-01".parse::<Command>().ok(),
            Some(Command::Unblock { doctor: DoctorId(3), date })
        );
        assert!("block 3".parse::<Command>().is_err());

        let Ok(Command::Absence { doctor, special }) =
            "absence 2 2026-06-01 conference 09:00-12:00".parse::<Command>()
        else {
            panic!("expected absence");
        };
        assert_eq!(doctor, DoctorId(2));
        assert!(!special.is_full_day);
        assert_eq!(special.time_range.map(|r| r.end.to_string()).as_deref(), Some("12:00"));
        assert!("absence 2 2026-06-01 party".parse::<Command>().is_err());
    }

    #[test]
    fn test_render_schedule() {
        let mut schedule = ScheduleConfig::default();
        schedule.block_date(NaiveDate::from_ymd_opt(2026, 6, 1).expect("date"));
        let text = render_schedule(&schedule, Locale::En);
        assert!(text.starts_with("Hours per week: 40"));
        assert!(text.contains("monday     09:00-18:00"));
        assert!(text.contains("sunday     day off"));
        assert!(text.contains("Blocked dates: 2026-06-01"));
    }

    #[test]
    fn test_render_toast() {
        let line = render_event(&UIEvent::error("toast-booking-failed", "timeout"), Locale::En);
        assert_eq!(line.as_deref(), Some("! Booking failed: timeout"));
        assert!(
            render_event(
                &UIEvent::LoadingChanged {
                    loading: true,
                    what: "slots-loading"
                },
                Locale::En
            )
            .is_none()
        );
    }
}
