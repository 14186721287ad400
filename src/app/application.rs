//! Application - Wiring and Console Loop
//!
//! Builds the service hub, stores and controllers, then drives them from
//! stdin until `quit` or end of input.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::console::{
    Command, render_board, render_directory, render_event, render_help, render_schedule, render_wizard,
};
use crate::app::entities::AppEntities;
use crate::constants::INGEST_INTERVAL_MS;
use crate::domain::config::AppConfig;
use crate::domain::schedule::ScheduleConfig;
use crate::error::Result;
use crate::features::appointments::AppointmentsController;
use crate::features::booking::BookingController;
use crate::features::doctors::DoctorsController;
use crate::helpers::today;
use crate::i18n::{Locale, t};
use crate::services::ServiceHub;
use crate::states::{BookingWizard, Store, Subscription, UIEvent};

/// Announce the moment a running countdown lets the code be resent
fn watch_resend(wizard: &Store<BookingWizard>, tx: Sender<String>, locale: Locale) -> Subscription {
    let counting = AtomicBool::new(false);
    wizard.observe(move |w| {
        let v = w.verification();
        let was_counting = counting.swap(v.code_sent() && v.countdown() > 0, Ordering::Relaxed);
        if was_counting && v.can_resend() {
            let _ = tx.send(format!("* {}", t(locale, "verify-resend-ready")));
        }
    })
}

/// Everything one console session talks to
struct Session {
    locale: Locale,
    entities: AppEntities,
    booking: BookingController,
    doctors: DoctorsController,
    appointments: AppointmentsController,
    toasts: Vec<Receiver<UIEvent>>,
    notices: Receiver<String>,
    _resend_watch: Subscription,
}

impl Session {
    fn new(config: &AppConfig, hub: ServiceHub, entities: AppEntities) -> Self {
        let locale = Locale::resolve(config.locale.as_deref());
        let toasts = vec![
            entities.booking.subscribe_events(),
            entities.directory.subscribe_events(),
            entities.appointments.subscribe_events(),
        ];
        let (tx, notices) = crossbeam_channel::unbounded();
        let resend_watch = watch_resend(&entities.booking, tx, locale);
        Self {
            locale,
            booking: BookingController::new(hub.clone(), entities.booking.clone()),
            doctors: DoctorsController::new(hub.clone(), entities.directory.clone()),
            appointments: AppointmentsController::new(hub, entities.appointments.clone()),
            entities,
            toasts,
            notices,
            _resend_watch: resend_watch,
        }
    }

    fn wizard_view(&self) -> String {
        self.entities
            .booking
            .read(|wizard| render_wizard(wizard, self.locale))
    }

    fn board_view(&self) -> String {
        self.entities
            .appointments
            .read(|board| render_board(board, self.locale))
    }

    fn directory_view(&self) -> String {
        self.entities.directory.read(render_directory)
    }

    fn schedule_view(&self, result: Result<ScheduleConfig>) -> String {
        match result {
            Ok(schedule) => render_schedule(&schedule, self.locale),
            Err(e) => format!("! {e}"),
        }
    }

    /// Admin stores are fed by the ingest loop; give it one cycle
    async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(INGEST_INTERVAL_MS * 2)).await;
    }

    fn print_toasts(&self) {
        for rx in &self.toasts {
            for event in rx.try_iter() {
                if let Some(line) = render_event(&event, self.locale) {
                    println!("{line}");
                }
            }
        }
        for line in self.notices.try_iter() {
            println!("{line}");
        }
    }

    /// Run one command; returns the text to print
    async fn execute(&self, command: Command) -> Option<String> {
        let booking = &self.booking;
        match command {
            Command::Help => return Some(render_help(self.locale)),
            Command::Quit => return None,

            Command::Doctors => {
                // failure already surfaced as a toast
                let _ = booking.load_doctors().await;
            }
            Command::Filter(specialty) => booking.set_specialty(&specialty),
            Command::Search(query) => booking.set_search(&query),
            Command::Select(id) => {
                booking.select_doctor(id);
            }
            Command::Date(date) => booking.set_date(date).await,
            Command::Time(time) => {
                booking.select_time(time);
            }
            Command::Patient { first, last } => booking.set_name(&first, &last),
            Command::Phone(phone) => booking.set_phone(&phone),
            Command::Gender(gender) => booking.set_gender(gender),
            Command::Comment(comment) => booking.set_comment(&comment),
            Command::SendCode | Command::Resend => {
                booking.send_code().await;
            }
            Command::Verify(code) => {
                booking.verify(&code).await;
            }
            Command::Consent(consent) => booking.set_consent(consent),
            Command::Next => {
                if !booking.advance() {
                    return Some(format!("! {}", t(self.locale, "console-blocked")));
                }
            }
            Command::Back => {
                booking.retreat();
            }
            Command::Submit => {
                booking.submit().await;
            }
            Command::Reset => booking.reset(),
            Command::Status => {}

            Command::Appointments(filter) => {
                self.appointments.set_filter(filter);
                let _ = self.appointments.load().await;
                self.settle().await;
                return Some(self.board_view());
            }
            Command::Mark { id, status } => {
                if let Err(e) = self.appointments.set_status(&id, status).await {
                    return Some(format!("! {e}"));
                }
                self.settle().await;
                return Some(self.board_view());
            }
            Command::DoctorList => {
                let _ = self.doctors.load().await;
                self.settle().await;
                return Some(self.directory_view());
            }
            Command::DoctorAdd(draft) => match self.doctors.create(draft).await {
                Ok(doctor) => {
                    self.settle().await;
                    return Some(format!("* [{}] {}", doctor.id, doctor.name));
                }
                Err(e) => return Some(format!("! {e}")),
            },
            Command::DoctorDelete(id) => {
                if let Err(e) = self.doctors.delete(id).await {
                    return Some(format!("! {e}"));
                }
                self.settle().await;
                return Some(self.directory_view());
            }
            Command::Schedule(id) => {
                return Some(self.schedule_view(self.doctors.load_schedule(id).await));
            }
            Command::Block { doctor, date } => {
                return Some(self.schedule_view(self.doctors.block_date(doctor, date).await));
            }
            Command::Unblock { doctor, date } => {
                return Some(self.schedule_view(self.doctors.unblock_date(doctor, date).await));
            }
            Command::Absence { doctor, special } => {
                return Some(self.schedule_view(self.doctors.add_special_date(doctor, special).await));
            }
        }
        Some(self.wizard_view())
    }
}

/// Run the clinic booking console
pub async fn run_app(config: AppConfig) -> Result<()> {
    let hub = ServiceHub::from_config(&config)?;
    let entities = AppEntities::init(&config, today());
    let ingest = entities.start_ingest(hub.events());
    let session = Session::new(&config, hub, entities);

    println!("{}", t(session.locale, "app-title"));
    if let Err(e) = session.booking.load_doctors().await {
        tracing::warn!(error = %e, "Initial doctor load failed");
    }
    if let Err(e) = session.appointments.load().await {
        tracing::warn!(error = %e, "Initial appointment load failed");
    }
    session.print_toasts();
    println!("{}", session.wizard_view());
    println!("{}", render_help(session.locale));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("! {}: {e}", t(session.locale, "console-unknown"));
                continue;
            }
        };
        tracing::debug!(?command, "Console command");

        let output = session.execute(command).await;
        session.print_toasts();
        match output {
            Some(text) => println!("{text}"),
            None => break,
        }
    }

    ingest.abort();
    println!("{}", t(session.locale, "console-bye"));
    Ok(())
}
