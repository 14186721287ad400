//! AppEntities - Global Store Handles
//!
//! All shared stores are collected here for easy access and management.
//! State is split by concern so each view observes only what it renders.

use std::time::Duration;

use chrono::NaiveDate;
use crossbeam_channel::Receiver;
use tokio::task::JoinHandle;

use crate::constants::{INGEST_BATCH_SIZE, INGEST_INTERVAL_MS};
use crate::domain::config::AppConfig;
use crate::services::ServiceEvent;
use crate::states::{AppointmentsBoard, BookingWizard, DirectoryState, Store};

/// Collection of all store handles
#[derive(Clone)]
pub struct AppEntities {
    /// Patient booking wizard
    pub booking: Store<BookingWizard>,
    /// Admin doctor directory
    pub directory: Store<DirectoryState>,
    /// Admin appointments board
    pub appointments: Store<AppointmentsBoard>,
}

impl AppEntities {
    /// Initialize all stores with default values
    pub fn init(config: &AppConfig, today: NaiveDate) -> Self {
        Self {
            booking: Store::new(BookingWizard::new(today, config.slots.horizon_months)),
            directory: Store::new(DirectoryState::default()),
            appointments: Store::new(AppointmentsBoard::new(today)),
        }
    }

    /// Start the service event ingest loop
    ///
    /// Events are drained in batches so each store notifies once per batch.
    pub fn start_ingest(&self, rx: Receiver<ServiceEvent>) -> JoinHandle<()> {
        let entities = self.clone();
        tracing::info!("Started service event ingest task");
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(INGEST_INTERVAL_MS)).await;

                let batch: Vec<ServiceEvent> = rx.try_iter().take(INGEST_BATCH_SIZE).collect();
                if !batch.is_empty() {
                    entities.apply_batch(&batch);
                }
            }
        })
    }

    /// Apply a batch of service events to every store
    pub fn apply_batch(&self, batch: &[ServiceEvent]) {
        self.booking.update(|wizard, cx| {
            for event in batch {
                wizard.apply_event(event, cx);
            }
        });
        self.directory.update(|state, cx| {
            for event in batch {
                state.apply_event(event, cx);
            }
        });
        self.appointments.update(|state, cx| {
            for event in batch {
                state.apply_event(event, cx);
            }
        });
    }
}
