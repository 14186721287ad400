//! Appointments Controller
//!
//! Admin actions on bookings: loading the board and moving appointments
//! through their lifecycle.

use crate::domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
use crate::error::Result;
use crate::helpers::today;
use crate::services::ServiceHub;
use crate::states::{AppointmentsBoard, Store};

/// Appointments board controller
pub struct AppointmentsController {
    hub: ServiceHub,
    board: Store<AppointmentsBoard>,
}

impl AppointmentsController {
    pub fn new(hub: ServiceHub, board: Store<AppointmentsBoard>) -> Self {
        Self { hub, board }
    }

    pub fn board(&self) -> &Store<AppointmentsBoard> {
        &self.board
    }

    /// Reload all appointments; also rolls the board over to the current day
    pub async fn load(&self) -> Result<()> {
        self.board.update(|board, cx| {
            board.set_today(today(), cx);
            board.set_loading(true, cx);
        });
        let result = self.hub.fetch_appointments().await;
        if result.is_err() {
            self.board.update(|board, cx| board.set_loading(false, cx));
        }
        result.map(|_| ())
    }

    pub async fn set_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let appointment = self.hub.update_appointment_status(id, status).await?;
        tracing::info!(appointment_id = %id, status = ?status, "Appointment status changed");
        Ok(appointment)
    }

    pub async fn confirm(&self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::Confirmed).await
    }

    pub async fn cancel(&self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::Cancelled).await
    }

    pub async fn complete(&self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::Completed).await
    }

    pub async fn mark_no_show(&self, id: &AppointmentId) -> Result<Appointment> {
        self.set_status(id, AppointmentStatus::NoShow).await
    }

    pub fn set_filter(&self, status: Option<AppointmentStatus>) {
        self.board
            .update(|board, cx| board.set_status_filter(status, cx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::services::ServiceEvent;

    fn controller() -> AppointmentsController {
        let hub = ServiceHub::from_config(&AppConfig::default()).expect("hub");
        AppointmentsController::new(hub, Store::new(AppointmentsBoard::new(today())))
    }

    fn drain(ctl: &AppointmentsController) {
        let batch: Vec<ServiceEvent> = ctl.hub.events().try_iter().collect();
        ctl.board.update(|board, cx| {
            for event in &batch {
                board.apply_event(event, cx);
            }
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_fills_board() {
        let ctl = controller();
        ctl.load().await.expect("load");
        drain(&ctl);

        let (total, today_count, loading) = ctl
            .board()
            .read(|b| (b.stats().total, b.partition().today.len(), b.loading()));
        assert_eq!(total, 4);
        assert_eq!(today_count, 3);
        assert!(!loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_transitions() {
        let ctl = controller();
        ctl.load().await.expect("load");
        drain(&ctl);

        let id = ctl
            .board()
            .read(|b| {
                b.all()
                    .iter()
                    .find(|a| a.status == AppointmentStatus::Pending)
                    .map(|a| a.id.clone())
            })
            .expect("pending appointment");

        let confirmed = ctl.confirm(&id).await.expect("confirm");
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
        let done = ctl.complete(&id).await.expect("complete");
        assert_eq!(done.status, AppointmentStatus::Completed);

        // completed is final
        assert!(ctl.cancel(&id).await.is_err());

        drain(&ctl);
        ctl.set_filter(Some(AppointmentStatus::Completed));
        let visible = ctl.board().read(|b| b.visible().len());
        assert!(visible >= 1);
        let logged = ctl.board().read(|b| b.recent_activity().any(|a| a.is_error));
        assert!(logged);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_appointment() {
        let ctl = controller();
        let missing = AppointmentId::from("APT-999");
        assert!(ctl.mark_no_show(&missing).await.is_err());
    }
}
