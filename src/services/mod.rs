//! Service Layer
//!
//! The service layer abstracts the clinic backend and owns the booking rules
//! that need data: slot availability, appointment bookkeeping and phone
//! verification.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ServiceHub                              │
//! │  ┌──────────────────────┐  ┌─────────────────────────────┐  │
//! │  │ dyn ClinicApi        │  │ VerificationService         │  │
//! │  │  MockApi | HttpApi   │  │  (codes, delay, attempts)   │  │
//! │  └──────────────────────┘  └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼ ServiceEvent
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      State Layer                             │
//! │            (BookingWizard, DirectoryState, ...)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod api;
mod appointments;
mod directory;
mod events;
mod http_api;
mod hub;
mod mock_api;
mod slots;
mod verification;

pub use api::*;
pub use appointments::*;
pub use directory::*;
pub use events::*;
pub use http_api::*;
pub use hub::*;
pub use mock_api::*;
pub use slots::*;
pub use verification::*;
