//! State Management Layer
//!
//! Explicit state holders wrapped in a reactive [`Store`].
//! Follows a unidirectional data flow pattern:
//!
//! ```text
//! User Action → Controller → Store::update → spawn Service Call → result → Store::update → notify → View Refresh
//! ```

mod appointments;
mod booking;
mod directory;
pub mod store;
mod ui_event;
mod verification;

pub use appointments::*;
pub use booking::*;
pub use directory::*;
pub use store::{Context, Store, Subscription};
pub use ui_event::*;
pub use verification::*;
