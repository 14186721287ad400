//! Helper Utilities
//!
//! Common utilities used across the application.

mod bounded;
mod clock;
mod fs;

pub use bounded::*;
pub use clock::*;
pub use fs::*;
