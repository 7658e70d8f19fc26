//! Reservation creation: lookups, capacity, pricing and the workflow that
//! ties them together in one transaction.

pub mod error;
pub mod ledger;
pub mod lookup;
pub mod orchestrator;
pub mod pricing;

pub use error::{ErrorKind, ReservationError};
pub use orchestrator::{ReservationService, Stage};
