pub mod availability;
pub mod flow;
pub mod models;
pub mod pricing;

pub use flow::{BookingFlow, BookingState};
pub use models::{Reservation, ReservationRepository, ReservationStatus, StayRange};
pub use pricing::Quote;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid date range: check-in {check_in} must be before check-out {check_out}")]
    InvalidRange {
        check_in: chrono::NaiveDate,
        check_out: chrono::NaiveDate,
    },

    #[error("Selected dates overlap with an existing reservation")]
    DatesUnavailable,

    #[error("Please select check-in and check-out dates")]
    IncompleteSelection,

    #[error("Invalid action in state {state}")]
    InvalidState { state: &'static str },

    #[error("Reservation rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Gateway(#[from] hearth_core::CoreError),
}
