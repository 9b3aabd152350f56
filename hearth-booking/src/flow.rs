use crate::availability::conflicts_with_any;
use crate::models::{Reservation, ReservationRepository, StayRange};
use crate::pricing::Quote;
use crate::BookingError;
use chrono::NaiveDate;
use hearth_core::CoreError;
use tracing::info;
use uuid::Uuid;

/// One booking attempt. `Confirmed` is terminal; `Rejected` is terminal for
/// the attempt, and the next date click starts a fresh one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    SelectingDates,
    SelectingGuests,
    Submitting,
    Confirmed { reservation_id: Uuid },
    Rejected { reason: String },
}

impl BookingState {
    fn name(&self) -> &'static str {
        match self {
            BookingState::SelectingDates => "SELECTING_DATES",
            BookingState::SelectingGuests => "SELECTING_GUESTS",
            BookingState::Submitting => "SUBMITTING",
            BookingState::Confirmed { .. } => "CONFIRMED",
            BookingState::Rejected { .. } => "REJECTED",
        }
    }
}

/// Orchestrates date selection, guest bounds, pricing, and submission for a
/// single listing. Existing reservations are captured at construction,
/// already filtered to the ones that block availability.
#[derive(Debug)]
pub struct BookingFlow {
    listing_id: Uuid,
    price_per_night_cents: i64,
    max_guests: u32,
    fee_rate: f64,
    today: NaiveDate,
    existing: Vec<StayRange>,
    check_in: Option<NaiveDate>,
    check_out: Option<NaiveDate>,
    guests: u32,
    state: BookingState,
}

impl BookingFlow {
    pub fn new(
        listing_id: Uuid,
        price_per_night_cents: i64,
        max_guests: u32,
        fee_rate: f64,
        existing: Vec<StayRange>,
        today: NaiveDate,
    ) -> Self {
        Self {
            listing_id,
            price_per_night_cents,
            max_guests: max_guests.max(1),
            fee_rate,
            today,
            existing,
            check_in: None,
            check_out: None,
            guests: 1,
            state: BookingState::SelectingDates,
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn listing_id(&self) -> Uuid {
        self.listing_id
    }

    pub fn guests(&self) -> u32 {
        self.guests
    }

    pub fn selected_stay(&self) -> Option<StayRange> {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => StayRange::new(check_in, check_out).ok(),
            _ => None,
        }
    }

    /// Price breakdown for the selected range, once complete.
    pub fn quote(&self) -> Option<Quote> {
        self.selected_stay()
            .map(|stay| Quote::compute(&stay, self.price_per_night_cents, self.fee_rate))
    }

    /// Handle a calendar click. Clicks on past days are ignored. A click
    /// either starts a new candidate range, restarts it earlier, or
    /// completes it; completion runs the availability check and on conflict
    /// the flow stays in `SelectingDates` with the error surfaced.
    pub fn select_day(&mut self, day: NaiveDate) -> Result<(), BookingError> {
        match self.state {
            BookingState::SelectingDates | BookingState::SelectingGuests => {}
            // A rejected attempt restarts from date selection.
            BookingState::Rejected { .. } => {
                self.check_in = None;
                self.check_out = None;
                self.state = BookingState::SelectingDates;
            }
            _ => {
                return Err(BookingError::InvalidState {
                    state: self.state.name(),
                })
            }
        }

        if day < self.today {
            return Ok(());
        }

        match (self.check_in, self.check_out) {
            (None, _) | (Some(_), Some(_)) => {
                self.check_in = Some(day);
                self.check_out = None;
                self.state = BookingState::SelectingDates;
                Ok(())
            }
            (Some(check_in), None) => {
                if day < check_in {
                    self.check_in = Some(day);
                    return Ok(());
                }

                let candidate = StayRange::new(check_in, day)?;
                if conflicts_with_any(&candidate, &self.existing) {
                    return Err(BookingError::DatesUnavailable);
                }

                self.check_out = Some(day);
                self.state = BookingState::SelectingGuests;
                Ok(())
            }
        }
    }

    pub fn add_guest(&mut self) {
        if self.guests < self.max_guests {
            self.guests += 1;
        }
    }

    pub fn remove_guest(&mut self) {
        if self.guests > 1 {
            self.guests -= 1;
        }
    }

    /// Submit the attempt. Availability is re-checked locally first (the
    /// reservation set may be stale), the guest count is clamped, and the
    /// insert goes to the backend, which has the final say on races.
    pub async fn submit(
        &mut self,
        repo: &dyn ReservationRepository,
        guest_user_id: Uuid,
    ) -> Result<Uuid, BookingError> {
        match self.state {
            BookingState::SelectingDates | BookingState::SelectingGuests => {}
            _ => {
                return Err(BookingError::InvalidState {
                    state: self.state.name(),
                })
            }
        }

        let stay = self.selected_stay().ok_or(BookingError::IncompleteSelection)?;

        if conflicts_with_any(&stay, &self.existing) {
            self.state = BookingState::SelectingDates;
            return Err(BookingError::DatesUnavailable);
        }

        self.state = BookingState::Submitting;
        let guests = self.guests.clamp(1, self.max_guests);
        let quote = Quote::compute(&stay, self.price_per_night_cents, self.fee_rate);
        let reservation = Reservation::new(
            self.listing_id,
            guest_user_id,
            stay,
            guests,
            quote.total_cents,
        );

        match repo.create_reservation(&reservation).await {
            Ok(reservation_id) => {
                info!("Reservation confirmed: {}", reservation_id);
                self.existing.push(stay);
                self.state = BookingState::Confirmed { reservation_id };
                Ok(reservation_id)
            }
            Err(CoreError::RemoteRejection(reason)) => {
                self.state = BookingState::Rejected {
                    reason: reason.clone(),
                };
                Err(BookingError::Rejected(reason))
            }
            Err(other) => {
                // Transient failures leave the attempt intact; the user
                // re-triggers submission.
                self.state = BookingState::SelectingGuests;
                Err(BookingError::Gateway(other))
            }
        }
    }
}
