use crate::BookingError;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use hearth_core::CoreResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A half-open stay interval `[check_in, check_out)`. Whole-day boundaries;
/// time of day is irrelevant. Construction rejects empty or inverted ranges
/// before any availability logic runs; decoding goes through the same check,
/// so a corrupt backend row cannot produce an inverted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStayRange")]
pub struct StayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Debug, Deserialize)]
struct RawStayRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl TryFrom<RawStayRange> for StayRange {
    type Error = BookingError;

    fn try_from(raw: RawStayRange) -> Result<Self, Self::Error> {
        StayRange::new(raw.check_in, raw.check_out)
    }
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, BookingError> {
        if check_in >= check_out {
            return Err(BookingError::InvalidRange {
                check_in,
                check_out,
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// The individual nights of the stay: check-in day up to but excluding
    /// the check-out day.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days = Vec::with_capacity(self.nights() as usize);
        let mut current = self.check_in;
        while current < self.check_out {
            days.push(current);
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }
}

/// All calendar days blocked by a set of stays, for disabling in a date
/// picker.
pub fn blocked_dates(ranges: &[StayRange]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = ranges.iter().flat_map(|r| r.days()).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// Reservation lifecycle. Completion and cancellation happen outside this
/// engine; only `Cancelled` frees the dates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn blocks_availability(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

/// A booking of a listing for a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub guest_user_id: Uuid,
    pub stay: StayRange,
    pub guests: u32,
    pub total_price_cents: i64,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        listing_id: Uuid,
        guest_user_id: Uuid,
        stay: StayRange,
        guests: u32,
        total_price_cents: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            guest_user_id,
            stay,
            guests,
            total_price_cents,
            status: ReservationStatus::Confirmed,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for reservation data access.
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Insert a reservation; the backend re-validates overlap and may reject
    /// a race with `RemoteRejection`.
    async fn create_reservation(&self, reservation: &Reservation) -> CoreResult<Uuid>;

    async fn get_reservation(&self, id: Uuid) -> CoreResult<Option<Reservation>>;

    /// Non-cancelled reservations for a listing; the input to availability
    /// checks.
    async fn list_blocking_for_listing(&self, listing_id: Uuid) -> CoreResult<Vec<Reservation>>;

    async fn list_for_guest(&self, guest_user_id: Uuid) -> CoreResult<Vec<Reservation>>;
}
