use crate::models::StayRange;
use hearth_shared::money::round_cents;
use serde::{Deserialize, Serialize};

/// Flat service fee applied to every booking.
pub const DEFAULT_SERVICE_FEE_RATE: f64 = 0.15;

/// Price breakdown for a stay, in minor units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub nights: i64,
    pub subtotal_cents: i64,
    pub service_fee_cents: i64,
    pub total_cents: i64,
}

impl Quote {
    /// `subtotal = nights * nightly rate`; the fee is rounded to the nearest
    /// cent before being added, so the total is exact in minor units.
    pub fn compute(stay: &StayRange, price_per_night_cents: i64, fee_rate: f64) -> Self {
        let nights = stay.nights();
        let subtotal_cents = nights * price_per_night_cents;
        let service_fee_cents = round_cents(subtotal_cents as f64 * fee_rate);

        Self {
            nights,
            subtotal_cents,
            service_fee_cents,
            total_cents: subtotal_cents + service_fee_cents,
        }
    }
}
