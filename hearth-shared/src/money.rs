/// Prices travel through the system as integer minor units (cents).
/// Formatting to two decimal places happens only at display boundaries.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Round a fractional amount of cents to the nearest whole cent.
pub fn round_cents(amount: f64) -> i64 {
    amount.round() as i64
}
