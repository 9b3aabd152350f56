use crate::models::StayRange;

/// Whether two stays conflict.
///
/// Plain half-open semantics would be `s1 < e2 && s2 < e1`, allowing
/// back-to-back turnovers where one stay checks out the morning another
/// checks in. This marketplace forbids the shared boundary day in either
/// direction, so the comparison is inclusive: `s1 <= e2 && s2 <= e1`.
pub fn conflicts(a: &StayRange, b: &StayRange) -> bool {
    a.check_in() <= b.check_out() && b.check_in() <= a.check_out()
}

/// Whether a candidate stay conflicts with any existing blocking reservation
/// for the listing. Linear scan; a single listing's reservation count is
/// small enough that an interval index would be overkill.
///
/// Pure predicate, no ordering dependency between calls. Callers must have
/// already filtered out cancelled reservations.
pub fn conflicts_with_any(candidate: &StayRange, existing: &[StayRange]) -> bool {
    existing.iter().any(|stay| conflicts(candidate, stay))
}
