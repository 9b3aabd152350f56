use crate::listing::Listing;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Guest-count caps enforced by the search form.
pub const MAX_ADULTS: u32 = 16;
pub const MAX_CHILDREN: u32 = 15;
pub const MAX_INFANTS: u32 = 5;

/// Party composition. Adults never drop below one; each class has its own
/// cap. Infants do not count toward listing capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCounts {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for GuestCounts {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl GuestCounts {
    pub fn add_adult(&mut self) {
        if self.adults < MAX_ADULTS {
            self.adults += 1;
        }
    }

    pub fn remove_adult(&mut self) {
        if self.adults > 1 {
            self.adults -= 1;
        }
    }

    pub fn add_child(&mut self) {
        if self.children < MAX_CHILDREN {
            self.children += 1;
        }
    }

    pub fn remove_child(&mut self) {
        self.children = self.children.saturating_sub(1);
    }

    pub fn add_infant(&mut self) {
        if self.infants < MAX_INFANTS {
            self.infants += 1;
        }
    }

    pub fn remove_infant(&mut self) {
        self.infants = self.infants.saturating_sub(1);
    }

    /// Guests counted against a listing's capacity.
    pub fn total(&self) -> u32 {
        self.adults + self.children
    }
}

/// Geographic bounds from the map drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// Filters collected in the search modal. All criteria are optional except
/// the party, which always has at least one adult.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub location_text: Option<String>,
    pub bounds: Option<BoundingBox>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub guests: GuestCounts,
}

impl SearchParams {
    /// Whether a listing satisfies the location and capacity criteria.
    /// Date availability is the booking layer's concern, not the grid's.
    pub fn matches(&self, listing: &Listing) -> bool {
        if listing.details.max_guests < self.total_guests() {
            return false;
        }

        if let Some(bounds) = &self.bounds {
            match (listing.location.latitude, listing.location.longitude) {
                (Some(lat), Some(lng)) if bounds.contains(lat, lng) => {}
                _ => return false,
            }
        } else if let Some(text) = &self.location_text {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty()
                && !listing.location.address.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }

    pub fn total_guests(&self) -> u32 {
        self.guests.total()
    }

    /// Short display tags summarizing the active criteria, derived on read.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();

        if let Some(text) = &self.location_text {
            if !text.trim().is_empty() {
                tags.push(text.trim().to_string());
            }
        }
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            tags.push(format!(
                "{} – {}",
                check_in.format("%b %-d"),
                check_out.format("%b %-d")
            ));
        }
        let total = self.total_guests();
        tags.push(format!(
            "{} guest{}",
            total,
            if total == 1 { "" } else { "s" }
        ));

        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{BasicDetails, ListingStatus, Location, PropertyType, SpaceType};
    use chrono::Utc;
    use uuid::Uuid;

    fn listing(address: &str, max_guests: u32) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            host_user_id: Uuid::new_v4(),
            title: "test".to_string(),
            description: String::new(),
            property_type: PropertyType::House,
            space_type: SpaceType::Entire,
            location: Location {
                address: address.to_string(),
                latitude: Some(48.85),
                longitude: Some(2.35),
            },
            details: BasicDetails {
                max_guests,
                ..BasicDetails::default()
            },
            amenities: vec![],
            photos: vec![],
            highlights: vec![],
            price_per_night_cents: 10000,
            currency: "USD".to_string(),
            status: ListingStatus::Published,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_adult_clamps() {
        let mut guests = GuestCounts::default();
        guests.remove_adult();
        assert_eq!(guests.adults, 1);

        for _ in 0..40 {
            guests.add_adult();
        }
        assert_eq!(guests.adults, MAX_ADULTS);
    }

    #[test]
    fn test_children_and_infant_clamps() {
        let mut guests = GuestCounts::default();
        guests.remove_child();
        guests.remove_infant();
        assert_eq!((guests.children, guests.infants), (0, 0));

        for _ in 0..40 {
            guests.add_child();
            guests.add_infant();
        }
        assert_eq!(guests.children, MAX_CHILDREN);
        assert_eq!(guests.infants, MAX_INFANTS);
    }

    #[test]
    fn test_infants_excluded_from_total() {
        let mut guests = GuestCounts::default();
        guests.add_child();
        guests.add_infant();
        assert_eq!(guests.total(), 2);
    }

    #[test]
    fn test_location_text_match() {
        let params = SearchParams {
            location_text: Some("paris".to_string()),
            ..SearchParams::default()
        };
        assert!(params.matches(&listing("Paris, France", 4)));
        assert!(!params.matches(&listing("Lyon, France", 4)));
    }

    #[test]
    fn test_capacity_filter() {
        let mut params = SearchParams::default();
        for _ in 0..3 {
            params.guests.add_adult();
        }
        assert!(!params.matches(&listing("Paris", 2)));
        assert!(params.matches(&listing("Paris", 4)));
    }

    #[test]
    fn test_bounds_take_precedence_over_text() {
        let params = SearchParams {
            location_text: Some("nowhere".to_string()),
            bounds: Some(BoundingBox {
                min_lat: 48.0,
                max_lat: 49.0,
                min_lng: 2.0,
                max_lng: 3.0,
            }),
            ..SearchParams::default()
        };
        // Coordinates are inside the box, so the stale text is ignored.
        assert!(params.matches(&listing("Paris, France", 4)));
    }

    #[test]
    fn test_tags_derivation() {
        let params = SearchParams {
            location_text: Some("Paris".to_string()),
            check_in: NaiveDate::from_ymd_opt(2024, 6, 1),
            check_out: NaiveDate::from_ymd_opt(2024, 6, 5),
            ..SearchParams::default()
        };
        let tags = params.tags();
        assert_eq!(tags[0], "Paris");
        assert_eq!(tags[1], "Jun 1 – Jun 5");
        assert_eq!(tags[2], "1 guest");
    }
}
