use crate::listing::{
    BasicDetails, Listing, ListingStatus, Location, PropertyType, SpaceType,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The ordered data-collection steps of listing creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStep {
    PropertyType,
    SpaceType,
    Location,
    BasicDetails,
    Amenities,
    Photos,
    Highlights,
    Title,
    Description,
    Pricing,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 11] = [
        WizardStep::PropertyType,
        WizardStep::SpaceType,
        WizardStep::Location,
        WizardStep::BasicDetails,
        WizardStep::Amenities,
        WizardStep::Photos,
        WizardStep::Highlights,
        WizardStep::Title,
        WizardStep::Description,
        WizardStep::Pricing,
        WizardStep::Review,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::PropertyType => "Property Type",
            WizardStep::SpaceType => "Space Type",
            WizardStep::Location => "Location",
            WizardStep::BasicDetails => "Basic Details",
            WizardStep::Amenities => "Amenities",
            WizardStep::Photos => "Photos",
            WizardStep::Highlights => "Highlights",
            WizardStep::Title => "Title",
            WizardStep::Description => "Description",
            WizardStep::Pricing => "Pricing",
            WizardStep::Review => "Review",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid price: must be greater than zero")]
    InvalidPrice,
}

/// Aggregate built up across the wizard steps and submitted once at the end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDraft {
    step: WizardStep,
    property_type: Option<PropertyType>,
    space_type: Option<SpaceType>,
    location: Location,
    details: BasicDetails,
    amenities: Vec<String>,
    photos: Vec<String>,
    highlights: Vec<String>,
    title: String,
    description: String,
    price_per_night_cents: i64,
    currency: String,
}

/// Review data derived from the draft on read; never cached alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSummary {
    pub title: String,
    pub property_label: &'static str,
    pub address: String,
    pub max_guests: u32,
    pub photo_count: usize,
    pub amenity_count: usize,
    pub price_per_night_cents: i64,
    pub currency: String,
}

impl Default for ListingDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingDraft {
    pub fn new() -> Self {
        Self {
            step: WizardStep::PropertyType,
            property_type: None,
            space_type: None,
            location: Location::default(),
            details: BasicDetails::default(),
            amenities: Vec::new(),
            photos: Vec::new(),
            highlights: Vec::new(),
            title: String::new(),
            description: String::new(),
            price_per_night_cents: 0,
            currency: "USD".to_string(),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Advance to the next step, clamped at Review.
    pub fn next(&mut self) {
        let index = self.step.index();
        if index + 1 < WizardStep::ALL.len() {
            self.step = WizardStep::ALL[index + 1];
        }
    }

    /// Go back one step, clamped at the first.
    pub fn back(&mut self) {
        let index = self.step.index();
        if index > 0 {
            self.step = WizardStep::ALL[index - 1];
        }
    }

    pub fn set_property_type(&mut self, property_type: PropertyType) {
        self.property_type = Some(property_type);
    }

    pub fn set_space_type(&mut self, space_type: SpaceType) {
        self.space_type = Some(space_type);
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn set_details(&mut self, details: BasicDetails) {
        self.details = details;
    }

    pub fn set_amenities(&mut self, amenities: Vec<String>) {
        self.amenities = amenities;
    }

    pub fn set_photos(&mut self, photos: Vec<String>) {
        self.photos = photos;
    }

    pub fn set_highlights(&mut self, highlights: Vec<String>) {
        self.highlights = highlights;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_pricing(&mut self, price_per_night_cents: i64, currency: impl Into<String>) {
        self.price_per_night_cents = price_per_night_cents;
        self.currency = currency.into();
    }

    /// Fallback title when the host leaves the title step blank:
    /// "{property type} in {address}".
    pub fn derived_title(&self) -> String {
        if !self.title.trim().is_empty() {
            return self.title.clone();
        }
        let label = self
            .property_type
            .map(|p| p.label())
            .unwrap_or("place");
        format!("{} in {}", label, self.location.address)
    }

    /// Pure derivation of the review-step summary.
    pub fn summary(&self) -> DraftSummary {
        DraftSummary {
            title: self.derived_title(),
            property_label: self.property_type.map(|p| p.label()).unwrap_or("place"),
            address: self.location.address.clone(),
            max_guests: self.details.max_guests,
            photo_count: self.photos.len(),
            amenity_count: self.amenities.len(),
            price_per_night_cents: self.price_per_night_cents,
            currency: self.currency.clone(),
        }
    }

    /// Validate the aggregate and produce the record to insert. The draft is
    /// submitted once, at the Review step; nothing is persisted earlier.
    pub fn publish(&self, host_user_id: Uuid) -> Result<Listing, WizardError> {
        let property_type = self
            .property_type
            .ok_or(WizardError::MissingField("property_type"))?;
        let space_type = self
            .space_type
            .ok_or(WizardError::MissingField("space_type"))?;

        if self.location.address.trim().is_empty() {
            return Err(WizardError::MissingField("address"));
        }
        if self.price_per_night_cents <= 0 {
            return Err(WizardError::InvalidPrice);
        }

        let now = Utc::now();
        Ok(Listing {
            id: Uuid::new_v4(),
            host_user_id,
            title: self.derived_title(),
            description: self.description.clone(),
            property_type,
            space_type,
            location: self.location.clone(),
            details: self.details.clone(),
            amenities: self.amenities.clone(),
            photos: self.photos.clone(),
            highlights: self.highlights.clone(),
            price_per_night_cents: self.price_per_night_cents,
            currency: self.currency.clone(),
            status: ListingStatus::Published,
            created_at: now,
            updated_at: now,
        })
    }
}
