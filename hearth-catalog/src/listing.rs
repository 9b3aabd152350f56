use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hearth_core::CoreResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Property categories offered at listing creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    House,
    Apartment,
    Cabin,
    Mansion,
    Dome,
    Villa,
    Castle,
    Hotel,
}

impl PropertyType {
    /// Lowercase label used in derived titles and display copy.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Cabin => "cabin",
            PropertyType::Mansion => "mansion",
            PropertyType::Dome => "dome",
            PropertyType::Villa => "villa",
            PropertyType::Castle => "castle",
            PropertyType::Hotel => "hotel",
        }
    }
}

/// How guests access the space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceType {
    Entire,
    Private,
    Shared,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Draft,
    Published,
    Archived,
}

/// Street address plus optional geocoded coordinates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Capacity basics collected in the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicDetails {
    pub max_guests: u32,
    pub bedrooms: u32,
    pub beds: u32,
    pub bathrooms: u32,
}

impl Default for BasicDetails {
    fn default() -> Self {
        Self {
            max_guests: 1,
            bedrooms: 1,
            beds: 1,
            bathrooms: 1,
        }
    }
}

/// A rentable unit as stored in the hosted backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub host_user_id: Uuid,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub space_type: SpaceType,
    pub location: Location,
    pub details: BasicDetails,
    pub amenities: Vec<String>,
    pub photos: Vec<String>,
    pub highlights: Vec<String>,
    pub price_per_night_cents: i64,
    pub currency: String,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn is_published(&self) -> bool {
        self.status == ListingStatus::Published
    }
}

/// Repository trait for listing data access.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn create_listing(&self, listing: &Listing) -> CoreResult<Uuid>;

    async fn get_listing(&self, id: Uuid) -> CoreResult<Option<Listing>>;

    /// All published listings, newest first.
    async fn list_published(&self) -> CoreResult<Vec<Listing>>;

    /// Every listing owned by a host, regardless of status.
    async fn list_by_host(&self, host_user_id: Uuid) -> CoreResult<Vec<Listing>>;

    async fn update_listing(&self, id: Uuid, listing: &Listing) -> CoreResult<()>;

    async fn delete_listing(&self, id: Uuid) -> CoreResult<()>;
}
