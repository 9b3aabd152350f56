use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListingClickEvent {
    pub listing_id: Uuid,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ReservationConfirmedEvent {
    pub reservation_id: Uuid,
    pub listing_id: Uuid,
    pub guest_user_id: Uuid,
    pub total_cents: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListingPublishedEvent {
    pub listing_id: Uuid,
    pub host_user_id: Uuid,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct FavoriteToggledEvent {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub favorited: bool,
    pub timestamp: i64,
}
