use crate::CoreResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Wishlist access over the hosted table store. A user with no favorites is a
/// valid empty state, never an error.
///
/// Listing and reservation repositories live next to their models in
/// `hearth-catalog` and `hearth-booking`.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn list_favorite_ids(&self, user_id: Uuid) -> CoreResult<Vec<Uuid>>;

    async fn add_favorite(&self, user_id: Uuid, listing_id: Uuid) -> CoreResult<()>;

    async fn remove_favorite(&self, user_id: Uuid, listing_id: Uuid) -> CoreResult<()>;
}
