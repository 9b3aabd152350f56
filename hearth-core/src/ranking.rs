use crate::CoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the server-side ranking result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub listing_id: Uuid,
    pub is_trending: bool,
}

/// Contract over the server-side ranking procedures. The ranking computation
/// itself is the backend's; the client only reads results and reports clicks.
#[async_trait]
pub trait RankingApi: Send + Sync {
    /// Ranking over interactions inside the trailing window, ordered by the
    /// server.
    async fn get_trending(&self, window_days: u32) -> CoreResult<Vec<TrendingEntry>>;

    /// Report one user interaction with a listing.
    async fn record_click(&self, listing_id: Uuid) -> CoreResult<()>;
}
