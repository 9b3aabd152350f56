use chrono::{DateTime, Duration, Utc};
use hearth_core::clock::Clock;
use hearth_core::ranking::RankingApi;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

pub const DEFAULT_CACHE_TTL_SECONDS: i64 = 3600;
pub const DEFAULT_WINDOW_DAYS: u32 = 7;

/// One refresh result. Replaced wholesale; never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingSnapshot {
    pub listing_ids: Vec<Uuid>,
    pub fetched_at: DateTime<Utc>,
}

/// Time-boxed cache over the server-side trending ranking.
///
/// Constructed once per process and passed by reference to consumers; the
/// clock and ranking source are injected so tests stay hermetic. Errors never
/// cross this boundary: callers always get a list, possibly stale or empty.
pub struct TrendingCache {
    ranking: Arc<dyn RankingApi>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    window_days: u32,
    snapshot: RwLock<Option<TrendingSnapshot>>,
    // Coalesces concurrent refreshes into one in-flight ranking call.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl TrendingCache {
    pub fn new(ranking: Arc<dyn RankingApi>, clock: Arc<dyn Clock>) -> Self {
        Self::with_settings(
            ranking,
            clock,
            Duration::seconds(DEFAULT_CACHE_TTL_SECONDS),
            DEFAULT_WINDOW_DAYS,
        )
    }

    pub fn with_settings(
        ranking: Arc<dyn RankingApi>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        window_days: u32,
    ) -> Self {
        Self {
            ranking,
            clock,
            ttl,
            window_days,
            snapshot: RwLock::new(None),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Currently trending listing ids, server order preserved. Served from
    /// the snapshot while it is younger than the freshness window; otherwise
    /// refreshed first.
    pub async fn get(&self) -> Vec<Uuid> {
        if let Some(ids) = self.fresh_ids() {
            return ids;
        }

        let _guard = self.refresh_gate.lock().await;
        // Another caller may have refreshed while we waited on the gate.
        if let Some(ids) = self.fresh_ids() {
            return ids;
        }

        match self.ranking.get_trending(self.window_days).await {
            Ok(entries) => {
                let listing_ids: Vec<Uuid> = entries
                    .into_iter()
                    .filter(|e| e.is_trending)
                    .map(|e| e.listing_id)
                    .collect();

                // An empty result is served but not cached, so the next read
                // asks the ranking source again.
                if listing_ids.is_empty() {
                    debug!("Trending refresh returned no listings");
                    return listing_ids;
                }

                let snapshot = TrendingSnapshot {
                    listing_ids: listing_ids.clone(),
                    fetched_at: self.clock.now_utc(),
                };
                *self.snapshot.write().unwrap() = Some(snapshot);
                listing_ids
            }
            Err(e) => {
                warn!("Trending refresh failed: {}", e);
                self.stale_ids()
            }
        }
    }

    /// Report a user interaction with a listing. Success/failure is returned
    /// for optional retry or telemetry, never raised.
    pub async fn record_interaction(&self, listing_id: Uuid) -> bool {
        match self.ranking.record_click(listing_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to record click for {}: {}", listing_id, e);
                false
            }
        }
    }

    fn fresh_ids(&self) -> Option<Vec<Uuid>> {
        let snapshot = self.snapshot.read().unwrap();
        snapshot.as_ref().and_then(|s| {
            if self.clock.now_utc() - s.fetched_at < self.ttl {
                Some(s.listing_ids.clone())
            } else {
                None
            }
        })
    }

    fn stale_ids(&self) -> Vec<Uuid> {
        self.snapshot
            .read()
            .unwrap()
            .as_ref()
            .map(|s| s.listing_ids.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use hearth_core::clock::ManualClock;
    use hearth_core::ranking::TrendingEntry;
    use hearth_core::{CoreError, CoreResult};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct ScriptedRanking {
        entries: RwLock<Vec<TrendingEntry>>,
        fail: AtomicBool,
        calls: AtomicUsize,
        clicks: AtomicUsize,
    }

    impl ScriptedRanking {
        fn serving(ids: &[Uuid]) -> Self {
            let entries = ids
                .iter()
                .map(|&listing_id| TrendingEntry {
                    listing_id,
                    is_trending: true,
                })
                .collect();
            Self {
                entries: RwLock::new(entries),
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
                clicks: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RankingApi for ScriptedRanking {
        async fn get_trending(&self, _window_days: u32) -> CoreResult<Vec<TrendingEntry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(CoreError::TransientNetwork("ranking down".to_string()));
            }
            Ok(self.entries.read().unwrap().clone())
        }

        async fn record_click(&self, _listing_id: Uuid) -> CoreResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(CoreError::TransientNetwork("ranking down".to_string()));
            }
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn setup(ids: &[Uuid]) -> (Arc<ScriptedRanking>, Arc<ManualClock>, TrendingCache) {
        let ranking = Arc::new(ScriptedRanking::serving(ids));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let cache = TrendingCache::new(ranking.clone(), clock.clone());
        (ranking, clock, cache)
    }

    #[tokio::test]
    async fn test_second_get_within_window_hits_cache() {
        let id = Uuid::new_v4();
        let (ranking, _clock, cache) = setup(&[id]);

        assert_eq!(cache.get().await, vec![id]);
        assert_eq!(cache.get().await, vec![id]);
        assert_eq!(ranking.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expiry_triggers_second_call() {
        let id = Uuid::new_v4();
        let (ranking, clock, cache) = setup(&[id]);

        cache.get().await;
        clock.advance(Duration::hours(1) + Duration::milliseconds(1));
        cache.get().await;

        assert_eq!(ranking.call_count(), 2);
    }

    #[tokio::test]
    async fn test_exactly_at_ttl_is_stale() {
        let id = Uuid::new_v4();
        let (ranking, clock, cache) = setup(&[id]);

        cache.get().await;
        clock.advance(Duration::hours(1));
        cache.get().await;

        assert_eq!(ranking.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_previous_snapshot() {
        let id = Uuid::new_v4();
        let (ranking, clock, cache) = setup(&[id]);

        cache.get().await;
        clock.advance(Duration::hours(2));
        ranking.fail.store(true, Ordering::SeqCst);

        assert_eq!(cache.get().await, vec![id]);
    }

    #[tokio::test]
    async fn test_failure_with_no_snapshot_returns_empty() {
        let (ranking, _clock, cache) = setup(&[Uuid::new_v4()]);
        ranking.fail.store(true, Ordering::SeqCst);

        assert!(cache.get().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_is_not_cached() {
        let (ranking, _clock, cache) = setup(&[]);

        assert!(cache.get().await.is_empty());
        assert!(cache.get().await.is_empty());
        // No snapshot was stored, so both reads went to the source.
        assert_eq!(ranking.call_count(), 2);
    }

    #[tokio::test]
    async fn test_non_trending_entries_filtered() {
        let keep = Uuid::new_v4();
        let drop_id = Uuid::new_v4();
        let ranking = Arc::new(ScriptedRanking::serving(&[keep]));
        ranking.entries.write().unwrap().push(TrendingEntry {
            listing_id: drop_id,
            is_trending: false,
        });
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let cache = TrendingCache::new(ranking, clock);

        assert_eq!(cache.get().await, vec![keep]);
    }

    #[tokio::test]
    async fn test_concurrent_gets_coalesce_to_one_call() {
        let id = Uuid::new_v4();
        let (ranking, _clock, cache) = setup(&[id]);
        let cache = Arc::new(cache);

        let a = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get().await }
        });
        let b = tokio::spawn({
            let cache = cache.clone();
            async move { cache.get().await }
        });

        assert_eq!(a.await.unwrap(), vec![id]);
        assert_eq!(b.await.unwrap(), vec![id]);
        assert_eq!(ranking.call_count(), 1);
    }

    #[tokio::test]
    async fn test_record_interaction_reports_outcome() {
        let (ranking, _clock, cache) = setup(&[]);
        assert!(cache.record_interaction(Uuid::new_v4()).await);

        ranking.fail.store(true, Ordering::SeqCst);
        assert!(!cache.record_interaction(Uuid::new_v4()).await);
        assert_eq!(ranking.clicks.load(Ordering::SeqCst), 1);
    }
}
