use chrono::Duration;
use hearth_booking::models::ReservationRepository;
use hearth_catalog::listing::ListingRepository;
use hearth_core::clock::{Clock, SystemClock};
use hearth_core::images::ImageHost;
use hearth_core::repository::FavoriteRepository;
use hearth_core::session::AuthGateway;
use hearth_gateway::app_config::{BusinessRules, Config};
use hearth_gateway::{AuthClient, ChangeFeedHub, ImgurClient, InMemoryBackend, RestGateway};
use hearth_trending::TrendingCache;
use std::sync::Arc;

/// Shared handles to every external collaborator, assembled once at startup
/// and passed by reference. View logic only ever sees the trait objects, so
/// the hosted backend and the in-memory double are interchangeable.
pub struct AppContext {
    pub listings: Arc<dyn ListingRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub favorites: Arc<dyn FavoriteRepository>,
    pub auth: Arc<dyn AuthGateway>,
    pub images: Arc<dyn ImageHost>,
    pub trending: Arc<TrendingCache>,
    pub feed: Arc<ChangeFeedHub>,
    pub clock: Arc<dyn Clock>,
    pub rules: BusinessRules,
    rest: Option<Arc<RestGateway>>,
}

impl AppContext {
    /// Wire up the hosted backend from configuration.
    pub fn connect(config: &Config) -> Self {
        let rest = Arc::new(RestGateway::new(
            &config.backend.url,
            &config.backend.anon_key,
        ));
        let auth = Arc::new(AuthClient::new(
            &config.backend.url,
            &config.backend.anon_key,
        ));
        let images = Arc::new(ImgurClient::new(
            &config.images.upload_url,
            &config.images.client_id,
        ));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let trending = Arc::new(TrendingCache::with_settings(
            rest.clone(),
            clock.clone(),
            Duration::seconds(config.business_rules.trending_cache_seconds),
            config.business_rules.trending_window_days,
        ));

        Self {
            listings: rest.clone(),
            reservations: rest.clone(),
            favorites: rest.clone(),
            auth,
            images,
            trending,
            feed: Arc::new(ChangeFeedHub::new()),
            clock,
            rules: config.business_rules.clone(),
            rest: Some(rest),
        }
    }

    /// Wire up against the in-memory double, for tests and offline runs.
    pub fn in_memory(
        backend: Arc<InMemoryBackend>,
        auth: Arc<dyn AuthGateway>,
        images: Arc<dyn ImageHost>,
        clock: Arc<dyn Clock>,
        rules: BusinessRules,
    ) -> Self {
        let trending = Arc::new(TrendingCache::with_settings(
            backend.clone(),
            clock.clone(),
            Duration::seconds(rules.trending_cache_seconds),
            rules.trending_window_days,
        ));

        Self {
            listings: backend.clone(),
            reservations: backend.clone(),
            favorites: backend,
            auth,
            images,
            trending,
            feed: Arc::new(ChangeFeedHub::new()),
            clock,
            rules,
            rest: None,
        }
    }

    /// Propagate the current session's token to table requests. Called after
    /// sign-in/out and after a silent refresh; anonymous when signed out.
    pub async fn sync_backend_token(&self) -> hearth_core::CoreResult<()> {
        if let Some(rest) = &self.rest {
            let session = self.auth.get_session().await?;
            rest.set_access_token(session.map(|s| s.access_token));
        }
        Ok(())
    }
}
