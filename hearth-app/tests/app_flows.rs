use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use hearth_app::{views, AppContext};
use hearth_booking::flow::BookingState;
use hearth_booking::BookingError;
use hearth_catalog::listing::{Location, PropertyType, SpaceType};
use hearth_catalog::wizard::ListingDraft;
use hearth_core::clock::ManualClock;
use hearth_core::feed::{ChangeEvent, ChangeFeed};
use hearth_core::images::ImageHost;
use hearth_core::session::{AuthEvent, AuthGateway, ProfileFields, Session};
use hearth_core::{CoreError, CoreResult};
use hearth_gateway::app_config::BusinessRules;
use hearth_gateway::InMemoryBackend;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

struct StubAuth {
    events: broadcast::Sender<AuthEvent>,
}

impl StubAuth {
    fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { events }
    }
}

#[async_trait]
impl AuthGateway for StubAuth {
    async fn get_session(&self) -> CoreResult<Option<Session>> {
        Ok(None)
    }

    async fn sign_in(&self, _identity: &str, _secret: &str) -> CoreResult<Session> {
        Err(CoreError::RemoteRejection("not wired".to_string()))
    }

    async fn sign_up(
        &self,
        _identity: &str,
        _secret: &str,
        _profile: ProfileFields,
    ) -> CoreResult<Session> {
        Err(CoreError::RemoteRejection("not wired".to_string()))
    }

    async fn sign_out(&self) -> CoreResult<()> {
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

struct StubImages {
    fail_at: usize,
    calls: AtomicUsize,
}

impl StubImages {
    fn reliable() -> Self {
        Self {
            fail_at: usize::MAX,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing_at(index: usize) -> Self {
        Self {
            fail_at: index,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ImageHost for StubImages {
    async fn upload(&self, _bytes: &[u8]) -> CoreResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n == self.fail_at {
            Err(CoreError::TransientNetwork("image host down".to_string()))
        } else {
            Ok(format!("https://img.example/{}.jpg", n))
        }
    }
}

fn rules() -> BusinessRules {
    BusinessRules {
        service_fee_rate: 0.15,
        trending_cache_seconds: 3600,
        trending_window_days: 7,
        recent_search_limit: 5,
    }
}

fn test_context(images: StubImages) -> AppContext {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    ));
    AppContext::in_memory(
        Arc::new(InMemoryBackend::new()),
        Arc::new(StubAuth::new()),
        Arc::new(images),
        clock,
        rules(),
    )
}

fn cabin_draft() -> ListingDraft {
    let mut draft = ListingDraft::new();
    draft.set_property_type(PropertyType::Cabin);
    draft.set_space_type(SpaceType::Entire);
    draft.set_location(Location {
        address: "Lake Tahoe, CA".to_string(),
        latitude: Some(39.09),
        longitude: Some(-120.03),
    });
    draft.set_pricing(10_000, "USD");
    draft
}

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

#[tokio::test]
async fn publish_then_book_end_to_end() {
    let ctx = test_context(StubImages::reliable());
    let host = Uuid::new_v4();
    let guest = Uuid::new_v4();

    let listing = views::publish_listing(&ctx, &cabin_draft(), host).await.unwrap();
    assert_eq!(views::home_feed(&ctx).await.unwrap()[0].id, listing.id);

    let mut detail = views::open_listing(&ctx, listing.id).await.unwrap();
    assert!(detail.blocked_dates.is_empty());

    detail.flow.select_day(date(6, 10)).unwrap();
    detail.flow.select_day(date(6, 13)).unwrap();
    detail.flow.add_guest();

    let reservation_id = views::submit_booking(&ctx, &mut detail.flow, guest)
        .await
        .unwrap();
    assert!(matches!(
        detail.flow.state(),
        BookingState::Confirmed { .. }
    ));

    let trips = views::my_trips(&ctx, guest).await.unwrap();
    assert_eq!(trips[0].id, reservation_id);
    assert_eq!(trips[0].total_price_cents, 34_500);

    // Reopening the page blocks the booked nights.
    let reopened = views::open_listing(&ctx, listing.id).await.unwrap();
    assert_eq!(
        reopened.blocked_dates,
        vec![date(6, 10), date(6, 11), date(6, 12)]
    );
}

#[tokio::test]
async fn stale_page_loses_the_race() {
    let ctx = test_context(StubImages::reliable());
    let host = Uuid::new_v4();
    let listing = views::publish_listing(&ctx, &cabin_draft(), host).await.unwrap();

    // Two guests open the page before either books.
    let mut first = views::open_listing(&ctx, listing.id).await.unwrap();
    let mut second = views::open_listing(&ctx, listing.id).await.unwrap();

    first.flow.select_day(date(6, 10)).unwrap();
    first.flow.select_day(date(6, 13)).unwrap();
    views::submit_booking(&ctx, &mut first.flow, Uuid::new_v4())
        .await
        .unwrap();

    // The stale page passes its local check but the backend rejects it.
    second.flow.select_day(date(6, 11)).unwrap();
    second.flow.select_day(date(6, 14)).unwrap();
    let err = views::submit_booking(&ctx, &mut second.flow, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Rejected(_)));
    assert!(matches!(second.flow.state(), BookingState::Rejected { .. }));
}

#[tokio::test]
async fn clicked_listing_leads_the_home_feed() {
    let ctx = test_context(StubImages::reliable());
    let host = Uuid::new_v4();

    let quiet = views::publish_listing(&ctx, &cabin_draft(), host).await.unwrap();
    let busy = views::publish_listing(&ctx, &cabin_draft(), host).await.unwrap();

    for _ in 0..3 {
        views::open_listing(&ctx, busy.id).await.unwrap();
    }
    views::open_listing(&ctx, quiet.id).await.unwrap();

    let feed = views::home_feed(&ctx).await.unwrap();
    assert_eq!(feed[0].id, busy.id);
    assert_eq!(feed.len(), 2);
}

#[tokio::test]
async fn favorite_toggle_announces_changes() {
    let ctx = test_context(StubImages::reliable());
    let user = Uuid::new_v4();
    let listing_id = Uuid::new_v4();
    let mut changes = ctx.feed.subscribe("favorites", None);

    assert!(views::toggle_favorite(&ctx, user, listing_id).await.unwrap());
    assert!(!views::toggle_favorite(&ctx, user, listing_id).await.unwrap());

    assert!(matches!(
        changes.next().await.unwrap(),
        ChangeEvent::Insert(_)
    ));
    assert!(matches!(
        changes.next().await.unwrap(),
        ChangeEvent::Delete(_)
    ));
}

#[tokio::test]
async fn photo_batch_failure_keeps_earlier_uploads() {
    let ctx = test_context(StubImages::failing_at(1));
    let mut draft = cabin_draft();

    let outcome =
        views::upload_photos(&ctx, &mut draft, &[vec![1u8], vec![2], vec![3]]).await;
    assert_eq!(outcome.urls.len(), 1);
    assert_eq!(outcome.failure.as_ref().unwrap().0, 1);
    assert_eq!(draft.summary().photo_count, 1);
}

#[tokio::test]
async fn search_records_history_and_filters() {
    let ctx = test_context(StubImages::reliable());
    let host = Uuid::new_v4();
    views::publish_listing(&ctx, &cabin_draft(), host).await.unwrap();

    let mut history = hearth_catalog::history::RecentSearches::default();
    let params = hearth_catalog::search::SearchParams {
        location_text: Some("tahoe".to_string()),
        ..Default::default()
    };

    let hits = views::search_listings(&ctx, &params, &mut history).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(history.entries(), ["tahoe"]);

    let miss = hearth_catalog::search::SearchParams {
        location_text: Some("paris".to_string()),
        ..Default::default()
    };
    assert!(views::search_listings(&ctx, &miss, &mut history)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(history.entries(), ["paris", "tahoe"]);
}
