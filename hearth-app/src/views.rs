use crate::context::AppContext;
use chrono::NaiveDate;
use hearth_booking::flow::BookingFlow;
use hearth_booking::models::{blocked_dates, Reservation, StayRange};
use hearth_booking::BookingError;
use hearth_catalog::history::RecentSearches;
use hearth_catalog::listing::Listing;
use hearth_catalog::search::SearchParams;
use hearth_catalog::wizard::ListingDraft;
use hearth_core::feed::ChangeEvent;
use hearth_core::images::{upload_all, BatchUploadOutcome};
use hearth_core::{CoreError, CoreResult};
use hearth_shared::models::events::{
    FavoriteToggledEvent, ListingClickEvent, ListingPublishedEvent, ReservationConfirmedEvent,
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything the listing page needs: the record, the disabled calendar days,
/// and a fresh booking attempt seeded with the blocking reservations.
pub struct ListingDetail {
    pub listing: Listing,
    pub blocked_dates: Vec<NaiveDate>,
    pub flow: BookingFlow,
}

fn event_row<T: Serialize>(event: &T) -> Option<serde_json::Value> {
    match serde_json::to_value(event) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Unserializable event dropped: {}", e);
            None
        }
    }
}

/// Published listings with the trending ones first, in the server's ranking
/// order; the remainder stays newest-first.
pub async fn home_feed(ctx: &AppContext) -> CoreResult<Vec<Listing>> {
    let listings = ctx.listings.list_published().await?;
    let trending_ids = ctx.trending.get().await;

    let mut by_id: HashMap<Uuid, Listing> = listings.into_iter().map(|l| (l.id, l)).collect();
    let mut feed = Vec::with_capacity(by_id.len());
    for id in trending_ids {
        if let Some(listing) = by_id.remove(&id) {
            feed.push(listing);
        }
    }

    let mut rest: Vec<Listing> = by_id.into_values().collect();
    rest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    feed.extend(rest);
    Ok(feed)
}

/// Apply search criteria against the published set and record the location
/// text in the search history.
pub async fn search_listings(
    ctx: &AppContext,
    params: &SearchParams,
    history: &mut RecentSearches,
) -> CoreResult<Vec<Listing>> {
    if let Some(text) = &params.location_text {
        if !text.trim().is_empty() {
            history.push(text.trim());
        }
    }

    let listings = ctx.listings.list_published().await?;
    Ok(listings.into_iter().filter(|l| params.matches(l)).collect())
}

/// Open a listing page: load the record, report the click to the ranking
/// backend, and seed a booking attempt with the dates already taken.
pub async fn open_listing(ctx: &AppContext, listing_id: Uuid) -> CoreResult<ListingDetail> {
    let listing = ctx
        .listings
        .get_listing(listing_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Listing {}", listing_id)))?;

    // Click tracking is advisory; the page opens either way.
    ctx.trending.record_interaction(listing_id).await;
    let click = ListingClickEvent {
        listing_id,
        timestamp: ctx.clock.now_utc().timestamp(),
    };
    if let Some(row) = event_row(&click) {
        ctx.feed.publish("listing_clicks", ChangeEvent::Insert(row));
    }

    let reservations = ctx.reservations.list_blocking_for_listing(listing_id).await?;
    let stays: Vec<StayRange> = reservations.iter().map(|r| r.stay).collect();
    let blocked = blocked_dates(&stays);

    let flow = BookingFlow::new(
        listing_id,
        listing.price_per_night_cents,
        listing.details.max_guests,
        ctx.rules.service_fee_rate,
        stays,
        ctx.clock.today(),
    );

    Ok(ListingDetail {
        listing,
        blocked_dates: blocked,
        flow,
    })
}

/// Submit the booking attempt and announce the confirmed reservation on the
/// change feed.
pub async fn submit_booking(
    ctx: &AppContext,
    flow: &mut BookingFlow,
    guest_user_id: Uuid,
) -> Result<Uuid, BookingError> {
    let total_cents = flow.quote().map(|q| q.total_cents).unwrap_or(0);
    let reservation_id = flow.submit(ctx.reservations.as_ref(), guest_user_id).await?;

    let event = ReservationConfirmedEvent {
        reservation_id,
        listing_id: flow.listing_id(),
        guest_user_id,
        total_cents,
        timestamp: ctx.clock.now_utc().timestamp(),
    };
    if let Some(row) = event_row(&event) {
        ctx.feed.publish("reservations", ChangeEvent::Insert(row));
    }
    Ok(reservation_id)
}

/// Flip a listing in and out of the user's wishlist. Returns whether it is
/// favorited after the call.
pub async fn toggle_favorite(
    ctx: &AppContext,
    user_id: Uuid,
    listing_id: Uuid,
) -> CoreResult<bool> {
    let currently = ctx
        .favorites
        .list_favorite_ids(user_id)
        .await?
        .contains(&listing_id);

    if currently {
        ctx.favorites.remove_favorite(user_id, listing_id).await?;
    } else {
        ctx.favorites.add_favorite(user_id, listing_id).await?;
    }

    let favorited = !currently;
    let event = FavoriteToggledEvent {
        listing_id,
        user_id,
        favorited,
        timestamp: ctx.clock.now_utc().timestamp(),
    };
    if let Some(row) = event_row(&event) {
        let change = if favorited {
            ChangeEvent::Insert(row)
        } else {
            ChangeEvent::Delete(row)
        };
        ctx.feed.publish("favorites", change);
    }
    Ok(favorited)
}

/// Push the wizard's photo selection to the image host and attach the public
/// URLs to the draft. On a mid-batch failure the URLs uploaded so far are
/// kept.
pub async fn upload_photos(
    ctx: &AppContext,
    draft: &mut ListingDraft,
    images: &[Vec<u8>],
) -> BatchUploadOutcome {
    let outcome = upload_all(ctx.images.as_ref(), images).await;
    draft.set_photos(outcome.urls.clone());
    outcome
}

/// Validate the finished draft and insert it. The backend's id wins over the
/// locally generated one.
pub async fn publish_listing(
    ctx: &AppContext,
    draft: &ListingDraft,
    host_user_id: Uuid,
) -> CoreResult<Listing> {
    let mut listing = draft
        .publish(host_user_id)
        .map_err(|e| CoreError::Validation(e.to_string()))?;
    listing.id = ctx.listings.create_listing(&listing).await?;
    info!("Published listing {}: {}", listing.id, listing.title);

    let event = ListingPublishedEvent {
        listing_id: listing.id,
        host_user_id,
        timestamp: ctx.clock.now_utc().timestamp(),
    };
    if let Some(row) = event_row(&event) {
        ctx.feed.publish("listings", ChangeEvent::Insert(row));
    }
    Ok(listing)
}

/// Every listing owned by the host, for the hosting dashboard.
pub async fn my_listings(ctx: &AppContext, host_user_id: Uuid) -> CoreResult<Vec<Listing>> {
    ctx.listings.list_by_host(host_user_id).await
}

/// The guest's reservations, newest first.
pub async fn my_trips(ctx: &AppContext, guest_user_id: Uuid) -> CoreResult<Vec<Reservation>> {
    ctx.reservations.list_for_guest(guest_user_id).await
}

/// Persist host edits to an existing listing.
pub async fn update_listing(ctx: &AppContext, listing: &Listing) -> CoreResult<()> {
    ctx.listings.update_listing(listing.id, listing).await?;
    if let Some(row) = event_row(listing) {
        ctx.feed.publish("listings", ChangeEvent::Update(row));
    }
    Ok(())
}

pub async fn remove_listing(ctx: &AppContext, listing_id: Uuid) -> CoreResult<()> {
    ctx.listings.delete_listing(listing_id).await?;
    if let Some(row) = event_row(&serde_json::json!({ "id": listing_id })) {
        ctx.feed.publish("listings", ChangeEvent::Delete(row));
    }
    Ok(())
}
