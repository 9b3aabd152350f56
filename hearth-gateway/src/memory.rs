use async_trait::async_trait;
use hearth_booking::availability::conflicts_with_any;
use hearth_booking::models::{Reservation, ReservationRepository, StayRange};
use hearth_catalog::listing::{Listing, ListingRepository};
use hearth_core::ranking::{RankingApi, TrendingEntry};
use hearth_core::repository::FavoriteRepository;
use hearth_core::{CoreError, CoreResult};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

/// Backend double for tests and offline runs. Holds the same tables the
/// hosted backend does and enforces the same overlap constraint on
/// reservation insert, so race handling can be exercised without a network.
#[derive(Default)]
pub struct InMemoryBackend {
    listings: Mutex<HashMap<Uuid, Listing>>,
    reservations: Mutex<HashMap<Uuid, Reservation>>,
    favorites: Mutex<HashSet<(Uuid, Uuid)>>,
    clicks: Mutex<HashMap<Uuid, u64>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ListingRepository for InMemoryBackend {
    async fn create_listing(&self, listing: &Listing) -> CoreResult<Uuid> {
        self.listings
            .lock()
            .unwrap()
            .insert(listing.id, listing.clone());
        Ok(listing.id)
    }

    async fn get_listing(&self, id: Uuid) -> CoreResult<Option<Listing>> {
        Ok(self.listings.lock().unwrap().get(&id).cloned())
    }

    async fn list_published(&self) -> CoreResult<Vec<Listing>> {
        let mut rows: Vec<Listing> = self
            .listings
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.is_published())
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn list_by_host(&self, host_user_id: Uuid) -> CoreResult<Vec<Listing>> {
        let mut rows: Vec<Listing> = self
            .listings
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.host_user_id == host_user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_listing(&self, id: Uuid, listing: &Listing) -> CoreResult<()> {
        let mut listings = self.listings.lock().unwrap();
        if !listings.contains_key(&id) {
            return Err(CoreError::NotFound(format!("Listing {}", id)));
        }
        listings.insert(id, listing.clone());
        Ok(())
    }

    async fn delete_listing(&self, id: Uuid) -> CoreResult<()> {
        self.listings.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for InMemoryBackend {
    async fn create_reservation(&self, reservation: &Reservation) -> CoreResult<Uuid> {
        // One guard across check and insert, so racing inserts cannot both
        // pass the overlap test.
        let mut reservations = self.reservations.lock().unwrap();
        let blocking: Vec<StayRange> = reservations
            .values()
            .filter(|r| r.listing_id == reservation.listing_id && r.status.blocks_availability())
            .map(|r| r.stay)
            .collect();
        if conflicts_with_any(&reservation.stay, &blocking) {
            return Err(CoreError::RemoteRejection(
                "Selected dates overlap with an existing reservation".to_string(),
            ));
        }

        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation.id)
    }

    async fn get_reservation(&self, id: Uuid) -> CoreResult<Option<Reservation>> {
        Ok(self.reservations.lock().unwrap().get(&id).cloned())
    }

    async fn list_blocking_for_listing(&self, listing_id: Uuid) -> CoreResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.listing_id == listing_id && r.status.blocks_availability())
            .cloned()
            .collect())
    }

    async fn list_for_guest(&self, guest_user_id: Uuid) -> CoreResult<Vec<Reservation>> {
        let mut rows: Vec<Reservation> = self
            .reservations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.guest_user_id == guest_user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryBackend {
    async fn list_favorite_ids(&self, user_id: Uuid) -> CoreResult<Vec<Uuid>> {
        Ok(self
            .favorites
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, l)| *l)
            .collect())
    }

    async fn add_favorite(&self, user_id: Uuid, listing_id: Uuid) -> CoreResult<()> {
        self.favorites.lock().unwrap().insert((user_id, listing_id));
        Ok(())
    }

    async fn remove_favorite(&self, user_id: Uuid, listing_id: Uuid) -> CoreResult<()> {
        self.favorites.lock().unwrap().remove(&(user_id, listing_id));
        Ok(())
    }
}

#[async_trait]
impl RankingApi for InMemoryBackend {
    async fn get_trending(&self, _window_days: u32) -> CoreResult<Vec<TrendingEntry>> {
        let clicks = self.clicks.lock().unwrap();
        let mut counted: Vec<(Uuid, u64)> = clicks.iter().map(|(id, n)| (*id, *n)).collect();
        counted.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(counted
            .into_iter()
            .map(|(listing_id, count)| TrendingEntry {
                listing_id,
                is_trending: count > 0,
            })
            .collect())
    }

    async fn record_click(&self, listing_id: Uuid) -> CoreResult<()> {
        *self.clicks.lock().unwrap().entry(listing_id).or_insert(0) += 1;
        Ok(())
    }
}
