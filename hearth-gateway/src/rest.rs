use async_trait::async_trait;
use hearth_booking::models::{Reservation, ReservationRepository};
use hearth_catalog::listing::{Listing, ListingRepository};
use hearth_core::ranking::{RankingApi, TrendingEntry};
use hearth_core::repository::FavoriteRepository;
use hearth_core::{CoreError, CoreResult};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Client for the hosted backend's table REST dialect and RPC endpoints.
/// Relational lookups are expressed as `column=eq.value` query parameters,
/// not a query language built on the client.
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

impl RestGateway {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: RwLock::new(None),
        }
    }

    /// Attach (or clear) the signed-in user's token; requests fall back to
    /// the anonymous key otherwise.
    pub fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().unwrap() = token;
    }

    fn bearer(&self) -> String {
        self.access_token
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn select(&self, table: &str, query: &[(&str, String)]) -> CoreResult<Vec<Value>> {
        let response = self
            .http
            .get(self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let rows: Vec<Value> = Self::check(response).await?.json().await.map_err(body_error)?;
        debug!("select {} returned {} rows", table, rows.len());
        Ok(rows)
    }

    /// Insert one row and return its stored representation.
    async fn insert(&self, table: &str, row: Value) -> CoreResult<Value> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(self.bearer())
            .json(&json!([row]))
            .send()
            .await
            .map_err(transport_error)?;

        let rows: Vec<Value> =
            Self::check(response).await?.json().await.map_err(body_error)?;
        first_row(rows)
    }

    async fn update(&self, table: &str, patch: Value, query: &[(&str, String)]) -> CoreResult<()> {
        let response = self
            .http
            .patch(self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(query)
            .json(&patch)
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response).await.map(|_| ())
    }

    async fn delete(&self, table: &str, query: &[(&str, String)]) -> CoreResult<()> {
        let response = self
            .http
            .delete(self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response).await.map(|_| ())
    }

    async fn rpc(&self, function: &str, params: Value) -> CoreResult<Value> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .json(&params)
            .send()
            .await
            .map_err(transport_error)?;

        Self::check(response).await?.json().await.map_err(body_error)
    }

    async fn check(response: reqwest::Response) -> CoreResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CoreError::AuthExpiry,
            StatusCode::NOT_FOUND => CoreError::NotFound(body),
            StatusCode::CONFLICT => CoreError::RemoteRejection(reject_message(&body)),
            s if s.is_server_error() => CoreError::TransientNetwork(format!("{}: {}", s, body)),
            _ => CoreError::RemoteRejection(reject_message(&body)),
        })
    }
}

fn transport_error(e: reqwest::Error) -> CoreError {
    CoreError::TransientNetwork(e.to_string())
}

fn body_error(e: reqwest::Error) -> CoreError {
    CoreError::RemoteRejection(format!("Malformed response: {}", e))
}

/// Overlap violations come back as constraint errors; translate them into
/// the message the booking flow surfaces.
fn reject_message(body: &str) -> String {
    if body.contains("overlap") {
        "Selected dates overlap with an existing reservation".to_string()
    } else {
        body.to_string()
    }
}

fn encode<T: serde::Serialize>(value: &T) -> CoreResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| CoreError::Validation(format!("Unserializable payload: {}", e)))
}

fn decode<T: serde::de::DeserializeOwned>(row: Value) -> CoreResult<T> {
    serde_json::from_value(row)
        .map_err(|e| CoreError::RemoteRejection(format!("Malformed row: {}", e)))
}

fn decode_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>) -> CoreResult<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

fn returned_id(row: &Value) -> CoreResult<Uuid> {
    row["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| CoreError::RemoteRejection("Row missing id".to_string()))
}

fn first_row(rows: Vec<Value>) -> CoreResult<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| CoreError::RemoteRejection("No row returned by insert".to_string()))
}

#[async_trait]
impl ListingRepository for RestGateway {
    async fn create_listing(&self, listing: &Listing) -> CoreResult<Uuid> {
        let row = self.insert("listings", encode(listing)?).await?;
        returned_id(&row)
    }

    async fn get_listing(&self, id: Uuid) -> CoreResult<Option<Listing>> {
        let rows = self
            .select("listings", &[("id", format!("eq.{}", id))])
            .await?;
        Ok(decode_rows::<Listing>(rows)?.into_iter().next())
    }

    async fn list_published(&self) -> CoreResult<Vec<Listing>> {
        let rows = self
            .select(
                "listings",
                &[
                    ("status", "eq.PUBLISHED".to_string()),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;
        decode_rows(rows)
    }

    async fn list_by_host(&self, host_user_id: Uuid) -> CoreResult<Vec<Listing>> {
        let rows = self
            .select(
                "listings",
                &[
                    ("host_user_id", format!("eq.{}", host_user_id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;
        decode_rows(rows)
    }

    async fn update_listing(&self, id: Uuid, listing: &Listing) -> CoreResult<()> {
        self.update("listings", encode(listing)?, &[("id", format!("eq.{}", id))])
            .await
    }

    async fn delete_listing(&self, id: Uuid) -> CoreResult<()> {
        self.delete("listings", &[("id", format!("eq.{}", id))]).await
    }
}

#[async_trait]
impl ReservationRepository for RestGateway {
    async fn create_reservation(&self, reservation: &Reservation) -> CoreResult<Uuid> {
        let row = self.insert("reservations", encode(reservation)?).await?;
        returned_id(&row)
    }

    async fn get_reservation(&self, id: Uuid) -> CoreResult<Option<Reservation>> {
        let rows = self
            .select("reservations", &[("id", format!("eq.{}", id))])
            .await?;
        Ok(decode_rows::<Reservation>(rows)?.into_iter().next())
    }

    async fn list_blocking_for_listing(&self, listing_id: Uuid) -> CoreResult<Vec<Reservation>> {
        let rows = self
            .select(
                "reservations",
                &[
                    ("listing_id", format!("eq.{}", listing_id)),
                    ("status", "neq.CANCELLED".to_string()),
                ],
            )
            .await?;
        decode_rows(rows)
    }

    async fn list_for_guest(&self, guest_user_id: Uuid) -> CoreResult<Vec<Reservation>> {
        let rows = self
            .select(
                "reservations",
                &[
                    ("guest_user_id", format!("eq.{}", guest_user_id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await?;
        decode_rows(rows)
    }
}

#[async_trait]
impl FavoriteRepository for RestGateway {
    async fn list_favorite_ids(&self, user_id: Uuid) -> CoreResult<Vec<Uuid>> {
        let rows = self
            .select("favorites", &[("user_id", format!("eq.{}", user_id))])
            .await?;
        rows.iter()
            .map(|row| {
                row["listing_id"]
                    .as_str()
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(|| {
                        CoreError::RemoteRejection("Favorite row missing listing_id".to_string())
                    })
            })
            .collect()
    }

    async fn add_favorite(&self, user_id: Uuid, listing_id: Uuid) -> CoreResult<()> {
        self.insert(
            "favorites",
            json!({ "user_id": user_id, "listing_id": listing_id }),
        )
        .await
        .map(|_| ())
    }

    async fn remove_favorite(&self, user_id: Uuid, listing_id: Uuid) -> CoreResult<()> {
        self.delete(
            "favorites",
            &[
                ("user_id", format!("eq.{}", user_id)),
                ("listing_id", format!("eq.{}", listing_id)),
            ],
        )
        .await
    }
}

#[async_trait]
impl RankingApi for RestGateway {
    async fn get_trending(&self, window_days: u32) -> CoreResult<Vec<TrendingEntry>> {
        let value = self
            .rpc("get_trending_listings", json!({ "days_window": window_days }))
            .await?;
        serde_json::from_value(value)
            .map_err(|e| CoreError::RemoteRejection(format!("Malformed trending rows: {}", e)))
    }

    async fn record_click(&self, listing_id: Uuid) -> CoreResult<()> {
        self.rpc(
            "increment_listing_click",
            json!({ "listing_id_param": listing_id }),
        )
        .await
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_takes_the_inserted_representation() {
        let id = Uuid::new_v4();
        let row = first_row(vec![json!({ "id": id })]).unwrap();
        assert_eq!(returned_id(&row).unwrap(), id);

        assert!(matches!(
            first_row(vec![]),
            Err(CoreError::RemoteRejection(_))
        ));
    }

    #[test]
    fn test_returned_id_requires_a_uuid() {
        assert!(returned_id(&json!({ "id": "not-a-uuid" })).is_err());
        assert!(returned_id(&json!({})).is_err());
    }

    #[test]
    fn test_constraint_body_translated_for_the_booking_flow() {
        let body = r#"duplicate key violates exclusion constraint "reservations_no_overlap""#;
        assert_eq!(
            reject_message(body),
            "Selected dates overlap with an existing reservation"
        );
        assert_eq!(reject_message("row level security"), "row level security");
    }
}
