use hearth_core::feed::{ChangeEvent, ChangeFeed, ChangeFilter, Subscription};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 64;

/// In-process dispatch hub for backend change notifications. The transport
/// (websocket frames from the hosted backend) pushes into `publish`;
/// consumers subscribe per table with an optional column filter. Events with
/// no live subscribers are dropped, as are deliveries to receivers torn down
/// mid-flight.
pub struct ChangeFeedHub {
    channels: Mutex<HashMap<String, broadcast::Sender<ChangeEvent>>>,
}

impl Default for ChangeFeedHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeedHub {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, table: &str) -> broadcast::Sender<ChangeEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(table.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Deliver one change to current subscribers of a table.
    pub fn publish(&self, table: &str, event: ChangeEvent) {
        let sender = self.sender(table);
        let delivered = sender.send(event).unwrap_or(0);
        debug!("Change on {} delivered to {} subscribers", table, delivered);
    }
}

impl ChangeFeed for ChangeFeedHub {
    fn subscribe(&self, table: &str, filter: Option<ChangeFilter>) -> Subscription {
        Subscription::new(self.sender(table).subscribe(), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_reaches_table_subscribers_only() {
        let hub = ChangeFeedHub::new();
        let mut favorites = hub.subscribe("favorites", None);

        hub.publish("listings", ChangeEvent::Insert(json!({"id": "x"})));
        hub.publish("favorites", ChangeEvent::Insert(json!({"id": "y"})));

        let event = favorites.next().await.unwrap();
        assert_eq!(event.row()["id"], "y");
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_silent() {
        let hub = ChangeFeedHub::new();
        // No receiver registered; must not panic or error.
        hub.publish("reservations", ChangeEvent::Delete(json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_filtered_subscription() {
        let hub = ChangeFeedHub::new();
        let mut mine = hub.subscribe("favorites", Some(ChangeFilter::eq("user_id", "u1")));

        hub.publish("favorites", ChangeEvent::Insert(json!({"user_id": "u2"})));
        hub.publish(
            "favorites",
            ChangeEvent::Insert(json!({"user_id": "u1", "listing_id": "l9"})),
        );

        let event = mine.next().await.unwrap();
        assert_eq!(event.row()["listing_id"], "l9");
    }
}
