use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// A change pushed by the backend for one row of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "event", content = "row")]
pub enum ChangeEvent {
    Insert(serde_json::Value),
    Update(serde_json::Value),
    Delete(serde_json::Value),
}

impl ChangeEvent {
    pub fn row(&self) -> &serde_json::Value {
        match self {
            ChangeEvent::Insert(row) | ChangeEvent::Update(row) | ChangeEvent::Delete(row) => row,
        }
    }
}

/// Server-side style column filter, e.g. `user_id = <uuid>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeFilter {
    pub column: String,
    pub value: String,
}

impl ChangeFilter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            value: value.to_string(),
        }
    }

    fn matches(&self, event: &ChangeEvent) -> bool {
        match &event.row()[self.column.as_str()] {
            serde_json::Value::String(s) => s == &self.value,
            other => other.to_string() == self.value,
        }
    }
}

/// Contract over the backend's change-notification feed. Dropping the
/// returned subscription is teardown; events delivered afterwards go nowhere.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, table: &str, filter: Option<ChangeFilter>) -> Subscription;
}

/// A filtered receiver over one table's change stream.
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    filter: Option<ChangeFilter>,
}

impl Subscription {
    pub fn new(rx: broadcast::Receiver<ChangeEvent>, filter: Option<ChangeFilter>) -> Self {
        Self { rx, filter }
    }

    /// Next matching event, or `None` once the feed has shut down. Missed
    /// deliveries under lag are skipped silently; consumers re-fetch state
    /// rather than replaying history.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    let matches = self
                        .filter
                        .as_ref()
                        .map(|f| f.matches(&event))
                        .unwrap_or(true);
                    if matches {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Change feed lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
