//! Catalog event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ticketlive_core::{EventId, Price};

/// A ticketed event as delivered by `GET /events`.
///
/// Cart lines embed a snapshot of this record at add-time; the catalog is
/// never re-fetched to refresh lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    /// Display time (e.g. "20:00"); opaque to this client.
    pub time: String,
    pub location: String,
    pub capacity: u32,
    pub price: Price,
    pub image_url: String,
    /// Whether the event is on sale.
    pub status: bool,
    pub category: String,
}
