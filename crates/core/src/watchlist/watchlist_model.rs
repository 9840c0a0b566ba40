use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::properties::Property;

/// A property the user is following.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}
