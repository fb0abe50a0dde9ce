use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `active <=> end_time.is_none()`. For any vehicle, at most one active
/// rental exists at any instant — enforced by `fleet-coordinator`, not by
/// this type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Rental {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Rental {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, vehicle_id: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            vehicle_id: vehicle_id.into(),
            start_time,
            end_time: None,
            active: true,
        }
    }

    pub fn end(&mut self, at: DateTime<Utc>) {
        self.end_time = Some(at);
        self.active = false;
    }
}
