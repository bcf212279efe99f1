use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Master {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    /// Rest time the master needs after every appointment.
    pub break_minutes: i32,
}

impl Master {
    pub fn break_duration(&self) -> Duration {
        Duration::minutes(i64::from(self.break_minutes.max(0)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    /// Price in minor currency units.
    pub price: i64,
    pub is_active: bool,
}

impl Service {
    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }
}

/// Contact details used to deliver notifications to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContact {
    pub id: Uuid,
    pub name: String,
    pub telegram_id: Option<i64>,
}
