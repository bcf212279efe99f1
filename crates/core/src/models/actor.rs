use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::SalonError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorRole {
    Client,
    Admin,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Client => "client",
            ActorRole::Admin => "admin",
        }
    }
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActorRole {
    type Err = SalonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(ActorRole::Client),
            "admin" => Ok(ActorRole::Admin),
            other => Err(SalonError::Authentication(format!("Unknown role '{}'", other))),
        }
    }
}

/// The party performing a request, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn client(id: Uuid) -> Self {
        Self {
            id,
            role: ActorRole::Client,
        }
    }

    pub fn admin(id: Uuid) -> Self {
        Self {
            id,
            role: ActorRole::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ActorRole::Admin
    }

    /// Admins act on any appointment, clients only on their own.
    pub fn may_act_for(&self, client_id: Uuid) -> bool {
        self.is_admin() || self.id == client_id
    }
}
