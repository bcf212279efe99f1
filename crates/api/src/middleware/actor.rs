//! # Actor Extraction
//!
//! Authentication happens at the gateway in front of this service. The
//! gateway forwards the caller's identity in two headers, which this
//! extractor turns into an [`Actor`]:
//!
//! - `X-Actor-Id`: the caller's UUID
//! - `X-Actor-Role`: `client` or `admin`
//!
//! A missing or malformed header rejects the request with 401.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderName, request::Parts},
};
use salon_core::errors::SalonError;
use salon_core::models::actor::{Actor, ActorRole};
use uuid::Uuid;

use super::error_handling::AppError;

pub const ACTOR_ID_HEADER: HeaderName = HeaderName::from_static("x-actor-id");
pub const ACTOR_ROLE_HEADER: HeaderName = HeaderName::from_static("x-actor-role");

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentActor(pub Actor);

fn header<'a>(parts: &'a Parts, name: &HeaderName) -> Result<&'a str, SalonError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| SalonError::Authentication(format!("Missing {} header", name)))?
        .to_str()
        .map_err(|_| SalonError::Authentication(format!("Malformed {} header", name)))
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header(parts, &ACTOR_ID_HEADER)?;
        let id = Uuid::parse_str(id.trim())
            .map_err(|_| SalonError::Authentication(format!("Invalid actor id '{}'", id)))?;
        let role: ActorRole = header(parts, &ACTOR_ROLE_HEADER)?.parse()?;

        Ok(CurrentActor(Actor { id, role }))
    }
}
