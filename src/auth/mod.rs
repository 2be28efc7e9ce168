pub mod jwt;
pub mod password;
pub mod role_layer;

use axum::{extract::FromRequestParts, http::StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// Token payload issued at login. Ownership checks compare `sub` against the
/// entity's owner; role checks use `role` directly.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,    // user id
    pub name: String, // display name
    pub role: Role,
    pub exp: usize, // expiry (unix)
    pub iat: usize, // issued at
}

// Helper extractor: pull JWT claims from request extensions.
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or((StatusCode::UNAUTHORIZED, "No claims in request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        assert_eq!(Role::try_from(Role::Admin.as_str()), Ok(Role::Admin));
        assert_eq!(Role::try_from(Role::User.as_str()), Ok(Role::User));
        assert_eq!(Role::try_from("superuser"), Err(()));
    }
}
