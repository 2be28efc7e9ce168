use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{
        Role,
        jwt::{encode_token, make_claims},
        password::{hash_password, verify_password},
    },
    db::{StoreError, review_repo, user_repo},
    error::AppError,
    state::JwtKeys,
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// User record as exposed outward. The password hash never leaves the
/// service layer.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Vec<ReviewSummary>>,
}

#[derive(Debug, Serialize)]
pub struct ReviewSummary {
    pub id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<FixedOffset>,
    pub movie_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

pub async fn register(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    is_admin: bool,
) -> Result<UserProfile, AppError> {
    let name = name.trim();
    let email = email.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Name is required."));
    }
    if !valid_email(email) {
        return Err(AppError::bad_request("Invalid email format."));
    }

    // Name and email collisions are reported separately; the unique indexes
    // backstop the pre-checks under concurrent registration.
    if user_repo::find_by_name(db, name).await?.is_some() {
        return Err(AppError::conflict("Name already exists"));
    }
    if user_repo::find_by_email(db, email).await?.is_some() {
        return Err(AppError::conflict("Email already exists"));
    }

    let password_hash = hash_password(password)?;
    let role = if is_admin { Role::Admin } else { Role::User };

    let user = user_repo::create_user(db, name, email, &password_hash, role.as_str())
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation(_) => AppError::conflict("Name or email already exists"),
            other => other.into(),
        })?;

    Ok(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        role,
        reviews: None,
    })
}

pub async fn login(
    db: &DatabaseConnection,
    jwt: &JwtKeys,
    name: &str,
    password: &str,
) -> Result<LoginResponse, AppError> {
    // Absent user and wrong password produce the same failure; nothing in
    // the response says which field was wrong.
    let user = user_repo::find_by_name(db, name)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let claims = make_claims(&user);
    let token = encode_token(jwt, &claims)?;

    Ok(LoginResponse {
        token,
        id: user.id,
        name: user.name,
        role: claims.role,
    })
}

pub async fn find_user(db: &DatabaseConnection, id: &Uuid) -> Result<UserProfile, AppError> {
    let user = user_repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let reviews = review_repo::list_for_user(db, &user.id)
        .await?
        .into_iter()
        .map(|r| ReviewSummary {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at,
            movie_id: r.movie_id,
        })
        .collect();

    Ok(UserProfile {
        id: user.id,
        name: user.name,
        email: user.email,
        role: Role::try_from(user.role.as_str()).unwrap_or(Role::User),
        reviews: Some(reviews),
    })
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::valid_email;

    #[test]
    fn email_format_check() {
        assert!(valid_email("alice@example.com"));
        assert!(valid_email("a.b@sub.example.org"));
        assert!(!valid_email("alice"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("alice@example"));
        assert!(!valid_email("alice@.com"));
        assert!(!valid_email("alice@example."));
    }
}
