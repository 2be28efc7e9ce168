use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};

use super::{Claims, Role};
use crate::{
    db::entities::user,
    error::AppError,
    state::{AppState, JwtKeys},
};

/// Login credentials are valid for two hours; there is no revocation, so the
/// lifetime is the only bound.
pub const TOKEN_TTL_SECS: usize = 2 * 60 * 60;

pub fn now_unix() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

pub fn make_claims(user: &user::Model) -> Claims {
    let iat = now_unix();
    Claims {
        sub: user.id,
        name: user.name.clone(),
        role: Role::try_from(user.role.as_str()).unwrap_or(Role::User),
        iat,
        exp: iat + TOKEN_TTL_SECS,
    }
}

pub fn encode_token(jwt: &JwtKeys, claims: &Claims) -> Result<String, AppError> {
    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".into());
    encode(&header, claims, &jwt.enc)
        .map_err(|err| AppError::internal(format!("token encoding failed: {err}")))
}

pub async fn jwt_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::unauthorized("Missing/invalid Authorization header").into_response()
    })?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &state.jwt.dec, &validation)
        .map_err(|_| AppError::unauthorized("Invalid or expired token").into_response())?;

    req.extensions_mut().insert(data.claims);

    Ok(next.run(req).await)
}
