use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{Role, jwt::jwt_auth, role_layer::RequireRoleLayer},
    error::AppError,
    services::user_service::{self, LoginResponse, UserProfile},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub name: String,
    pub password: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/users/{id}", get(get_user))
        .layer(RequireRoleLayer::new(Role::Admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state);

    public.merge(admin)
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    // Self-registration never grants admin; admins are seeded from config.
    let user =
        user_service::register(&state.db, &body.name, &body.email, &body.password, false).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = user_service::login(&state.db, &state.jwt, &body.name, &body.password).await?;
    Ok(Json(response))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    let user = user_service::find_user(&state.db, &id).await?;
    Ok(Json(user))
}
