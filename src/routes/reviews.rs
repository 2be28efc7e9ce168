use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    middleware,
    routing::{get, put},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{Claims, jwt::jwt_auth},
    error::AppError,
    services::review_service::{self, DeleteResult, ReviewDetail},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/reviews", get(list_reviews))
        .route("/reviews/{id}", get(get_review))
        .with_state(state.clone());

    let authenticated = Router::new()
        .route("/reviews/{id}", put(update_review).delete(delete_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state);

    public.merge(authenticated)
}

async fn list_reviews(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ReviewDetail>>, AppError> {
    let reviews = review_service::list_reviews(&state.db).await?;
    Ok(Json(reviews))
}

async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReviewDetail>, AppError> {
    let review = review_service::get_review(&state.db, &id).await?;
    Ok(Json(review))
}

async fn update_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    claims: Claims,
    Json(body): Json<UpdateReviewRequest>,
) -> Result<Json<ReviewDetail>, AppError> {
    let review =
        review_service::update_review(&state.db, &id, &claims, body.rating, body.comment).await?;
    Ok(Json(review))
}

async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    claims: Claims,
) -> Result<Json<DeleteResult>, AppError> {
    let result = review_service::delete_review(&state.db, &id, &claims).await?;
    Ok(Json(result))
}
