use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{Claims, Role, jwt::jwt_auth, role_layer::RequireRoleLayer},
    error::AppError,
    services::{
        movie_service::{
            self, CreateMovieInput, MoviePage, MovieRatingView, MovieSummary, MovieView,
            UpdateMovieInput,
        },
        review_service::{self, ReviewDetail},
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: String,
    pub release_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub comment: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
        .route("/movies/{id}/reviews", get(reviews_for_movie))
        .route("/movies/{id}/rating", get(movie_rating))
        .with_state(state.clone());

    let authenticated = Router::new()
        .route("/movies/{id}/reviews", post(create_review))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/movies", post(create_movie))
        .route("/movies/{id}", put(update_movie).delete(delete_movie))
        .layer(RequireRoleLayer::new(Role::Admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth))
        .with_state(state);

    public.merge(authenticated).merge(admin)
}

async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<MoviePage>, AppError> {
    let page = movie_service::list_movies(&state.db, pagination.page, pagination.page_size).await?;
    Ok(Json(page))
}

async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateMovieRequest>,
) -> Result<(StatusCode, Json<MovieSummary>), AppError> {
    let movie = movie_service::create_movie(
        &state.db,
        CreateMovieInput {
            title: body.title,
            description: body.description,
            release_date: body.release_date,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MovieView>, AppError> {
    let movie = movie_service::get_movie(&state.db, &id).await?;
    Ok(Json(movie))
}

async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMovieRequest>,
) -> Result<Json<MovieSummary>, AppError> {
    let movie = movie_service::update_movie(
        &state.db,
        &id,
        UpdateMovieInput {
            title: body.title,
            description: body.description,
            release_date: body.release_date,
        },
    )
    .await?;
    Ok(Json(movie))
}

async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    movie_service::delete_movie(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn reviews_for_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ReviewDetail>>, AppError> {
    let reviews = movie_service::reviews_for_movie(&state.db, &id).await?;
    Ok(Json(reviews))
}

async fn movie_rating(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MovieRatingView>, AppError> {
    let rating = movie_service::movie_rating(&state.db, &id).await?;
    Ok(Json(rating))
}

async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    claims: Claims,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewDetail>), AppError> {
    let review =
        review_service::create_review(&state.db, &id, &claims, body.rating, &body.comment).await?;
    Ok((StatusCode::CREATED, Json(review)))
}
