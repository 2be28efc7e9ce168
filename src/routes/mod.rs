use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod movies;
pub mod public;
pub mod reviews;
pub mod users;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public::router())
        .merge(users::router(state.clone()))
        .merge(movies::router(state.clone()))
        .merge(reviews::router(state))
}
