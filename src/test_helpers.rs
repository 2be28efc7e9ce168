use std::sync::Arc;

use axum::Router;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};

use crate::{routes::router, state::AppState};

/// Router over a mock connection, for tests that never reach the database
/// (auth rejections, request validation).
pub fn test_router(secret: &[u8]) -> Router {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    router_with_db(secret, db)
}

pub fn router_with_db(secret: &[u8], db: DatabaseConnection) -> Router {
    let state = AppState::new(secret, db);
    router(Arc::clone(&state))
}
