use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::Router;
use sea_orm::{ConnectOptions, ConnectionTrait, Database};
use tower_http::trace::TraceLayer;

use movie_api::{
    auth::{Role, password},
    config::AppConfig,
    db::user_repo,
    logging::init_tracing,
    routes::router,
    state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env()?;
    init_tracing(&cfg.log_level);

    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(opt).await?;
    tracing::info!("syncing database schema from entities");
    db.get_schema_registry("movie_api::db::entities::*")
        .sync(&db)
        .await?;

    // One review per (user, movie); the index is the authoritative guard,
    // the application pre-check only gets there first.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_reviews_user_movie \
         ON reviews (user_id, movie_id)",
    )
    .await?;

    seed_admin(&cfg, &db).await?;

    let state = AppState::new(cfg.jwt_secret.as_bytes(), db);

    let app = Router::new()
        .merge(router(Arc::clone(&state)))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port")?;
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn seed_admin(cfg: &AppConfig, db: &sea_orm::DatabaseConnection) -> anyhow::Result<()> {
    if let Some(existing) = user_repo::find_by_name(db, &cfg.admin_name).await? {
        tracing::info!("admin user already present: {}", existing.name);
        return Ok(());
    }

    let hash = password::hash_password(&cfg.admin_password)
        .map_err(|e| anyhow::anyhow!("admin seed hash error: {}", e.message()))?;
    let user = user_repo::create_user(
        db,
        &cfg.admin_name,
        &cfg.admin_email,
        &hash,
        Role::Admin.as_str(),
    )
    .await?;
    tracing::info!("seeded admin user {}", user.name);
    Ok(())
}
