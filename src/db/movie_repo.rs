use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{movie, prelude::Movie};
use super::{StoreResult, classify};

pub async fn create_movie(
    db: &DatabaseConnection,
    title: &str,
    description: &str,
    release_date: DateTime<FixedOffset>,
) -> StoreResult<movie::Model> {
    let model = movie::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        release_date: Set(release_date),
        ..Default::default()
    };
    model.insert(db).await.map_err(classify)
}

pub async fn find_by_id(db: &DatabaseConnection, id: &Uuid) -> StoreResult<Option<movie::Model>> {
    Movie::find_by_id(*id).one(db).await.map_err(classify)
}

pub async fn title_exists(db: &DatabaseConnection, title: &str) -> StoreResult<bool> {
    let found = Movie::find()
        .filter(movie::Column::Title.eq(title))
        .one(db)
        .await
        .map_err(classify)?;
    Ok(found.is_some())
}

/// One page of movies in insertion order, plus the unpaged total.
pub async fn page(
    db: &DatabaseConnection,
    page: u64,
    page_size: u64,
) -> StoreResult<(Vec<movie::Model>, u64)> {
    let paginator = Movie::find()
        .order_by_asc(movie::Column::CreatedAt)
        .paginate(db, page_size);
    let total = paginator.num_items().await.map_err(classify)?;
    let movies = paginator
        .fetch_page(page.saturating_sub(1))
        .await
        .map_err(classify)?;
    Ok((movies, total))
}

pub async fn find_by_ids(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> StoreResult<Vec<movie::Model>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Movie::find()
        .filter(movie::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(classify)
}

pub async fn update_movie(
    db: &DatabaseConnection,
    movie: movie::Model,
    title: Option<String>,
    description: Option<String>,
    release_date: Option<DateTime<FixedOffset>>,
) -> StoreResult<movie::Model> {
    let mut active: movie::ActiveModel = movie.into();
    if let Some(title) = title {
        active.title = Set(title);
    }
    if let Some(description) = description {
        active.description = Set(description);
    }
    if let Some(release_date) = release_date {
        active.release_date = Set(release_date);
    }
    active.update(db).await.map_err(classify)
}

pub async fn delete_movie(db: &DatabaseConnection, id: &Uuid) -> StoreResult<bool> {
    let result = Movie::delete_by_id(*id).exec(db).await.map_err(classify)?;
    Ok(result.rows_affected > 0)
}
