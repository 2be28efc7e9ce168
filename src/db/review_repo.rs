use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::{
    prelude::{Review, User},
    review, user,
};
use super::{StoreResult, classify};

pub async fn create_review(
    db: &DatabaseConnection,
    user_id: &Uuid,
    movie_id: &Uuid,
    rating: i32,
    comment: &str,
) -> StoreResult<review::Model> {
    let model = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        rating: Set(rating),
        comment: Set(comment.to_string()),
        created_at: Set(Utc::now().fixed_offset()),
        last_updated: Set(None),
        user_id: Set(*user_id),
        movie_id: Set(*movie_id),
    };
    model.insert(db).await.map_err(classify)
}

pub async fn find_by_id(db: &DatabaseConnection, id: &Uuid) -> StoreResult<Option<review::Model>> {
    Review::find_by_id(*id).one(db).await.map_err(classify)
}

pub async fn find_by_user_and_movie(
    db: &DatabaseConnection,
    user_id: &Uuid,
    movie_id: &Uuid,
) -> StoreResult<Option<review::Model>> {
    Review::find()
        .filter(review::Column::UserId.eq(*user_id))
        .filter(review::Column::MovieId.eq(*movie_id))
        .one(db)
        .await
        .map_err(classify)
}

pub async fn list_for_movie(
    db: &DatabaseConnection,
    movie_id: &Uuid,
) -> StoreResult<Vec<review::Model>> {
    Review::find()
        .filter(review::Column::MovieId.eq(*movie_id))
        .all(db)
        .await
        .map_err(classify)
}

/// Reviews joined with their authors, for endpoints that report reviewer
/// names. `movie_id = None` means all reviews.
pub async fn list_with_users(
    db: &DatabaseConnection,
    movie_id: Option<&Uuid>,
) -> StoreResult<Vec<(review::Model, Option<user::Model>)>> {
    let mut query = Review::find();
    if let Some(movie_id) = movie_id {
        query = query.filter(review::Column::MovieId.eq(*movie_id));
    }
    query.find_also_related(User).all(db).await.map_err(classify)
}

pub async fn list_for_movies_with_users(
    db: &DatabaseConnection,
    movie_ids: Vec<Uuid>,
) -> StoreResult<Vec<(review::Model, Option<user::Model>)>> {
    if movie_ids.is_empty() {
        return Ok(Vec::new());
    }
    Review::find()
        .filter(review::Column::MovieId.is_in(movie_ids))
        .find_also_related(User)
        .all(db)
        .await
        .map_err(classify)
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: &Uuid,
) -> StoreResult<Vec<review::Model>> {
    Review::find()
        .filter(review::Column::UserId.eq(*user_id))
        .all(db)
        .await
        .map_err(classify)
}

pub async fn update_review(
    db: &DatabaseConnection,
    review: review::Model,
    rating: Option<i32>,
    comment: Option<String>,
) -> StoreResult<review::Model> {
    let mut active: review::ActiveModel = review.into();
    if let Some(rating) = rating {
        active.rating = Set(rating);
    }
    if let Some(comment) = comment {
        active.comment = Set(comment);
    }
    active.last_updated = Set(Some(Utc::now().fixed_offset()));
    active.update(db).await.map_err(classify)
}

pub async fn delete_review(db: &DatabaseConnection, id: &Uuid) -> StoreResult<bool> {
    let result = Review::delete_by_id(*id).exec(db).await.map_err(classify)?;
    Ok(result.rows_affected > 0)
}
