use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{Claims, Role},
    db::{
        StoreError,
        entities::{review, user},
        movie_repo, review_repo, user_repo,
    },
    error::AppError,
    services::movie_service,
};

const REVIEW_NOT_FOUND: &str = "Review not found";
const USER_NOT_FOUND: &str = "User not found";
const DUPLICATE_REVIEW: &str = "You have already reviewed this movie.";
const MAX_COMMENT_LEN: usize = 1000;

#[derive(Debug, Serialize)]
pub struct ReviewDetail {
    pub id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<FixedOffset>,
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub movie_title: String,
}

/// State machine per (user, movie): no review -> reviewed -> updated* ->
/// deleted. The composite unique key keeps concurrent duplicate creates from
/// slipping past the pre-check.
pub async fn create_review(
    db: &DatabaseConnection,
    movie_id: &Uuid,
    claims: &Claims,
    rating: i32,
    comment: &str,
) -> Result<ReviewDetail, AppError> {
    let movie = movie_service::require_movie(db, movie_id).await?;
    let user = require_user(db, &claims.sub).await?;

    validate_rating(rating)?;
    let comment = comment.trim();
    if comment.is_empty() {
        return Err(AppError::bad_request("Comment is required."));
    }

    if review_repo::find_by_user_and_movie(db, &user.id, movie_id)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(DUPLICATE_REVIEW));
    }

    let review = review_repo::create_review(db, &user.id, movie_id, rating, comment)
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation(_) => AppError::conflict(DUPLICATE_REVIEW),
            other => other.into(),
        })?;

    Ok(detail(review, user.name, movie.title))
}

pub async fn get_review(db: &DatabaseConnection, id: &Uuid) -> Result<ReviewDetail, AppError> {
    let review = require_review(db, id).await?;
    let user_name = user_repo::find_by_id(db, &review.user_id)
        .await?
        .map(|u| u.name)
        .unwrap_or_else(|| "Unknown User".into());
    let movie_title = movie_repo::find_by_id(db, &review.movie_id)
        .await?
        .map(|m| m.title)
        .unwrap_or_else(|| "Unknown Movie".into());

    Ok(detail(review, user_name, movie_title))
}

/// Administrative/debug listing: every review with reviewer and movie names,
/// no pagination.
pub async fn list_reviews(db: &DatabaseConnection) -> Result<Vec<ReviewDetail>, AppError> {
    let reviews = review_repo::list_with_users(db, None).await?;

    let movie_ids: Vec<Uuid> = reviews.iter().map(|(r, _)| r.movie_id).collect();
    let titles: std::collections::HashMap<Uuid, String> = movie_repo::find_by_ids(db, movie_ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m.title))
        .collect();

    Ok(reviews
        .into_iter()
        .map(|(review, user)| {
            let movie_title = titles
                .get(&review.movie_id)
                .cloned()
                .unwrap_or_else(|| "Unknown Movie".into());
            let user_name = user.map(|u| u.name).unwrap_or_else(|| "Unknown User".into());
            detail(review, user_name, movie_title)
        })
        .collect())
}

pub async fn update_review(
    db: &DatabaseConnection,
    review_id: &Uuid,
    claims: &Claims,
    rating: Option<i32>,
    comment: Option<String>,
) -> Result<ReviewDetail, AppError> {
    let review = require_review(db, review_id).await?;
    let acting_user = require_user(db, &claims.sub).await?;
    authorize(&review, &acting_user, "You can only update your own reviews")?;

    // A blank comment counts as "not supplied".
    let comment = comment.filter(|c| !c.trim().is_empty());
    if rating.is_none() && comment.is_none() {
        return Err(AppError::bad_request(
            "You must provide at least a rating or a comment to update",
        ));
    }
    if let Some(rating) = rating {
        validate_rating(rating)?;
    }
    if let Some(comment) = &comment {
        if comment.chars().count() > MAX_COMMENT_LEN {
            return Err(AppError::bad_request("Comment cannot exceed 1000 characters."));
        }
    }

    let movie_title = movie_repo::find_by_id(db, &review.movie_id)
        .await?
        .map(|m| m.title)
        .unwrap_or_else(|| "Unknown Movie".into());
    let owner_name = if review.user_id == acting_user.id {
        acting_user.name.clone()
    } else {
        user_repo::find_by_id(db, &review.user_id)
            .await?
            .map(|u| u.name)
            .unwrap_or_else(|| "Unknown User".into())
    };

    let review = review_repo::update_review(db, review, rating, comment).await?;

    Ok(detail(review, owner_name, movie_title))
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    pub message: String,
}

pub async fn delete_review(
    db: &DatabaseConnection,
    review_id: &Uuid,
    claims: &Claims,
) -> Result<DeleteResult, AppError> {
    let review = require_review(db, review_id).await?;
    let acting_user = require_user(db, &claims.sub).await?;
    authorize(&review, &acting_user, "You can only delete your own reviews")?;

    review_repo::delete_review(db, &review.id).await?;

    Ok(DeleteResult {
        success: true,
        message: "Review deleted successfully".to_string(),
    })
}

fn authorize(
    review: &review::Model,
    acting_user: &user::Model,
    denial: &'static str,
) -> Result<(), AppError> {
    let is_admin = acting_user.role == Role::Admin.as_str();
    if review.user_id != acting_user.id && !is_admin {
        return Err(AppError::forbidden(denial));
    }
    Ok(())
}

fn validate_rating(rating: i32) -> Result<(), AppError> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::bad_request("Rating must be between 1 and 5."));
    }
    Ok(())
}

async fn require_review(db: &DatabaseConnection, id: &Uuid) -> Result<review::Model, AppError> {
    review_repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(REVIEW_NOT_FOUND))
}

async fn require_user(db: &DatabaseConnection, id: &Uuid) -> Result<user::Model, AppError> {
    user_repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(USER_NOT_FOUND))
}

fn detail(review: review::Model, user_name: String, movie_title: String) -> ReviewDetail {
    ReviewDetail {
        id: review.id,
        user_name,
        rating: review.rating,
        comment: review.comment,
        created_at: review.created_at,
        last_updated: review.last_updated,
        movie_title,
    }
}
