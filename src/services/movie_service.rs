use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{StoreError, entities::movie, entities::review, movie_repo, review_repo},
    error::AppError,
    services::{rating, review_service::ReviewDetail},
};

const DUPLICATE_TITLE: &str = "Movie title already exists. Please choose a different title.";
const MOVIE_NOT_FOUND: &str = "Movie not found";

/// Release dates default to eight hours past "now" when the caller omits
/// them. A fixed offset, not timezone logic.
const DEFAULT_RELEASE_OFFSET_HOURS: i64 = 8;

#[derive(Debug)]
pub struct CreateMovieInput {
    pub title: String,
    pub description: String,
    pub release_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Default)]
pub struct UpdateMovieInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub release_date: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize)]
pub struct MovieSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub release_date: DateTime<FixedOffset>,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub user_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<FixedOffset>,
    pub last_updated: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Serialize)]
pub struct MovieView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub release_date: DateTime<FixedOffset>,
    pub average_rating: f64,
    pub reviews: Vec<ReviewView>,
}

#[derive(Debug, Serialize)]
pub struct MoviePage {
    pub data: Vec<MovieView>,
    pub total_count: u64,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Serialize)]
pub struct MovieRatingView {
    pub movie_title: String,
    pub average_rating: f64,
    pub total_reviews: u64,
}

pub async fn list_movies(
    db: &DatabaseConnection,
    page: u64,
    page_size: u64,
) -> Result<MoviePage, AppError> {
    if page < 1 || page_size < 1 {
        return Err(AppError::bad_request(
            "page and page_size must both be at least 1",
        ));
    }

    let (movies, total_count) = movie_repo::page(db, page, page_size).await?;
    let total_pages = total_count.div_ceil(page_size);

    let movie_ids: Vec<Uuid> = movies.iter().map(|m| m.id).collect();
    let reviews = review_repo::list_for_movies_with_users(db, movie_ids).await?;

    let mut by_movie: HashMap<Uuid, Vec<ReviewView>> = HashMap::new();
    let mut ratings: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for (review, user) in reviews {
        ratings.entry(review.movie_id).or_default().push(review.rating);
        by_movie
            .entry(review.movie_id)
            .or_default()
            .push(review_view(review, user.map(|u| u.name)));
    }

    let data = movies
        .into_iter()
        .map(|m| {
            let movie_ratings = ratings.remove(&m.id).unwrap_or_default();
            let reviews = by_movie.remove(&m.id).unwrap_or_default();
            movie_view(m, reviews, &movie_ratings)
        })
        .collect();

    Ok(MoviePage {
        data,
        total_count,
        total_pages,
        has_next_page: page < total_pages,
        has_previous_page: page > 1,
    })
}

pub async fn create_movie(
    db: &DatabaseConnection,
    input: CreateMovieInput,
) -> Result<MovieSummary, AppError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Title is required."));
    }
    if input.description.trim().is_empty() {
        return Err(AppError::bad_request("Description is required."));
    }

    // Optimistic pre-check; the unique index on title catches race losers
    // below and both paths report the same conflict.
    if movie_repo::title_exists(db, title).await? {
        return Err(AppError::conflict(DUPLICATE_TITLE));
    }

    let release_date = input.release_date.unwrap_or_else(|| {
        (Utc::now() + Duration::hours(DEFAULT_RELEASE_OFFSET_HOURS)).fixed_offset()
    });

    let movie = movie_repo::create_movie(db, title, &input.description, release_date)
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation(_) => AppError::conflict(DUPLICATE_TITLE),
            other => other.into(),
        })?;

    Ok(MovieSummary {
        id: movie.id,
        title: movie.title,
        description: movie.description,
        release_date: movie.release_date,
        rating: 0.0,
    })
}

pub async fn get_movie(db: &DatabaseConnection, id: &Uuid) -> Result<MovieView, AppError> {
    let movie = require_movie(db, id).await?;
    let reviews = review_repo::list_with_users(db, Some(id)).await?;

    let ratings: Vec<i32> = reviews.iter().map(|(r, _)| r.rating).collect();
    let reviews = reviews
        .into_iter()
        .map(|(review, user)| review_view(review, user.map(|u| u.name)))
        .collect();

    Ok(movie_view(movie, reviews, &ratings))
}

pub async fn update_movie(
    db: &DatabaseConnection,
    id: &Uuid,
    input: UpdateMovieInput,
) -> Result<MovieSummary, AppError> {
    let movie = require_movie(db, id).await?;

    // Empty strings count as "not supplied" for a partial update.
    let title = input
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let description = input.description.filter(|d| !d.trim().is_empty());

    if let Some(new_title) = &title {
        if *new_title != movie.title && movie_repo::title_exists(db, new_title).await? {
            return Err(AppError::conflict(DUPLICATE_TITLE));
        }
    }

    let movie = movie_repo::update_movie(db, movie, title, description, input.release_date)
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation(_) => AppError::conflict(DUPLICATE_TITLE),
            other => other.into(),
        })?;

    let reviews = review_repo::list_for_movie(db, &movie.id).await?;
    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();

    Ok(MovieSummary {
        id: movie.id,
        title: movie.title,
        description: movie.description,
        release_date: movie.release_date,
        rating: rating::aggregate(&ratings).average_rating,
    })
}

pub async fn delete_movie(db: &DatabaseConnection, id: &Uuid) -> Result<(), AppError> {
    let deleted = movie_repo::delete_movie(db, id).await?;
    if !deleted {
        return Err(AppError::not_found(MOVIE_NOT_FOUND));
    }
    Ok(())
}

pub async fn reviews_for_movie(
    db: &DatabaseConnection,
    movie_id: &Uuid,
) -> Result<Vec<ReviewDetail>, AppError> {
    let movie = require_movie(db, movie_id).await?;
    let reviews = review_repo::list_with_users(db, Some(movie_id)).await?;

    Ok(reviews
        .into_iter()
        .map(|(review, user)| ReviewDetail {
            id: review.id,
            user_name: user.map(|u| u.name).unwrap_or_else(|| "Unknown User".into()),
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
            last_updated: review.last_updated,
            movie_title: movie.title.clone(),
        })
        .collect())
}

/// Zero reviews is not an error: an existing movie without reviews reports a
/// zero-valued aggregate, and only an absent movie is NotFound.
pub async fn movie_rating(
    db: &DatabaseConnection,
    movie_id: &Uuid,
) -> Result<MovieRatingView, AppError> {
    let movie = require_movie(db, movie_id).await?;
    let reviews = review_repo::list_for_movie(db, movie_id).await?;
    let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
    let summary = rating::aggregate(&ratings);

    Ok(MovieRatingView {
        movie_title: movie.title,
        average_rating: summary.average_rating,
        total_reviews: summary.total_reviews,
    })
}

pub async fn require_movie(db: &DatabaseConnection, id: &Uuid) -> Result<movie::Model, AppError> {
    movie_repo::find_by_id(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(MOVIE_NOT_FOUND))
}

fn review_view(review: review::Model, user_name: Option<String>) -> ReviewView {
    ReviewView {
        id: review.id,
        user_name: user_name.unwrap_or_else(|| "Unknown User".into()),
        rating: review.rating,
        comment: review.comment,
        created_at: review.created_at,
        last_updated: review.last_updated,
    }
}

fn movie_view(movie: movie::Model, reviews: Vec<ReviewView>, ratings: &[i32]) -> MovieView {
    MovieView {
        id: movie.id,
        title: movie.title,
        description: movie.description,
        release_date: movie.release_date,
        average_rating: rating::aggregate(ratings).average_rating,
        reviews,
    }
}
