pub mod movie_service;
pub mod rating;
pub mod review_service;
pub mod user_service;
