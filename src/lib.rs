pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod routes;
pub mod services;
pub mod state;
pub mod test_helpers;
