pub mod api;
pub mod auth;
pub mod facility;
pub mod health;
pub mod log;
pub mod user;
