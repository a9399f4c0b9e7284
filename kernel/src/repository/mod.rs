pub mod auth;
pub mod checkin;
pub mod facility;
pub mod guest;
pub mod health;
pub mod log;
pub mod template;
pub mod user;
