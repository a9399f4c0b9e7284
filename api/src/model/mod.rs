pub mod auth;
pub mod checkin;
pub mod facility;
pub mod guest;
pub mod list;
pub mod log;
pub mod summary;
pub mod template;
pub mod time;
pub mod user;
