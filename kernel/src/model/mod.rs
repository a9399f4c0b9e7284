pub mod auth;
pub mod checkin;
pub mod facility;
pub mod guest;
pub mod id;
pub mod list;
pub mod log;
pub mod mats;
pub mod payment;
pub mod scope;
pub mod summary;
pub mod template;
pub mod user;
