pub mod checkin;
pub mod facility;
pub mod guest;
pub mod template;
pub mod user;
