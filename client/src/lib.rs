//! HTTP clients for the check-in server.
//!
//! [`OAuthClient`] obtains and revokes tokens; [`FacilityClient`] wraps every
//! REST route and shares a [`LoginState`] so that an expired access token is
//! refreshed once before a request is retried.

pub mod error;
pub mod facility;
pub mod oauth;
pub mod state;

pub use error::{ClientError, ClientResult};
pub use facility::FacilityClient;
pub use oauth::OAuthClient;
pub use state::LoginState;
