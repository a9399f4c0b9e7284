use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("You are not allowed to perform this operation")]
    Forbidden,
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ClientError {
    /// Builds an error from a non-success response, unwrapping the server's
    /// `{"message": ...}` body when there is one.
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::FORBIDDEN {
            return ClientError::Forbidden;
        }
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("Unexpected response")
                        .to_string()
                } else {
                    body.trim().to_string()
                }
            });
        ClientError::Server {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Forbidden => Some(StatusCode::FORBIDDEN.as_u16()),
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            ClientError::NotLoggedIn | ClientError::InvalidUrl(_) => None,
        }
    }
}
