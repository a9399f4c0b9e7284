use api::model::auth::{GrantType, TokenRequest, TokenResponse};
use reqwest::Client;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: Client,
    base_url: String,
}

impl OAuthClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn token_url(&self) -> String {
        format!("{}/oauth/token", self.base_url)
    }

    pub async fn password(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        self.request_token(&TokenRequest {
            grant_type: GrantType::Password,
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            refresh_token: None,
        })
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> ClientResult<TokenResponse> {
        self.request_token(&TokenRequest {
            grant_type: GrantType::RefreshToken,
            username: None,
            password: None,
            refresh_token: Some(refresh_token.to_string()),
        })
        .await
    }

    pub async fn revoke(&self, access_token: &str) -> ClientResult<()> {
        let res = self
            .http
            .delete(self.token_url())
            .bearer_auth(access_token)
            .send()
            .await?;
        if res.status().is_success() {
            return Ok(());
        }
        let status = res.status();
        Err(ClientError::from_body(status, &res.text().await?))
    }

    async fn request_token(&self, req: &TokenRequest) -> ClientResult<TokenResponse> {
        let res = self.http.post(self.token_url()).form(req).send().await?;
        let status = res.status();
        if status.is_success() {
            Ok(res.json().await?)
        } else {
            Err(ClientError::from_body(status, &res.text().await?))
        }
    }
}
