use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    auth::{event::CreateToken, AccessToken, RefreshToken, TokenPair},
    id::UserId,
};

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<Option<UserId>>;
    // ユーザー名とパスワードを検証し、有効なユーザーの ID を返す
    async fn verify_user(&self, username: &str, password: &str) -> AppResult<UserId>;
    async fn create_token(&self, event: CreateToken) -> AppResult<TokenPair>;
    // リフレッシュトークンを消費してユーザー ID を返す
    async fn consume_refresh_token(&self, refresh_token: &RefreshToken) -> AppResult<Option<UserId>>;
    async fn delete_token(&self, access_token: AccessToken) -> AppResult<()>;
}
