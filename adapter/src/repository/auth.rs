use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use derive_new::new;
use kernel::{
    model::{
        auth::{event::CreateToken, AccessToken, RefreshToken, TokenPair},
        id::UserId,
    },
    repository::auth::AuthRepository,
};
use shared::error::{AppError, AppResult};

use crate::{
    database::{model::user::UserCredentialRow, ConnectionPool},
    redis::{
        model::{RedisKey, RedisValue},
        RedisClient,
    },
};

#[derive(new)]
pub struct AuthRepositoryImpl {
    db: ConnectionPool,
    kv: Arc<RedisClient>,
    ttl: u64,
    refresh_ttl: u64,
}

#[async_trait]
impl AuthRepository for AuthRepositoryImpl {
    async fn fetch_user_id_from_token(&self, access_token: &AccessToken) -> AppResult<Option<UserId>> {
        let key: AuthorizationKey = access_token.into();
        self.kv
            .get(&key)
            .await
            .map(|x| x.map(AuthorizedUserId::into_inner))
    }

    async fn verify_user(&self, username: &str, password: &str) -> AppResult<UserId> {
        let row = sqlx::query_as::<_, UserCredentialRow>(
            r#"
                SELECT user_id, password_hash, active
                FROM users
                WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        // 存在しないユーザーと無効なユーザーは区別せずに認証失敗とする
        let Some(row) = row.filter(|r| r.active) else {
            return Err(AppError::UnauthenticatedError);
        };

        let valid = crate::password::verify(password.to_string(), row.password_hash).await?;
        if !valid {
            return Err(AppError::UnauthenticatedError);
        }

        Ok(row.user_id)
    }

    async fn create_token(&self, event: CreateToken) -> AppResult<TokenPair> {
        let (access_key, refresh_key, value) = from(event);
        self.kv.set_ex(&access_key, &value, self.ttl).await?;
        self.kv.set_ex(&refresh_key, &value, self.refresh_ttl).await?;
        Ok(TokenPair {
            access_token: AccessToken(access_key.0),
            refresh_token: RefreshToken(refresh_key.0),
            expires_in: self.ttl,
            user_id: value.into_inner(),
        })
    }

    async fn consume_refresh_token(&self, refresh_token: &RefreshToken) -> AppResult<Option<UserId>> {
        let key = RefreshKey(refresh_token.0.clone());
        self.kv
            .take(&key)
            .await
            .map(|x| x.map(AuthorizedUserId::into_inner))
    }

    async fn delete_token(&self, access_token: AccessToken) -> AppResult<()> {
        let key: AuthorizationKey = access_token.into();
        self.kv.delete(&key).await
    }
}

pub struct AuthorizationKey(String);
pub struct RefreshKey(String);
pub struct AuthorizedUserId(UserId);

fn from(event: CreateToken) -> (AuthorizationKey, RefreshKey, AuthorizedUserId) {
    (
        AuthorizationKey(event.access_token),
        RefreshKey(event.refresh_token),
        AuthorizedUserId(event.user_id),
    )
}

impl From<AccessToken> for AuthorizationKey {
    fn from(token: AccessToken) -> Self {
        Self(token.0)
    }
}

impl From<&AccessToken> for AuthorizationKey {
    fn from(token: &AccessToken) -> Self {
        Self(token.0.clone())
    }
}

impl RedisKey for AuthorizationKey {
    type Value = AuthorizedUserId;

    fn inner(&self) -> String {
        format!("access:{}", self.0)
    }
}

impl RedisKey for RefreshKey {
    type Value = AuthorizedUserId;

    fn inner(&self) -> String {
        format!("refresh:{}", self.0)
    }
}

impl RedisValue for AuthorizedUserId {
    fn inner(&self) -> String {
        self.0.to_string()
    }
}

impl TryFrom<String> for AuthorizedUserId {
    type Error = AppError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Ok(Self(UserId::from_str(&s).map_err(|e| {
            AppError::ConversionEntityError(e.to_string())
        })?))
    }
}

impl AuthorizedUserId {
    pub fn into_inner(self) -> UserId {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_and_refresh_keys_do_not_collide() {
        let token = "abc".to_string();
        assert_eq!(AuthorizationKey(token.clone()).inner(), "access:abc");
        assert_eq!(RefreshKey(token).inner(), "refresh:abc");
    }

    #[test]
    fn stored_user_id_round_trips() {
        let user_id = UserId::new();
        let stored = AuthorizedUserId(user_id).inner();
        let restored = AuthorizedUserId::try_from(stored).unwrap();
        assert_eq!(restored.into_inner(), user_id);
        assert!(AuthorizedUserId::try_from("garbage".to_string()).is_err());
    }
}
