use api::model::auth::TokenResponse;
use kernel::model::scope::{Permission, Scopes};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Tokens held for the logged-in user, shared between clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginTokens {
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
}

#[derive(Debug, Default)]
pub struct LoginState {
    tokens: RwLock<Option<LoginTokens>>,
    refreshing: Mutex<()>,
}

impl LoginState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn login(&self, username: &str, token: TokenResponse) {
        *self.tokens.write().await = Some(LoginTokens {
            username: username.to_string(),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            scope: token.scope,
        });
    }

    // ユーザー名はリフレッシュ後も引き継ぐ
    pub async fn refreshed(&self, token: TokenResponse) {
        let mut guard = self.tokens.write().await;
        if let Some(tokens) = guard.as_mut() {
            tokens.access_token = token.access_token;
            tokens.refresh_token = token.refresh_token;
            tokens.scope = token.scope;
        }
    }

    pub async fn logout(&self) -> Option<LoginTokens> {
        self.tokens.write().await.take()
    }

    // 失敗したリフレッシュトークンがまだ使われている場合に限りログアウトする
    pub(crate) async fn logout_if_current(&self, refresh_token: &str) -> bool {
        let mut guard = self.tokens.write().await;
        if guard.as_ref().is_some_and(|t| t.refresh_token == refresh_token) {
            *guard = None;
            true
        } else {
            false
        }
    }

    /// Held while a refresh grant is in flight, so one refresh token is spent once.
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refreshing.lock().await
    }

    pub async fn tokens(&self) -> Option<LoginTokens> {
        self.tokens.read().await.clone()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.tokens.read().await.is_some()
    }

    pub async fn allows(&self, facility_scope: &str, permission: Permission) -> bool {
        self.tokens
            .read()
            .await
            .as_ref()
            .is_some_and(|t| Scopes::parse(&t.scope).allows(facility_scope, permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(access: &str, scope: &str) -> TokenResponse {
        TokenResponse {
            access_token: access.into(),
            token_type: "bearer".into(),
            expires_in: 3600,
            refresh_token: format!("{access}-refresh"),
            scope: scope.into(),
        }
    }

    #[tokio::test]
    async fn refresh_keeps_username() {
        let state = LoginState::new();
        assert!(!state.is_logged_in().await);

        state.login("frontdesk", token("a1", "main:regular")).await;
        state.refreshed(token("a2", "main:regular")).await;
        let tokens = state.tokens().await.unwrap();
        assert_eq!(tokens.username, "frontdesk");
        assert_eq!(tokens.access_token, "a2");
        assert_eq!(tokens.refresh_token, "a2-refresh");

        assert!(state.allows("main", Permission::Regular).await);
        assert!(!state.allows("main", Permission::Admin).await);
        assert!(state.logout().await.is_some());
        assert!(!state.is_logged_in().await);
    }

    #[tokio::test]
    async fn stale_refresh_failure_keeps_newer_session() {
        let state = LoginState::new();
        state.login("frontdesk", token("a1", "main:regular")).await;
        state.refreshed(token("a2", "main:regular")).await;

        assert!(!state.logout_if_current("a1-refresh").await);
        assert!(state.is_logged_in().await);
        assert!(state.logout_if_current("a2-refresh").await);
        assert!(!state.is_logged_in().await);
    }
}
