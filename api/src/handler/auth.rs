use axum::{
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};
use kernel::model::{
    auth::{event::CreateToken, RefreshToken},
    id::UserId,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::auth::{GrantType, TokenRequest, TokenResponse},
};

pub async fn token(
    State(registry): State<AppRegistry>,
    req: Request,
) -> AppResult<Json<TokenResponse>> {
    let req = read_token_request(req).await?;

    let user_id = match req.grant_type {
        GrantType::Password => {
            let (Some(username), Some(password)) = (req.username, req.password) else {
                return Err(AppError::InvalidRequest(
                    "username and password are required".into(),
                ));
            };
            registry
                .auth_repository()
                .verify_user(&username, &password)
                .await?
        }
        GrantType::RefreshToken => {
            let Some(refresh_token) = req.refresh_token else {
                return Err(AppError::InvalidRequest("refresh_token is required".into()));
            };
            // リフレッシュトークンは一度だけ使える
            registry
                .auth_repository()
                .consume_refresh_token(&RefreshToken(refresh_token))
                .await?
                .ok_or(AppError::UnauthenticatedError)?
        }
    };

    issue_token(&registry, user_id).await.map(Json)
}

pub async fn revoke(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .auth_repository()
        .delete_token(user.access_token)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

async fn issue_token(registry: &AppRegistry, user_id: UserId) -> AppResult<TokenResponse> {
    let user = registry
        .user_repository()
        .find_by_id(user_id)
        .await?
        .filter(|u| u.active)
        .ok_or(AppError::UnauthenticatedError)?;
    let pair = registry
        .auth_repository()
        .create_token(CreateToken::new(user_id))
        .await?;
    tracing::info!(username = %user.username, "issued access token");
    Ok(TokenResponse::new(pair, &user))
}

async fn read_token_request(req: Request) -> AppResult<TokenRequest> {
    let is_json = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        Json::<TokenRequest>::from_request(req, &())
            .await
            .map(|Json(body)| body)
            .map_err(|e| AppError::InvalidRequest(e.body_text()))
    } else {
        Form::<TokenRequest>::from_request(req, &())
            .await
            .map(|Form(body)| body)
            .map_err(|e| AppError::InvalidRequest(e.body_text()))
    }
}
