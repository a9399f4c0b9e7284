use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    facility::Facility,
    id::{FacilityId, UserId},
    scope::{Permission, Scopes, SUPERUSER},
    user::{event::DeleteUser, User},
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::authorize;
use crate::{
    extractor::AuthorizedUser,
    model::{
        list::ListQuery,
        user::{
            CreateUserRequest, CreateUserRequestWithId, UpdateUserRequest,
            UpdateUserRequestWithIds, UserResponse, UsersResponse,
        },
    },
};

// 管理者は自施設のスコープのみ付与できる。superuser の付与は superuser に限る
fn check_grantable(user: &AuthorizedUser, facility: &Facility, scope: &str) -> AppResult<()> {
    if user.is_superuser() {
        return Ok(());
    }
    let prefix = format!("{}:", facility.scope);
    let granted = Scopes::parse(scope);
    if granted
        .tokens()
        .all(|t| t != SUPERUSER && t.starts_with(&prefix))
    {
        Ok(())
    } else {
        Err(AppError::ForbiddenOperation)
    }
}

// 既存ユーザーの権限が施設外に及ぶ場合、管理者はそのユーザーを変更・削除できない
async fn find_manageable_user(
    registry: &AppRegistry,
    user: &AuthorizedUser,
    facility: &Facility,
    user_id: UserId,
) -> AppResult<User> {
    let target = registry
        .user_repository()
        .find_by_id(user_id)
        .await?
        .filter(|u| u.facility_id == facility.id)
        .ok_or_else(|| AppError::EntityNotFound(format!("User {user_id} was not found")))?;
    check_grantable(user, facility, &target.scope)?;
    Ok(target)
}

pub async fn show_user_list(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    Query(query): Query<ListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UsersResponse>> {
    query.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .user_repository()
        .find_all(facility_id, query.into())
        .await
        .map(UsersResponse::from)
        .map(Json)
}

pub async fn register_user(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    req.validate(&())?;
    let facility = authorize(&registry, &user, facility_id, Permission::Admin).await?;
    check_grantable(&user, &facility, &req.scope)?;

    registry
        .user_repository()
        .create(CreateUserRequestWithId::new(facility_id, req).into())
        .await
        .map(|u| (StatusCode::CREATED, Json(u.into())))
}

pub async fn show_user(
    user: AuthorizedUser,
    Path((facility_id, user_id)): Path<(FacilityId, UserId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .user_repository()
        .find_by_id(user_id)
        .await?
        .filter(|u| u.facility_id == facility_id)
        .map(|u| Json(u.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("User {user_id} was not found")))
}

pub async fn update_user(
    user: AuthorizedUser,
    Path((facility_id, user_id)): Path<(FacilityId, UserId)>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    req.validate(&())?;
    let facility = authorize(&registry, &user, facility_id, Permission::Admin).await?;
    find_manageable_user(&registry, &user, &facility, user_id).await?;
    check_grantable(&user, &facility, &req.scope)?;

    registry
        .user_repository()
        .update(UpdateUserRequestWithIds::new(facility_id, user_id, req).into())
        .await
        .map(|u| Json(u.into()))
}

pub async fn delete_user(
    user: AuthorizedUser,
    Path((facility_id, user_id)): Path<(FacilityId, UserId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    let facility = authorize(&registry, &user, facility_id, Permission::Admin).await?;
    if user.id() == user_id {
        return Err(AppError::UnprocessableEntity(
            "Users cannot delete themselves".into(),
        ));
    }
    find_manageable_user(&registry, &user, &facility, user_id).await?;

    registry
        .user_repository()
        .delete(DeleteUser {
            user_id,
            facility_id,
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn show_user_by_username(
    _user: AuthorizedUser,
    Path(username): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UserResponse>> {
    registry
        .user_repository()
        .find_by_username(&username)
        .await?
        .map(|u| Json(u.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("User '{username}' was not found")))
}

pub async fn get_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(user.user.into())
}
