use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::FacilityId, scope::Permission};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::authorize;
use crate::{
    extractor::AuthorizedUser,
    model::{
        facility::{FacilitiesResponse, FacilityRequest, FacilityRequestWithId, FacilityResponse},
        list::ListQuery,
    },
};

pub async fn show_facility_list(
    user: AuthorizedUser,
    Query(query): Query<ListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FacilitiesResponse>> {
    query.validate(&())?;

    registry
        .facility_repository()
        .find_all(query.into(), user.scopes().visible_facilities())
        .await
        .map(FacilitiesResponse::from)
        .map(Json)
}

pub async fn register_facility(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<FacilityRequest>,
) -> AppResult<(StatusCode, Json<FacilityResponse>)> {
    user.require_superuser()?;
    req.validate(&())?;

    registry
        .facility_repository()
        .create(req.into())
        .await
        .map(|f| (StatusCode::CREATED, Json(f.into())))
}

pub async fn show_facility_by_name(
    _user: AuthorizedUser,
    Path(name): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FacilityResponse>> {
    registry
        .facility_repository()
        .find_by_name(&name)
        .await?
        .map(|f| Json(f.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("Facility '{name}' was not found")))
}

pub async fn show_facility_by_scope(
    _user: AuthorizedUser,
    Path(scope): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FacilityResponse>> {
    registry
        .facility_repository()
        .find_by_scope(&scope)
        .await?
        .map(|f| Json(f.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("Facility scope '{scope}' was not found")))
}

pub async fn show_facility(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FacilityResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular)
        .await
        .map(|f| Json(f.into()))
}

pub async fn update_facility(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<FacilityRequest>,
) -> AppResult<Json<FacilityResponse>> {
    user.require_superuser()?;
    req.validate(&())?;

    registry
        .facility_repository()
        .update(FacilityRequestWithId::new(facility_id, req).into())
        .await
        .map(|f| Json(f.into()))
}

pub async fn delete_facility(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    user.require_superuser()?;

    registry
        .facility_repository()
        .delete(facility_id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
}
