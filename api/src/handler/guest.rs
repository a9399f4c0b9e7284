use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    guest::event::DeleteGuest,
    id::{FacilityId, GuestId},
    scope::Permission,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::authorize;
use crate::{
    extractor::AuthorizedUser,
    model::{
        checkin::CheckinsResponse,
        guest::{
            CreateGuestRequestWithId, GuestRequest, GuestResponse, GuestsResponse,
            UpdateGuestRequestWithIds,
        },
        list::ListQuery,
    },
};

pub async fn show_guest_list(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    Query(query): Query<ListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GuestsResponse>> {
    query.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .guest_repository()
        .find_all(facility_id, query.into())
        .await
        .map(GuestsResponse::from)
        .map(Json)
}

pub async fn register_guest(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<GuestRequest>,
) -> AppResult<(StatusCode, Json<GuestResponse>)> {
    req.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .guest_repository()
        .create(CreateGuestRequestWithId::new(facility_id, req).into())
        .await
        .map(|g| (StatusCode::CREATED, Json(g.into())))
}

pub async fn show_guest_by_name(
    user: AuthorizedUser,
    Path((facility_id, first_name, last_name)): Path<(FacilityId, String, String)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GuestResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .guest_repository()
        .find_by_name(facility_id, &first_name, &last_name)
        .await?
        .map(|g| Json(g.into()))
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("Guest '{first_name} {last_name}' was not found"))
        })
}

pub async fn show_guest(
    user: AuthorizedUser,
    Path((facility_id, guest_id)): Path<(FacilityId, GuestId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<GuestResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .guest_repository()
        .find_by_id(facility_id, guest_id)
        .await?
        .map(|g| Json(g.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("Guest {guest_id} was not found")))
}

pub async fn update_guest(
    user: AuthorizedUser,
    Path((facility_id, guest_id)): Path<(FacilityId, GuestId)>,
    State(registry): State<AppRegistry>,
    Json(req): Json<GuestRequest>,
) -> AppResult<Json<GuestResponse>> {
    req.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .guest_repository()
        .update(UpdateGuestRequestWithIds::new(facility_id, guest_id, req).into())
        .await
        .map(|g| Json(g.into()))
}

pub async fn delete_guest(
    user: AuthorizedUser,
    Path((facility_id, guest_id)): Path<(FacilityId, GuestId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .guest_repository()
        .delete(DeleteGuest {
            guest_id,
            facility_id,
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

/// A guest's stay history, newest first.
pub async fn show_guest_checkins(
    user: AuthorizedUser,
    Path((facility_id, guest_id)): Path<(FacilityId, GuestId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckinsResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .checkin_repository()
        .find_by_guest(facility_id, guest_id)
        .await
        .map(CheckinsResponse::from)
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing;

    fn fred() -> GuestRequest {
        GuestRequest {
            first_name: "Fred".into(),
            last_name: "Flintstone".into(),
            comments: None,
            favorite: None,
            active: true,
        }
    }

    #[sqlx::test(migrations = "../adapter/migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn guest_permission_levels(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let registry = testing::registry(pool)?;
        let east = testing::facility(&registry, "east").await?;
        let west = testing::facility(&registry, "west").await?;

        let clerk = testing::caller(&registry, &east, "clerk", "east:regular").await?;
        let (status, Json(guest)) =
            register_guest(clerk, Path(east.id), State(registry.clone()), Json(fred())).await?;
        assert_eq!(status, StatusCode::CREATED);

        let clerk = testing::caller(&registry, &east, "clerk2", "east:regular").await?;
        let res = delete_guest(clerk, Path((east.id, guest.id)), State(registry.clone())).await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        let outsider = testing::caller(&registry, &west, "westclerk", "west:admin").await?;
        let res = show_guest_list(
            outsider,
            Path(east.id),
            Query(ListQuery::default()),
            State(registry.clone()),
        )
        .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        let admin = testing::caller(&registry, &east, "eastadmin", "east:admin").await?;
        let status = delete_guest(admin, Path((east.id, guest.id)), State(registry.clone())).await?;
        assert_eq!(status, StatusCode::NO_CONTENT);
        Ok(())
    }
}
