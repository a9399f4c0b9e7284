use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use garde::Validate;
use kernel::model::{
    checkin::event::{Deassign, DeleteCheckin, GenerateCheckins, Reassign},
    id::{CheckinId, FacilityId, TemplateId},
    scope::Permission,
    summary::summarize_by_date,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::authorize;
use crate::{
    extractor::AuthorizedUser,
    model::{
        checkin::{
            AssignRequest, AssignRequestWithIds, CheckinListQuery, CheckinRequest,
            CheckinResponse, CheckinsResponse, CreateCheckinRequestWithId,
            UpdateCheckinRequestWithIds,
        },
        summary::SummariesResponse,
    },
};

/// Mats for one date, today when no date is given.
pub async fn show_checkin_list(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    Query(query): Query<CheckinListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckinsResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;
    let checkin_date = query.date.unwrap_or_else(|| Local::now().date_naive());

    registry
        .checkin_repository()
        .find_by_date(facility_id, checkin_date)
        .await
        .map(CheckinsResponse::from)
        .map(Json)
}

pub async fn register_checkin(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CheckinRequest>,
) -> AppResult<(StatusCode, Json<CheckinResponse>)> {
    req.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .checkin_repository()
        .create(CreateCheckinRequestWithId::new(facility_id, req).into())
        .await
        .map(|c| (StatusCode::CREATED, Json(c.into())))
}

pub async fn show_checkin(
    user: AuthorizedUser,
    Path((facility_id, checkin_id)): Path<(FacilityId, CheckinId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckinResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .checkin_repository()
        .find_by_id(facility_id, checkin_id)
        .await?
        .map(|c| Json(c.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("Checkin {checkin_id} was not found")))
}

pub async fn update_checkin(
    user: AuthorizedUser,
    Path((facility_id, checkin_id)): Path<(FacilityId, CheckinId)>,
    State(registry): State<AppRegistry>,
    Json(req): Json<CheckinRequest>,
) -> AppResult<Json<CheckinResponse>> {
    req.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .checkin_repository()
        .update(UpdateCheckinRequestWithIds::new(facility_id, checkin_id, req).into())
        .await
        .map(|c| Json(c.into()))
}

pub async fn delete_checkin(
    user: AuthorizedUser,
    Path((facility_id, checkin_id)): Path<(FacilityId, CheckinId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .checkin_repository()
        .delete(DeleteCheckin::new(checkin_id, facility_id))
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

pub async fn generate_checkins(
    user: AuthorizedUser,
    Path((facility_id, checkin_date, template_id)): Path<(FacilityId, NaiveDate, TemplateId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<(StatusCode, Json<CheckinsResponse>)> {
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    let template = registry
        .template_repository()
        .find_by_id(facility_id, template_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("Template {template_id} was not found")))?;
    if !template.active {
        return Err(AppError::Conflict(format!(
            "Template '{}' is not active",
            template.name
        )));
    }
    let mats = template
        .mats()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let checkins = registry
        .checkin_repository()
        .generate(GenerateCheckins::new(
            facility_id,
            checkin_date,
            mats.generated_mats(),
        ))
        .await?;
    tracing::info!(
        %facility_id,
        %checkin_date,
        template = %template.name,
        count = checkins.len(),
        "generated checkins"
    );

    Ok((StatusCode::CREATED, Json(checkins.into())))
}

pub async fn assign_checkin(
    user: AuthorizedUser,
    Path((facility_id, checkin_id)): Path<(FacilityId, CheckinId)>,
    State(registry): State<AppRegistry>,
    Json(req): Json<AssignRequest>,
) -> AppResult<Json<CheckinResponse>> {
    req.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .checkin_repository()
        .assign(AssignRequestWithIds::new(facility_id, checkin_id, req).into())
        .await
        .map(|c| Json(c.into()))
}

pub async fn deassign_checkin(
    user: AuthorizedUser,
    Path((facility_id, checkin_id)): Path<(FacilityId, CheckinId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckinResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .checkin_repository()
        .deassign(Deassign::new(checkin_id, facility_id))
        .await
        .map(|c| Json(c.into()))
}

pub async fn reassign_checkin(
    user: AuthorizedUser,
    Path((facility_id, checkin_id, new_checkin_id)): Path<(FacilityId, CheckinId, CheckinId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CheckinResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .checkin_repository()
        .reassign(Reassign::new(facility_id, checkin_id, new_checkin_id))
        .await
        .map(|c| Json(c.into()))
}

pub async fn show_summaries(
    user: AuthorizedUser,
    Path((facility_id, since, until)): Path<(FacilityId, NaiveDate, NaiveDate)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<SummariesResponse>> {
    if since > until {
        return Err(AppError::InvalidRequest(format!(
            "{since} is after {until}"
        )));
    }
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    let checkins = registry
        .checkin_repository()
        .find_by_date_range(facility_id, since, until)
        .await?;

    Ok(Json(summarize_by_date(facility_id, &checkins).into()))
}

#[cfg(test)]
mod tests {
    use kernel::model::template::event::CreateTemplate;

    use super::*;
    use crate::handler::testing;

    #[sqlx::test(migrations = "../adapter/migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn generate_needs_admin(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let registry = testing::registry(pool)?;
        let main = testing::facility(&registry, "main").await?;
        let template = registry
            .template_repository()
            .create(CreateTemplate {
                facility_id: main.id,
                name: "Standard".into(),
                comments: None,
                active: true,
                all_mats: "1-3".into(),
                handicap_mats: Some("1".into()),
                socket_mats: None,
                work_mats: None,
            })
            .await?;
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let clerk = testing::caller(&registry, &main, "clerk", "main:regular").await?;
        let res = generate_checkins(
            clerk,
            Path((main.id, date, template.id)),
            State(registry.clone()),
        )
        .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        let admin = testing::caller(&registry, &main, "admin", "main:admin").await?;
        let (status, Json(created)) = generate_checkins(
            admin,
            Path((main.id, date, template.id)),
            State(registry.clone()),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.items.len(), 3);
        assert_eq!(created.items[0].features.as_deref(), Some("H"));

        let clerk = testing::caller(&registry, &main, "clerk2", "main:regular").await?;
        let res = delete_checkin(
            clerk,
            Path((main.id, created.items[0].id)),
            State(registry.clone()),
        )
        .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));
        Ok(())
    }
}
