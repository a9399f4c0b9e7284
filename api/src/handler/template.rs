use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::{FacilityId, TemplateId},
    scope::Permission,
    template::event::DeleteTemplate,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use super::authorize;
use crate::{
    extractor::AuthorizedUser,
    model::{
        list::ListQuery,
        template::{
            CreateTemplateRequestWithId, TemplateRequest, TemplateResponse, TemplatesResponse,
            UpdateTemplateRequestWithIds,
        },
    },
};

fn validate_request(req: &TemplateRequest) -> AppResult<()> {
    req.validate(&())?;
    req.mats()
        .map(|_| ())
        .map_err(|e| AppError::InvalidRequest(e.to_string()))
}

pub async fn show_template_list(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    Query(query): Query<ListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TemplatesResponse>> {
    query.validate(&())?;
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .template_repository()
        .find_all(facility_id, query.into())
        .await
        .map(TemplatesResponse::from)
        .map(Json)
}

pub async fn register_template(
    user: AuthorizedUser,
    Path(facility_id): Path<FacilityId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<TemplateRequest>,
) -> AppResult<(StatusCode, Json<TemplateResponse>)> {
    validate_request(&req)?;
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .template_repository()
        .create(CreateTemplateRequestWithId::new(facility_id, req).into())
        .await
        .map(|t| (StatusCode::CREATED, Json(t.into())))
}

pub async fn show_template_by_name(
    user: AuthorizedUser,
    Path((facility_id, name)): Path<(FacilityId, String)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TemplateResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .template_repository()
        .find_by_name(facility_id, &name)
        .await?
        .map(|t| Json(t.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("Template '{name}' was not found")))
}

pub async fn show_template(
    user: AuthorizedUser,
    Path((facility_id, template_id)): Path<(FacilityId, TemplateId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<TemplateResponse>> {
    authorize(&registry, &user, facility_id, Permission::Regular).await?;

    registry
        .template_repository()
        .find_by_id(facility_id, template_id)
        .await?
        .map(|t| Json(t.into()))
        .ok_or_else(|| AppError::EntityNotFound(format!("Template {template_id} was not found")))
}

pub async fn update_template(
    user: AuthorizedUser,
    Path((facility_id, template_id)): Path<(FacilityId, TemplateId)>,
    State(registry): State<AppRegistry>,
    Json(req): Json<TemplateRequest>,
) -> AppResult<Json<TemplateResponse>> {
    validate_request(&req)?;
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .template_repository()
        .update(UpdateTemplateRequestWithIds::new(facility_id, template_id, req).into())
        .await
        .map(|t| Json(t.into()))
}

pub async fn delete_template(
    user: AuthorizedUser,
    Path((facility_id, template_id)): Path<(FacilityId, TemplateId)>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    authorize(&registry, &user, facility_id, Permission::Admin).await?;

    registry
        .template_repository()
        .delete(DeleteTemplate {
            template_id,
            facility_id,
        })
        .await
        .map(|_| StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::testing;

    fn winter(all_mats: &str) -> TemplateRequest {
        TemplateRequest {
            name: "Winter".into(),
            comments: None,
            active: true,
            all_mats: all_mats.into(),
            handicap_mats: Some("1-2".into()),
            socket_mats: None,
            work_mats: None,
        }
    }

    #[sqlx::test(migrations = "../adapter/migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn templates_are_managed_by_admins(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let registry = testing::registry(pool)?;
        let main = testing::facility(&registry, "main").await?;

        let clerk = testing::caller(&registry, &main, "clerk", "main:regular").await?;
        let res = register_template(
            clerk,
            Path(main.id),
            State(registry.clone()),
            Json(winter("1-20")),
        )
        .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        let admin = testing::caller(&registry, &main, "admin", "main:admin").await?;
        let res = register_template(
            admin,
            Path(main.id),
            State(registry.clone()),
            Json(winter("1-2000000000")),
        )
        .await;
        assert!(matches!(res, Err(AppError::ValidationError(_))));

        let admin = testing::caller(&registry, &main, "admin2", "main:admin").await?;
        let (status, Json(created)) = register_template(
            admin,
            Path(main.id),
            State(registry.clone()),
            Json(winter("1-20")),
        )
        .await?;
        assert_eq!(status, StatusCode::CREATED);

        let clerk = testing::caller(&registry, &main, "clerk2", "main:regular").await?;
        let Json(found) = show_template_by_name(
            clerk,
            Path((main.id, "Winter".to_string())),
            State(registry.clone()),
        )
        .await?;
        assert_eq!(found.id, created.id);
        Ok(())
    }
}
