use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{FacilityId, TemplateId},
    list::ListOptions,
    template::{
        event::{CreateTemplate, DeleteTemplate, UpdateTemplate},
        Template,
    },
};
use kernel::repository::template::TemplateRepository;
use shared::error::{AppError, AppResult};

use crate::database::{map_write_error, model::template::TemplateRow, ConnectionPool};

const SELECT_TEMPLATE: &str = r#"
    SELECT
        template_id,
        facility_id,
        name,
        comments,
        active,
        all_mats,
        handicap_mats,
        socket_mats,
        work_mats
    FROM templates
"#;

#[derive(new)]
pub struct TemplateRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl TemplateRepository for TemplateRepositoryImpl {
    async fn create(&self, event: CreateTemplate) -> AppResult<Template> {
        let template_id = TemplateId::new();
        sqlx::query(
            r#"
                INSERT INTO templates
                (template_id, facility_id, name, comments, active,
                all_mats, handicap_mats, socket_mats, work_mats)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(template_id)
        .bind(event.facility_id)
        .bind(&event.name)
        .bind(&event.comments)
        .bind(event.active)
        .bind(&event.all_mats)
        .bind(&event.handicap_mats)
        .bind(&event.socket_mats)
        .bind(&event.work_mats)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Template name"))?;

        self.find_by_id(event.facility_id, template_id)
            .await?
            .ok_or_else(|| {
                AppError::NoRowsAffectedError("No template record has been created".into())
            })
    }

    async fn find_all(&self, facility_id: FacilityId, options: ListOptions) -> AppResult<Vec<Template>> {
        let sql = format!(
            "{SELECT_TEMPLATE}
             WHERE facility_id = $1
               AND ($2::BOOLEAN IS NULL OR active = $2)
               AND LOWER(name) LIKE $3 ESCAPE '\\'
             ORDER BY name
             LIMIT $4 OFFSET $5"
        );
        let rows: Vec<TemplateRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(options.active)
            .bind(options.name_pattern())
            .bind(options.limit)
            .bind(options.offset)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Template::from).collect())
    }

    async fn find_by_id(
        &self,
        facility_id: FacilityId,
        template_id: TemplateId,
    ) -> AppResult<Option<Template>> {
        let sql = format!("{SELECT_TEMPLATE} WHERE facility_id = $1 AND template_id = $2");
        let row: Option<TemplateRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(template_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Template::from))
    }

    async fn find_by_name(&self, facility_id: FacilityId, name: &str) -> AppResult<Option<Template>> {
        let sql = format!("{SELECT_TEMPLATE} WHERE facility_id = $1 AND name = $2");
        let row: Option<TemplateRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(name)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Template::from))
    }

    async fn update(&self, event: UpdateTemplate) -> AppResult<Template> {
        let res = sqlx::query(
            r#"
                UPDATE templates
                SET
                    name = $3,
                    comments = $4,
                    active = $5,
                    all_mats = $6,
                    handicap_mats = $7,
                    socket_mats = $8,
                    work_mats = $9,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE facility_id = $1 AND template_id = $2
            "#,
        )
        .bind(event.facility_id)
        .bind(event.template_id)
        .bind(&event.name)
        .bind(&event.comments)
        .bind(event.active)
        .bind(&event.all_mats)
        .bind(&event.handicap_mats)
        .bind(&event.socket_mats)
        .bind(&event.work_mats)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Template name"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Template {} was not found",
                event.template_id
            )));
        }

        self.find_by_id(event.facility_id, event.template_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Template was not found".into()))
    }

    async fn delete(&self, event: DeleteTemplate) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM templates WHERE facility_id = $1 AND template_id = $2")
            .bind(event.facility_id)
            .bind(event.template_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Template {} was not found",
                event.template_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_facility(pool: &sqlx::PgPool, scope: &str) -> anyhow::Result<FacilityId> {
        let facility_id = FacilityId::new();
        sqlx::query("INSERT INTO facilities (facility_id, name, scope) VALUES ($1, $2, $2)")
            .bind(facility_id)
            .bind(scope)
            .execute(pool)
            .await?;
        Ok(facility_id)
    }

    fn template(facility_id: FacilityId, name: &str, active: bool) -> CreateTemplate {
        CreateTemplate {
            facility_id,
            name: name.into(),
            comments: None,
            active,
            all_mats: "1-24".into(),
            handicap_mats: Some("1-2".into()),
            socket_mats: None,
            work_mats: Some("20-24".into()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_template_names_are_unique_per_facility(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let main = seed_facility(&pool, "main").await?;
        let annex = seed_facility(&pool, "annex").await?;
        let repo = TemplateRepositoryImpl::new(ConnectionPool::new(pool));

        let winter = repo.create(template(main, "Winter", true)).await?;
        assert_eq!(winter.all_mats, "1-24");
        assert_eq!(winter.work_mats.as_deref(), Some("20-24"));

        let duplicate = repo.create(template(main, "Winter", true)).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
        repo.create(template(annex, "Winter", true)).await?;

        let summer = repo.create(template(main, "Summer", true)).await?;
        let renamed = repo
            .update(UpdateTemplate {
                template_id: summer.id,
                facility_id: main,
                name: "Winter".into(),
                comments: None,
                active: true,
                all_mats: "1-10".into(),
                handicap_mats: None,
                socket_mats: None,
                work_mats: None,
            })
            .await;
        assert!(matches!(renamed, Err(AppError::Conflict(_))));

        let found = repo.find_by_name(main, "Winter").await?;
        assert_eq!(found.map(|t| t.id), Some(winter.id));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_list_filters_and_delete(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let main = seed_facility(&pool, "main").await?;
        let repo = TemplateRepositoryImpl::new(ConnectionPool::new(pool));
        let winter = repo.create(template(main, "Winter Overflow", true)).await?;
        repo.create(template(main, "Old Winter", false)).await?;
        repo.create(template(main, "Summer", true)).await?;

        let list = |name: &str, active: Option<bool>| ListOptions {
            name: Some(name.into()),
            active,
            limit: ListOptions::DEFAULT_LIMIT,
            offset: 0,
        };
        assert_eq!(repo.find_all(main, list("WINTER", None)).await?.len(), 2);
        let active = repo.find_all(main, list("winter", Some(true))).await?;
        assert_eq!(
            active.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            ["Winter Overflow"]
        );

        repo.delete(DeleteTemplate::new(winter.id, main)).await?;
        assert!(repo.find_by_id(main, winter.id).await?.is_none());
        let missing = repo.delete(DeleteTemplate::new(winter.id, main)).await;
        assert!(matches!(missing, Err(AppError::EntityNotFound(_))));
        Ok(())
    }
}
