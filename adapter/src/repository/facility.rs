use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    facility::{
        event::{CreateFacility, UpdateFacility},
        Facility,
    },
    id::FacilityId,
    list::ListOptions,
};
use kernel::repository::facility::FacilityRepository;
use shared::error::{AppError, AppResult};

use crate::database::{map_write_error, model::facility::FacilityRow, ConnectionPool};

const SELECT_FACILITY: &str = r#"
    SELECT
        facility_id,
        name,
        address1,
        address2,
        city,
        state,
        zip_code,
        phone,
        email,
        scope,
        active
    FROM facilities
"#;

#[derive(new)]
pub struct FacilityRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl FacilityRepository for FacilityRepositoryImpl {
    async fn create(&self, event: CreateFacility) -> AppResult<Facility> {
        let facility_id = FacilityId::new();
        sqlx::query(
            r#"
                INSERT INTO facilities
                (facility_id, name, address1, address2, city, state, zip_code,
                phone, email, scope, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(facility_id)
        .bind(&event.name)
        .bind(&event.address1)
        .bind(&event.address2)
        .bind(&event.city)
        .bind(&event.state)
        .bind(&event.zip_code)
        .bind(&event.phone)
        .bind(&event.email)
        .bind(&event.scope)
        .bind(event.active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Facility name or scope"))?;

        self.find_by_id(facility_id).await?.ok_or_else(|| {
            AppError::NoRowsAffectedError("No facility record has been created".into())
        })
    }

    async fn find_all(
        &self,
        options: ListOptions,
        visible_scopes: Option<Vec<String>>,
    ) -> AppResult<Vec<Facility>> {
        // 閲覧可能なスコープで絞り込んでからページングする
        let sql = format!(
            "{SELECT_FACILITY}
             WHERE ($1::BOOLEAN IS NULL OR active = $1)
               AND LOWER(name) LIKE $2 ESCAPE '\\'
               AND ($5::TEXT[] IS NULL OR scope = ANY($5))
             ORDER BY name
             LIMIT $3 OFFSET $4"
        );
        let rows: Vec<FacilityRow> = sqlx::query_as(&sql)
            .bind(options.active)
            .bind(options.name_pattern())
            .bind(options.limit)
            .bind(options.offset)
            .bind(visible_scopes)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Facility::from).collect())
    }

    async fn find_by_id(&self, facility_id: FacilityId) -> AppResult<Option<Facility>> {
        let sql = format!("{SELECT_FACILITY} WHERE facility_id = $1");
        let row: Option<FacilityRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Facility::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Facility>> {
        let sql = format!("{SELECT_FACILITY} WHERE name = $1");
        let row: Option<FacilityRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Facility::from))
    }

    async fn find_by_scope(&self, scope: &str) -> AppResult<Option<Facility>> {
        let sql = format!("{SELECT_FACILITY} WHERE scope = $1");
        let row: Option<FacilityRow> = sqlx::query_as(&sql)
            .bind(scope)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Facility::from))
    }

    async fn update(&self, event: UpdateFacility) -> AppResult<Facility> {
        let res = sqlx::query(
            r#"
                UPDATE facilities
                SET
                    name = $2,
                    address1 = $3,
                    address2 = $4,
                    city = $5,
                    state = $6,
                    zip_code = $7,
                    phone = $8,
                    email = $9,
                    scope = $10,
                    active = $11,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE facility_id = $1
            "#,
        )
        .bind(event.facility_id)
        .bind(&event.name)
        .bind(&event.address1)
        .bind(&event.address2)
        .bind(&event.city)
        .bind(&event.state)
        .bind(&event.zip_code)
        .bind(&event.phone)
        .bind(&event.email)
        .bind(&event.scope)
        .bind(event.active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Facility name or scope"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Facility {} was not found",
                event.facility_id
            )));
        }

        self.find_by_id(event.facility_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Facility was not found".into()))
    }

    async fn delete(&self, facility_id: FacilityId) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM facilities WHERE facility_id = $1")
            .bind(facility_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(|e| map_write_error(e, "Facility"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Facility {facility_id} was not found"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_event(name: &str, scope: &str) -> CreateFacility {
        CreateFacility {
            name: name.into(),
            address1: Some("123 Main St".into()),
            address2: None,
            city: Some("Portland".into()),
            state: Some("OR".into()),
            zip_code: Some("97201".into()),
            phone: None,
            email: None,
            scope: scope.into(),
            active: true,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_register_facility(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = FacilityRepositoryImpl::new(ConnectionPool::new(pool));

        let created = repo.create(create_event("Downtown", "downtown")).await?;
        assert_eq!(created.name, "Downtown");
        assert!(created.active);

        let res = repo
            .find_all(
                ListOptions {
                    limit: ListOptions::DEFAULT_LIMIT,
                    ..Default::default()
                },
                None,
            )
            .await?;
        assert_eq!(res.len(), 1);

        let by_scope = repo.find_by_scope("downtown").await?;
        assert_eq!(by_scope.map(|f| f.id), Some(created.id));

        let duplicate = repo.create(create_event("Downtown", "other")).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));

        repo.delete(created.id).await?;
        assert!(repo.find_by_id(created.id).await?.is_none());
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_visible_scopes_filter_before_paging(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = FacilityRepositoryImpl::new(ConnectionPool::new(pool));
        for (name, scope) in [("Alpha", "alpha"), ("Beta", "beta"), ("Zeta", "zeta")] {
            repo.create(create_event(name, scope)).await?;
        }
        let first_page = ListOptions {
            limit: 1,
            ..Default::default()
        };

        let visible = repo
            .find_all(first_page.clone(), Some(vec!["zeta".into()]))
            .await?;
        assert_eq!(visible.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["Zeta"]);

        let second_page = ListOptions {
            limit: 1,
            offset: 1,
            ..Default::default()
        };
        let visible = repo
            .find_all(second_page, Some(vec!["beta".into(), "zeta".into()]))
            .await?;
        assert_eq!(visible.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["Zeta"]);

        assert!(repo.find_all(first_page, Some(vec![])).await?.is_empty());
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_name_filter_treats_wildcards_literally(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = FacilityRepositoryImpl::new(ConnectionPool::new(pool));
        repo.create(create_event("a_b House", "ab")).await?;
        repo.create(create_event("axb House", "axb")).await?;

        let found = repo
            .find_all(
                ListOptions {
                    name: Some("A_B".into()),
                    limit: ListOptions::DEFAULT_LIMIT,
                    ..Default::default()
                },
                None,
            )
            .await?;
        assert_eq!(found.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), ["a_b House"]);
        Ok(())
    }
}
