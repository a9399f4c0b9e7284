use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    guest::{
        event::{CreateGuest, DeleteGuest, UpdateGuest},
        Guest,
    },
    id::{FacilityId, GuestId},
    list::ListOptions,
};
use kernel::repository::guest::GuestRepository;
use shared::error::{AppError, AppResult};

use crate::database::{map_write_error, model::guest::GuestRow, ConnectionPool};

const SELECT_GUEST: &str = r#"
    SELECT
        guest_id,
        facility_id,
        first_name,
        last_name,
        comments,
        favorite,
        active
    FROM guests
"#;

#[derive(new)]
pub struct GuestRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl GuestRepository for GuestRepositoryImpl {
    async fn create(&self, event: CreateGuest) -> AppResult<Guest> {
        let guest_id = GuestId::new();
        sqlx::query(
            r#"
                INSERT INTO guests
                (guest_id, facility_id, first_name, last_name, comments, favorite, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(guest_id)
        .bind(event.facility_id)
        .bind(&event.first_name)
        .bind(&event.last_name)
        .bind(&event.comments)
        .bind(event.favorite)
        .bind(event.active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Guest name"))?;

        self.find_by_id(event.facility_id, guest_id)
            .await?
            .ok_or_else(|| AppError::NoRowsAffectedError("No guest record has been created".into()))
    }

    async fn find_all(&self, facility_id: FacilityId, options: ListOptions) -> AppResult<Vec<Guest>> {
        let sql = format!(
            "{SELECT_GUEST}
             WHERE facility_id = $1
               AND ($2::BOOLEAN IS NULL OR active = $2)
               AND (LOWER(first_name) LIKE $3 ESCAPE '\\' OR LOWER(last_name) LIKE $3 ESCAPE '\\')
             ORDER BY last_name, first_name
             LIMIT $4 OFFSET $5"
        );
        let rows: Vec<GuestRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(options.active)
            .bind(options.name_pattern())
            .bind(options.limit)
            .bind(options.offset)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Guest::from).collect())
    }

    async fn find_by_id(&self, facility_id: FacilityId, guest_id: GuestId) -> AppResult<Option<Guest>> {
        let sql = format!("{SELECT_GUEST} WHERE facility_id = $1 AND guest_id = $2");
        let row: Option<GuestRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(guest_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Guest::from))
    }

    async fn find_by_name(
        &self,
        facility_id: FacilityId,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<Option<Guest>> {
        let sql = format!(
            "{SELECT_GUEST} WHERE facility_id = $1 AND first_name = $2 AND last_name = $3"
        );
        let row: Option<GuestRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(first_name)
            .bind(last_name)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Guest::from))
    }

    async fn update(&self, event: UpdateGuest) -> AppResult<Guest> {
        let res = sqlx::query(
            r#"
                UPDATE guests
                SET
                    first_name = $3,
                    last_name = $4,
                    comments = $5,
                    favorite = $6,
                    active = $7,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE facility_id = $1 AND guest_id = $2
            "#,
        )
        .bind(event.facility_id)
        .bind(event.guest_id)
        .bind(&event.first_name)
        .bind(&event.last_name)
        .bind(&event.comments)
        .bind(event.favorite)
        .bind(event.active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Guest name"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Guest {} was not found",
                event.guest_id
            )));
        }

        self.find_by_id(event.facility_id, event.guest_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Guest was not found".into()))
    }

    async fn delete(&self, event: DeleteGuest) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM guests WHERE facility_id = $1 AND guest_id = $2")
            .bind(event.facility_id)
            .bind(event.guest_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(|e| map_write_error(e, "Guest"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Guest {} was not found",
                event.guest_id
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

    fn guest(facility_id: FacilityId, first: &str, last: &str, active: bool) -> CreateGuest {
        CreateGuest {
            facility_id,
            first_name: first.into(),
            last_name: last.into(),
            comments: None,
            favorite: None,
            active,
        }
    }

    fn options(name: Option<&str>, active: Option<bool>) -> ListOptions {
        ListOptions {
            name: name.map(str::to_string),
            active,
            limit: ListOptions::DEFAULT_LIMIT,
            offset: 0,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_guest_names_are_unique_per_facility(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let main = seed_facility(&pool, "main").await?;
        let annex = seed_facility(&pool, "annex").await?;
        let repo = GuestRepositoryImpl::new(ConnectionPool::new(pool));

        let fred = repo.create(guest(main, "Fred", "Flintstone", true)).await?;
        let duplicate = repo.create(guest(main, "Fred", "Flintstone", true)).await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
        repo.create(guest(annex, "Fred", "Flintstone", true)).await?;

        let barney = repo.create(guest(main, "Barney", "Rubble", true)).await?;
        let renamed = repo
            .update(UpdateGuest {
                guest_id: barney.id,
                facility_id: main,
                first_name: "Fred".into(),
                last_name: "Flintstone".into(),
                comments: None,
                favorite: None,
                active: true,
            })
            .await;
        assert!(matches!(renamed, Err(AppError::Conflict(_))));

        let found = repo.find_by_name(main, "Fred", "Flintstone").await?;
        assert_eq!(found.map(|g| g.id), Some(fred.id));
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_list_filters_by_name_and_active(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let main = seed_facility(&pool, "main").await?;
        let repo = GuestRepositoryImpl::new(ConnectionPool::new(pool));
        repo.create(guest(main, "Fred", "Flintstone", true)).await?;
        repo.create(guest(main, "Wilma", "Flintstone", false)).await?;
        repo.create(guest(main, "Barney", "Rubble", true)).await?;

        let flintstones = repo.find_all(main, options(Some("FLINT"), None)).await?;
        assert_eq!(flintstones.len(), 2);

        let active = repo.find_all(main, options(Some("flint"), Some(true))).await?;
        assert_eq!(
            active.iter().map(|g| g.first_name.as_str()).collect::<Vec<_>>(),
            ["Fred"]
        );

        let by_first_name = repo.find_all(main, options(Some("bar"), None)).await?;
        assert_eq!(by_first_name.len(), 1);

        let all = repo.find_all(main, options(None, None)).await?;
        assert_eq!(
            all.iter().map(|g| g.last_name.as_str()).collect::<Vec<_>>(),
            ["Flintstone", "Flintstone", "Rubble"]
        );
        Ok(())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_guest_with_checkins_cannot_be_deleted(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let main = seed_facility(&pool, "main").await?;
        let repo = GuestRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let fred = repo.create(guest(main, "Fred", "Flintstone", true)).await?;
        let barney = repo.create(guest(main, "Barney", "Rubble", true)).await?;

        sqlx::query(
            r#"
                INSERT INTO checkins (checkin_id, facility_id, checkin_date, mat_number, guest_id, payment_type)
                VALUES ($1, $2, '2024-03-01', 1, $3, 'AG')
            "#,
        )
        .bind(kernel::model::id::CheckinId::new())
        .bind(main)
        .bind(fred.id)
        .execute(&pool)
        .await?;

        let res = repo.delete(DeleteGuest::new(fred.id, main)).await;
        assert!(matches!(res, Err(AppError::Conflict(_))));
        assert!(repo.find_by_id(main, fred.id).await?.is_some());

        repo.delete(DeleteGuest::new(barney.id, main)).await?;
        assert!(repo.find_by_id(main, barney.id).await?.is_none());

        let missing = repo.delete(DeleteGuest::new(barney.id, main)).await;
        assert!(matches!(missing, Err(AppError::EntityNotFound(_))));
        Ok(())
    }
}
