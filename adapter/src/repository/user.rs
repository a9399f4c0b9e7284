use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{FacilityId, UserId},
    list::ListOptions,
    user::{
        event::{CreateUser, DeleteUser, UpdateUser},
        User,
    },
};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

use crate::{
    database::{map_write_error, model::user::UserRow, ConnectionPool},
    password,
};

const SELECT_USER: &str = r#"
    SELECT
        user_id,
        facility_id,
        name,
        username,
        scope,
        level,
        active
    FROM users
"#;

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let hashed_password = password::hash(event.password.clone()).await?;
        sqlx::query(
            r#"
                INSERT INTO users
                (user_id, facility_id, name, username, password_hash, scope, level, active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user_id)
        .bind(event.facility_id)
        .bind(&event.name)
        .bind(&event.username)
        .bind(&hashed_password)
        .bind(&event.scope)
        .bind(&event.level)
        .bind(event.active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Username"))?;

        self.find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NoRowsAffectedError("No user record has been created".into()))
    }

    async fn find_all(&self, facility_id: FacilityId, options: ListOptions) -> AppResult<Vec<User>> {
        let sql = format!(
            "{SELECT_USER}
             WHERE facility_id = $1
               AND ($2::BOOLEAN IS NULL OR active = $2)
               AND (LOWER(username) LIKE $3 ESCAPE '\\' OR LOWER(name) LIKE $3 ESCAPE '\\')
             ORDER BY username
             LIMIT $4 OFFSET $5"
        );
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(options.active)
            .bind(options.name_pattern())
            .bind(options.limit)
            .bind(options.offset)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE user_id = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let sql = format!("{SELECT_USER} WHERE username = $1");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(User::from))
    }

    async fn update(&self, event: UpdateUser) -> AppResult<User> {
        // パスワードは指定された場合のみ更新する
        let hashed_password = match &event.password {
            Some(plain) => Some(password::hash(plain.clone()).await?),
            None => None,
        };
        let res = sqlx::query(
            r#"
                UPDATE users
                SET
                    name = $3,
                    username = $4,
                    password_hash = COALESCE($5, password_hash),
                    scope = $6,
                    level = $7,
                    active = $8,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE facility_id = $1 AND user_id = $2
            "#,
        )
        .bind(event.facility_id)
        .bind(event.user_id)
        .bind(&event.name)
        .bind(&event.username)
        .bind(&hashed_password)
        .bind(&event.scope)
        .bind(&event.level)
        .bind(event.active)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Username"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "User {} was not found",
                event.user_id
            )));
        }

        self.find_by_id(event.user_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("User was not found".into()))
    }

    async fn delete(&self, event: DeleteUser) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM users WHERE facility_id = $1 AND user_id = $2")
            .bind(event.facility_id)
            .bind(event.user_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "User {} was not found",
                event.user_id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn test_user_password_is_hashed(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let facility_id = FacilityId::new();
        sqlx::query("INSERT INTO facilities (facility_id, name, scope) VALUES ($1, 'Test', 'test')")
            .bind(facility_id)
            .execute(&pool)
            .await?;

        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user = repo
            .create(CreateUser {
                facility_id,
                name: "Test Admin".into(),
                username: "testadmin".into(),
                password: "Pa55w0rd".into(),
                scope: "test:admin".into(),
                level: "info".into(),
                active: true,
            })
            .await?;

        let stored: (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE user_id = $1")
            .bind(user.id)
            .fetch_one(&pool)
            .await?;
        assert_ne!(stored.0, "Pa55w0rd");
        assert!(bcrypt::verify("Pa55w0rd", &stored.0)?);

        let found = repo.find_by_username("testadmin").await?;
        assert_eq!(found, Some(user));
        Ok(())
    }
}
