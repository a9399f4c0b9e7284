use async_trait::async_trait;
use chrono::NaiveDate;
use derive_new::new;
use kernel::model::{
    checkin::{
        event::{
            Assign, CreateCheckin, Deassign, DeleteCheckin, GenerateCheckins, Reassign,
            UpdateCheckin,
        },
        Checkin,
    },
    id::{CheckinId, FacilityId, GuestId},
    payment::PaymentType,
};
use kernel::repository::checkin::CheckinRepository;
use rust_decimal::Decimal;
use shared::error::{AppError, AppResult};

use crate::database::{map_write_error, model::checkin::CheckinRow, ConnectionPool};

const SELECT_CHECKIN: &str = r#"
    SELECT
        c.checkin_id,
        c.facility_id,
        c.checkin_date,
        c.mat_number,
        c.features,
        c.guest_id,
        c.payment_type,
        c.payment_amount,
        c.shower_time,
        c.wakeup_time,
        c.comments,
        g.first_name,
        g.last_name
    FROM checkins AS c
    LEFT OUTER JOIN guests AS g USING (guest_id)
"#;

type Tx<'a> = sqlx::Transaction<'a, sqlx::Postgres>;

#[derive(new)]
pub struct CheckinRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl CheckinRepository for CheckinRepositoryImpl {
    async fn create(&self, event: CreateCheckin) -> AppResult<Checkin> {
        let checkin_id = CheckinId::new();
        sqlx::query(
            r#"
                INSERT INTO checkins
                (checkin_id, facility_id, checkin_date, mat_number, features, comments)
                VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(checkin_id)
        .bind(event.facility_id)
        .bind(event.checkin_date)
        .bind(event.mat_number)
        .bind(&event.features)
        .bind(&event.comments)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Mat number for this date"))?;

        self.find_by_id(event.facility_id, checkin_id)
            .await?
            .ok_or_else(|| {
                AppError::NoRowsAffectedError("No checkin record has been created".into())
            })
    }

    async fn find_by_date(&self, facility_id: FacilityId, checkin_date: NaiveDate) -> AppResult<Vec<Checkin>> {
        let sql = format!(
            "{SELECT_CHECKIN}
             WHERE c.facility_id = $1 AND c.checkin_date = $2
             ORDER BY c.mat_number"
        );
        let rows: Vec<CheckinRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(checkin_date)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Checkin::from).collect())
    }

    async fn find_by_id(&self, facility_id: FacilityId, checkin_id: CheckinId) -> AppResult<Option<Checkin>> {
        let sql = format!("{SELECT_CHECKIN} WHERE c.facility_id = $1 AND c.checkin_id = $2");
        let row: Option<CheckinRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(checkin_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Checkin::from))
    }

    async fn find_by_date_range(
        &self,
        facility_id: FacilityId,
        since: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<Checkin>> {
        let sql = format!(
            "{SELECT_CHECKIN}
             WHERE c.facility_id = $1 AND c.checkin_date BETWEEN $2 AND $3
             ORDER BY c.checkin_date, c.mat_number"
        );
        let rows: Vec<CheckinRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(since)
            .bind(until)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Checkin::from).collect())
    }

    async fn find_by_guest(&self, facility_id: FacilityId, guest_id: GuestId) -> AppResult<Vec<Checkin>> {
        let sql = format!(
            "{SELECT_CHECKIN}
             WHERE c.facility_id = $1 AND c.guest_id = $2
             ORDER BY c.checkin_date DESC"
        );
        let rows: Vec<CheckinRow> = sqlx::query_as(&sql)
            .bind(facility_id)
            .bind(guest_id)
            .fetch_all(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Checkin::from).collect())
    }

    async fn update(&self, event: UpdateCheckin) -> AppResult<Checkin> {
        let res = sqlx::query(
            r#"
                UPDATE checkins
                SET
                    checkin_date = $3,
                    mat_number = $4,
                    features = $5,
                    comments = $6,
                    updated_at = CURRENT_TIMESTAMP(3)
                WHERE facility_id = $1 AND checkin_id = $2
            "#,
        )
        .bind(event.facility_id)
        .bind(event.checkin_id)
        .bind(event.checkin_date)
        .bind(event.mat_number)
        .bind(&event.features)
        .bind(&event.comments)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| map_write_error(e, "Mat number for this date"))?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Checkin {} was not found",
                event.checkin_id
            )));
        }

        self.find_by_id(event.facility_id, event.checkin_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Checkin was not found".into()))
    }

    async fn delete(&self, event: DeleteCheckin) -> AppResult<()> {
        let res = sqlx::query("DELETE FROM checkins WHERE facility_id = $1 AND checkin_id = $2")
            .bind(event.facility_id)
            .bind(event.checkin_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "Checkin {} was not found",
                event.checkin_id
            )));
        }

        Ok(())
    }

    async fn generate(&self, event: GenerateCheckins) -> AppResult<Vec<Checkin>> {
        let mut tx = self.db.begin().await?;

        // すでにその日のチェックインが存在する場合は生成しない
        {
            let (existing,): (i64,) = sqlx::query_as(
                r#"
                    SELECT COUNT(*) FROM checkins
                    WHERE facility_id = $1 AND checkin_date = $2
                "#,
            )
            .bind(event.facility_id)
            .bind(event.checkin_date)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if existing > 0 {
                return Err(AppError::Conflict(format!(
                    "{existing} checkins already exist for {}",
                    event.checkin_date
                )));
            }
        }

        for mat in &event.mats {
            sqlx::query(
                r#"
                    INSERT INTO checkins
                    (checkin_id, facility_id, checkin_date, mat_number, features)
                    VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(CheckinId::new())
            .bind(event.facility_id)
            .bind(event.checkin_date)
            .bind(mat.mat_number)
            .bind(&mat.features)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "Mat number for this date"))?;
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_date(event.facility_id, event.checkin_date).await
    }

    async fn assign(&self, event: Assign) -> AppResult<Checkin> {
        let mut tx = self.db.begin().await?;

        let checkin = lock_checkin(&mut tx, event.facility_id, event.checkin_id).await?;
        if let Some(current) = checkin.guest_id {
            if current != event.guest_id {
                return Err(AppError::Conflict(format!(
                    "Mat {} is already assigned to another guest",
                    checkin.mat_number
                )));
            }
        }

        // ゲストの存在確認 ＋ active チェック
        {
            let guest: Option<(bool,)> = sqlx::query_as(
                "SELECT active FROM guests WHERE facility_id = $1 AND guest_id = $2",
            )
            .bind(event.facility_id)
            .bind(event.guest_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            match guest {
                None => {
                    return Err(AppError::EntityNotFound(format!(
                        "Guest {} was not found",
                        event.guest_id
                    )))
                }
                Some((false,)) => {
                    return Err(AppError::UnprocessableEntity(format!(
                        "Guest {} is not active",
                        event.guest_id
                    )))
                }
                Some((true,)) => {}
            }
        }

        // 同じ日に別のマットへ割り当て済みでないか確認する
        {
            let other: Option<(i32,)> = sqlx::query_as(
                r#"
                    SELECT mat_number FROM checkins
                    WHERE facility_id = $1 AND checkin_date = $2
                      AND guest_id = $3 AND checkin_id <> $4
                "#,
            )
            .bind(event.facility_id)
            .bind(checkin.checkin_date)
            .bind(event.guest_id)
            .bind(event.checkin_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if let Some((mat_number,)) = other {
                return Err(AppError::Conflict(format!(
                    "Guest is already assigned to mat {mat_number} on {}",
                    checkin.checkin_date
                )));
            }
        }

        write_assignment(&mut tx, event.checkin_id, &event).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.facility_id, event.checkin_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Checkin was not found".into()))
    }

    async fn deassign(&self, event: Deassign) -> AppResult<Checkin> {
        let mut tx = self.db.begin().await?;
        lock_checkin(&mut tx, event.facility_id, event.checkin_id).await?;
        clear_assignment(&mut tx, event.checkin_id).await?;
        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.facility_id, event.checkin_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Checkin was not found".into()))
    }

    async fn reassign(&self, event: Reassign) -> AppResult<Checkin> {
        let mut tx = self.db.begin().await?;

        let from = lock_checkin(&mut tx, event.facility_id, event.from_checkin_id).await?;
        let to = lock_checkin(&mut tx, event.facility_id, event.to_checkin_id).await?;

        let Some(guest_id) = from.guest_id else {
            return Err(AppError::UnprocessableEntity(format!(
                "Mat {} has no guest to move",
                from.mat_number
            )));
        };
        if from.checkin_date != to.checkin_date {
            return Err(AppError::UnprocessableEntity(
                "Guests can only be moved between mats on the same date".into(),
            ));
        }
        if to.guest_id.is_some() {
            return Err(AppError::Conflict(format!(
                "Mat {} is already assigned",
                to.mat_number
            )));
        }

        let details = Assign {
            checkin_id: event.to_checkin_id,
            facility_id: event.facility_id,
            guest_id,
            payment_type: from
                .payment_type
                .unwrap_or_else(|| PaymentType::Unknown.code().to_string()),
            payment_amount: from.payment_amount,
            shower_time: from.shower_time,
            wakeup_time: from.wakeup_time,
            comments: from.comments,
        };

        // 部分一意インデックスに抵触しないよう、先に移動元を空ける
        clear_assignment(&mut tx, event.from_checkin_id).await?;
        write_assignment(&mut tx, event.to_checkin_id, &details).await?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        self.find_by_id(event.facility_id, event.to_checkin_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("Checkin was not found".into()))
    }
}

async fn lock_checkin(
    tx: &mut Tx<'_>,
    facility_id: FacilityId,
    checkin_id: CheckinId,
) -> AppResult<LockedCheckin> {
    let row: Option<LockedCheckin> = sqlx::query_as(
        r#"
            SELECT
                checkin_date,
                mat_number,
                guest_id,
                payment_type,
                payment_amount,
                shower_time,
                wakeup_time,
                comments
            FROM checkins
            WHERE facility_id = $1 AND checkin_id = $2
            FOR UPDATE
        "#,
    )
    .bind(facility_id)
    .bind(checkin_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;

    row.ok_or_else(|| AppError::EntityNotFound(format!("Checkin {checkin_id} was not found")))
}

async fn write_assignment(tx: &mut Tx<'_>, checkin_id: CheckinId, details: &Assign) -> AppResult<()> {
    let res = sqlx::query(
        r#"
            UPDATE checkins
            SET
                guest_id = $2,
                payment_type = $3,
                payment_amount = $4,
                shower_time = $5,
                wakeup_time = $6,
                comments = $7,
                updated_at = CURRENT_TIMESTAMP(3)
            WHERE checkin_id = $1
        "#,
    )
    .bind(checkin_id)
    .bind(details.guest_id)
    .bind(&details.payment_type)
    .bind(details.payment_amount)
    .bind(details.shower_time)
    .bind(details.wakeup_time)
    .bind(&details.comments)
    .execute(&mut **tx)
    .await
    .map_err(|e| map_write_error(e, "Guest assignment for this date"))?;

    if res.rows_affected() < 1 {
        return Err(AppError::NoRowsAffectedError(
            "No checkin record has been assigned".into(),
        ));
    }
    Ok(())
}

async fn clear_assignment(tx: &mut Tx<'_>, checkin_id: CheckinId) -> AppResult<()> {
    sqlx::query(
        r#"
            UPDATE checkins
            SET
                guest_id = NULL,
                payment_type = NULL,
                payment_amount = NULL,
                shower_time = NULL,
                wakeup_time = NULL,
                comments = NULL,
                updated_at = CURRENT_TIMESTAMP(3)
            WHERE checkin_id = $1
        "#,
    )
    .bind(checkin_id)
    .execute(&mut **tx)
    .await
    .map_err(AppError::SpecificOperationError)?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct LockedCheckin {
    checkin_date: NaiveDate,
    mat_number: i32,
    guest_id: Option<GuestId>,
    payment_type: Option<String>,
    payment_amount: Option<Decimal>,
    shower_time: Option<chrono::NaiveTime>,
    wakeup_time: Option<chrono::NaiveTime>,
    comments: Option<String>,
}
