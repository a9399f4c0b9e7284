use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::AppResult;

use crate::model::{
    checkin::{
        event::{
            Assign, CreateCheckin, Deassign, DeleteCheckin, GenerateCheckins, Reassign,
            UpdateCheckin,
        },
        Checkin,
    },
    id::{CheckinId, FacilityId, GuestId},
};

#[async_trait]
pub trait CheckinRepository: Send + Sync {
    async fn create(&self, event: CreateCheckin) -> AppResult<Checkin>;
    // 指定日のチェックインをマット番号順で取得する
    async fn find_by_date(&self, facility_id: FacilityId, checkin_date: NaiveDate) -> AppResult<Vec<Checkin>>;
    async fn find_by_id(&self, facility_id: FacilityId, checkin_id: CheckinId) -> AppResult<Option<Checkin>>;
    async fn find_by_date_range(
        &self,
        facility_id: FacilityId,
        since: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<Checkin>>;
    async fn find_by_guest(&self, facility_id: FacilityId, guest_id: GuestId) -> AppResult<Vec<Checkin>>;
    async fn update(&self, event: UpdateCheckin) -> AppResult<Checkin>;
    async fn delete(&self, event: DeleteCheckin) -> AppResult<()>;
    async fn generate(&self, event: GenerateCheckins) -> AppResult<Vec<Checkin>>;
    async fn assign(&self, event: Assign) -> AppResult<Checkin>;
    async fn deassign(&self, event: Deassign) -> AppResult<Checkin>;
    async fn reassign(&self, event: Reassign) -> AppResult<Checkin>;
}
