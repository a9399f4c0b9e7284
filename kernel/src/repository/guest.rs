use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    guest::{
        event::{CreateGuest, DeleteGuest, UpdateGuest},
        Guest,
    },
    id::{FacilityId, GuestId},
    list::ListOptions,
};

#[async_trait]
pub trait GuestRepository: Send + Sync {
    async fn create(&self, event: CreateGuest) -> AppResult<Guest>;
    async fn find_all(&self, facility_id: FacilityId, options: ListOptions) -> AppResult<Vec<Guest>>;
    async fn find_by_id(&self, facility_id: FacilityId, guest_id: GuestId) -> AppResult<Option<Guest>>;
    async fn find_by_name(
        &self,
        facility_id: FacilityId,
        first_name: &str,
        last_name: &str,
    ) -> AppResult<Option<Guest>>;
    async fn update(&self, event: UpdateGuest) -> AppResult<Guest>;
    async fn delete(&self, event: DeleteGuest) -> AppResult<()>;
}
