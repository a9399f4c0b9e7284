use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    facility::{
        event::{CreateFacility, UpdateFacility},
        Facility,
    },
    id::FacilityId,
    list::ListOptions,
};

#[async_trait]
pub trait FacilityRepository: Send + Sync {
    async fn create(&self, event: CreateFacility) -> AppResult<Facility>;
    /// Pages through facilities whose scope is in `visible_scopes`, or all of them when `None`.
    async fn find_all(
        &self,
        options: ListOptions,
        visible_scopes: Option<Vec<String>>,
    ) -> AppResult<Vec<Facility>>;
    async fn find_by_id(&self, facility_id: FacilityId) -> AppResult<Option<Facility>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Facility>>;
    async fn find_by_scope(&self, scope: &str) -> AppResult<Option<Facility>>;
    async fn update(&self, event: UpdateFacility) -> AppResult<Facility>;
    async fn delete(&self, facility_id: FacilityId) -> AppResult<()>;
}
