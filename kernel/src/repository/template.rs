use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{FacilityId, TemplateId},
    list::ListOptions,
    template::{
        event::{CreateTemplate, DeleteTemplate, UpdateTemplate},
        Template,
    },
};

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create(&self, event: CreateTemplate) -> AppResult<Template>;
    async fn find_all(&self, facility_id: FacilityId, options: ListOptions) -> AppResult<Vec<Template>>;
    async fn find_by_id(
        &self,
        facility_id: FacilityId,
        template_id: TemplateId,
    ) -> AppResult<Option<Template>>;
    async fn find_by_name(&self, facility_id: FacilityId, name: &str) -> AppResult<Option<Template>>;
    async fn update(&self, event: UpdateTemplate) -> AppResult<Template>;
    async fn delete(&self, event: DeleteTemplate) -> AppResult<()>;
}
