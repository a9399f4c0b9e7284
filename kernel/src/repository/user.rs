use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::{
    id::{FacilityId, UserId},
    list::ListOptions,
    user::{
        event::{CreateUser, DeleteUser, UpdateUser},
        User,
    },
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, event: CreateUser) -> AppResult<User>;
    async fn find_all(&self, facility_id: FacilityId, options: ListOptions) -> AppResult<Vec<User>>;
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn update(&self, event: UpdateUser) -> AppResult<User>;
    async fn delete(&self, event: DeleteUser) -> AppResult<()>;
}
