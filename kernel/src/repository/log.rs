use async_trait::async_trait;
use shared::error::AppResult;

use crate::model::log::LogFileName;

#[async_trait]
pub trait LogRepository: Send + Sync {
    async fn list_files(&self) -> AppResult<Vec<String>>;
    async fn read_file(&self, name: &LogFileName) -> AppResult<String>;
}
