use std::path::PathBuf;

use async_trait::async_trait;
use derive_new::new;
use kernel::{model::log::LogFileName, repository::log::LogRepository};
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct LogRepositoryImpl {
    directory: PathBuf,
}

#[async_trait]
impl LogRepository for LogRepositoryImpl {
    async fn list_files(&self) -> AppResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.directory)
            .await
            .map_err(AppError::LogFileError)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(AppError::LogFileError)? {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if LogFileName::parse(name).is_some() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read_file(&self, name: &LogFileName) -> AppResult<String> {
        let path = self.directory.join(name.as_str());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::EntityNotFound(
                format!("Log file '{}' was not found", name.as_str()),
            )),
            Err(e) => Err(AppError::LogFileError(e)),
        }
    }
}
