use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use garde::Validate;
use kernel::model::log::{ClientLog, LogFileName, LogLevel};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedUser,
    model::log::{ClientLogRequest, LogFilesResponse},
};

fn parse_name(raw: &str) -> AppResult<LogFileName> {
    LogFileName::parse(raw)
        .ok_or_else(|| AppError::InvalidRequest(format!("'{raw}' is not a log file name")))
}

pub async fn show_log_files(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<LogFilesResponse>> {
    user.require_superuser()?;

    registry
        .log_repository()
        .list_files()
        .await
        .map(|items| Json(LogFilesResponse { items }))
}

pub async fn show_log_file(
    user: AuthorizedUser,
    Path(filename): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<impl IntoResponse> {
    user.require_superuser()?;
    let name = parse_name(&filename)?;

    let content = registry.log_repository().read_file(&name).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    ))
}

pub async fn show_log_file_lines(
    user: AuthorizedUser,
    Path(filename): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<Vec<String>>> {
    user.require_superuser()?;
    let name = parse_name(&filename)?;

    let content = registry.log_repository().read_file(&name).await?;
    Ok(Json(
        content
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
    ))
}

pub async fn record_client_log(
    user: AuthorizedUser,
    Json(req): Json<ClientLogRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;
    let log = ClientLog::try_from(req).map_err(|e| AppError::InvalidRequest(e.to_string()))?;
    emit(&log, &user.user.username);
    Ok(StatusCode::NO_CONTENT)
}

// クライアントのログはサーバーのログに "client" ターゲットで書き込む
fn emit(log: &ClientLog, fallback_username: &str) {
    let username = log.username.as_deref().unwrap_or(fallback_username);
    let timestamp = log.timestamp.as_deref().unwrap_or_default();
    let message = &log.message;
    match log.level {
        LogLevel::Trace => tracing::trace!(target: "client", username, timestamp, "{message}"),
        LogLevel::Debug => tracing::debug!(target: "client", username, timestamp, "{message}"),
        LogLevel::Info => tracing::info!(target: "client", username, timestamp, "{message}"),
        LogLevel::Warn => tracing::warn!(target: "client", username, timestamp, "{message}"),
        LogLevel::Error | LogLevel::Fatal => {
            let fatal = log.level == LogLevel::Fatal;
            tracing::error!(target: "client", username, timestamp, fatal, "{message}")
        }
    }
}
