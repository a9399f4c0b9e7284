use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::log::{record_client_log, show_log_file, show_log_file_lines, show_log_files};

pub fn build_log_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/", get(show_log_files))
        .route("/client", post(record_client_log))
        .route("/:filename", get(show_log_file))
        .route("/:filename/json", get(show_log_file_lines));

    Router::new().nest("/logs", routers)
}
