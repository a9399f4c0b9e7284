use axum::{routing::get, Router};
use registry::AppRegistry;

use crate::handler::user::{get_current_user, show_user_by_username};

pub fn build_user_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/me", get(get_current_user))
        .route("/exact/:username", get(show_user_by_username));

    Router::new().nest("/users", routers)
}
