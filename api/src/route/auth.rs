use axum::{
    routing::{delete, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::auth::{revoke, token};

pub fn build_auth_routers() -> Router<AppRegistry> {
    let routers = Router::new()
        .route("/token", post(token))
        .route("/token", delete(revoke));

    Router::new().nest("/oauth", routers)
}
