use axum::Router;
use registry::AppRegistry;

use super::{
    auth::build_auth_routers, facility::build_facility_routers,
    health::build_health_check_routers, log::build_log_routers, user::build_user_routers,
};

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_health_check_routers())
        .merge(build_facility_routers())
        .merge(build_user_routers())
        .merge(build_log_routers());

    Router::new()
        .nest("/api", router)
        .merge(build_auth_routers())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ルートの衝突は構築時に panic するので、組み立てるだけで検出できる
    #[test]
    fn routes_build_without_conflicts() {
        let _router: Router<AppRegistry> = routes();
    }
}
