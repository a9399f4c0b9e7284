use std::{path::PathBuf, sync::Arc};

use adapter::{database::ConnectionPool, redis::RedisClient};
use kernel::model::{
    auth::AccessToken,
    facility::{event::CreateFacility, Facility},
    user::event::CreateUser,
};
use registry::AppRegistry;
use shared::config::{
    AppConfig, AuthConfig, DatabaseConfig, LogConfig, RedisConfig, ServerConfig,
};

use crate::extractor::AuthorizedUser;

// Redis には接続しないので、トークンを扱わないハンドラーにのみ使う
pub(crate) fn registry(pool: sqlx::PgPool) -> anyhow::Result<AppRegistry> {
    let config = AppConfig {
        database: DatabaseConfig {
            host: "localhost".into(),
            port: 5432,
            username: "test".into(),
            password: "test".into(),
            database: "test".into(),
        },
        redis: RedisConfig {
            host: "localhost".into(),
            port: 6379,
        },
        auth: AuthConfig {
            ttl: 60,
            refresh_ttl: 60,
        },
        log: LogConfig {
            directory: PathBuf::from("./log"),
        },
        server: ServerConfig { port: 0 },
    };
    let redis = Arc::new(RedisClient::new(&config.redis)?);
    Ok(AppRegistry::new(ConnectionPool::new(pool), redis, config))
}

pub(crate) async fn facility(registry: &AppRegistry, scope: &str) -> anyhow::Result<Facility> {
    let facility = registry
        .facility_repository()
        .create(CreateFacility {
            name: scope.to_uppercase(),
            address1: None,
            address2: None,
            city: None,
            state: None,
            zip_code: None,
            phone: None,
            email: None,
            scope: scope.into(),
            active: true,
        })
        .await?;
    Ok(facility)
}

/// A signed-in user of `facility` holding `scope`.
pub(crate) async fn caller(
    registry: &AppRegistry,
    facility: &Facility,
    username: &str,
    scope: &str,
) -> anyhow::Result<AuthorizedUser> {
    let user = registry
        .user_repository()
        .create(CreateUser {
            facility_id: facility.id,
            name: username.into(),
            username: username.into(),
            password: "Pa55w0rd".into(),
            scope: scope.into(),
            level: "info".into(),
            active: true,
        })
        .await?;
    Ok(AuthorizedUser {
        access_token: AccessToken(format!("{username}-token")),
        user,
    })
}
