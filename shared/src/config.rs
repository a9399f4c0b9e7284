use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};

pub struct AppConfig {
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub log: LogConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn new() -> Result<Self> {
        let database = DatabaseConfig {
            host: env::var("DATABASE_HOST")?,
            port: required("DATABASE_PORT")?,
            username: env::var("DATABASE_USERNAME")?,
            password: env::var("DATABASE_PASSWORD")?,
            database: env::var("DATABASE_NAME")?,
        };
        let redis = RedisConfig {
            host: env::var("REDIS_HOST")?,
            port: required("REDIS_PORT")?,
        };
        let auth = AuthConfig {
            ttl: optional("AUTH_TOKEN_TTL", 3600)?,
            refresh_ttl: optional("REFRESH_TOKEN_TTL", 86400 * 30)?,
        };
        let log = LogConfig {
            directory: env::var("LOG_DIRECTORY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./log")),
        };
        let server = ServerConfig {
            port: optional("SERVER_PORT", 8080)?,
        };
        Ok(Self {
            database,
            redis,
            auth,
            log,
            server,
        })
    }
}

fn required<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).with_context(|| format!("{key} is not set"))?;
    raw.parse()
        .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))
}

fn optional<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}")),
    }
}

pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

pub struct RedisConfig {
    pub host: String,
    pub port: u16,
}

pub struct AuthConfig {
    /// Access token lifetime in seconds.
    pub ttl: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl: u64,
}

pub struct LogConfig {
    pub directory: PathBuf,
}

impl LogConfig {
    pub fn server_log(&self) -> PathBuf {
        self.directory.join("server.log")
    }
}

pub struct ServerConfig {
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_falls_back_when_unset() {
        let ttl: u64 = optional("SHELTER_TEST_UNSET_TTL", 42).unwrap();
        assert_eq!(ttl, 42);
    }

    #[test]
    fn optional_rejects_garbage() {
        env::set_var("SHELTER_TEST_BAD_PORT", "eighty");
        let port: Result<u16> = optional("SHELTER_TEST_BAD_PORT", 8080);
        assert!(port.is_err());
    }

    #[test]
    fn server_log_lives_in_log_directory() {
        let log = LogConfig {
            directory: PathBuf::from("/var/log/shelter"),
        };
        assert_eq!(log.server_log(), PathBuf::from("/var/log/shelter/server.log"));
    }
}
