//! Database maintenance: backups, restores, schema recreation and the
//! first superuser account.

use std::path::PathBuf;

use adapter::{
    database::{connect_database_with, ConnectionPool},
    repository::{facility::FacilityRepositoryImpl, user::UserRepositoryImpl},
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use kernel::{
    model::{
        facility::event::CreateFacility,
        scope::{is_valid_facility_scope, SUPERUSER},
        user::event::CreateUser,
    },
    repository::{facility::FacilityRepository, user::UserRepository},
};
use shared::config::DatabaseConfig;
use sqlx::{postgres::PgConnectOptions, PgPool};
use tokio::process::Command;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(flatten)]
    db: DbArgs,

    #[command(subcommand)]
    command: DbCommand,
}

#[derive(Args, Debug)]
struct DbArgs {
    #[arg(long = "DB_HOST", env = "DB_HOST", default_value = "localhost", global = true)]
    host: String,
    #[arg(long = "DB_PORT", env = "DB_PORT", default_value_t = 5432, global = true)]
    port: u16,
    #[arg(long = "DB_DB", env = "DB_DB", default_value = "shelter", global = true)]
    database: String,
    #[arg(long = "DB_USER", env = "DB_USER", default_value = "shelter", global = true)]
    user: String,
    #[arg(long = "DB_PASSWORD", env = "DB_PASSWORD", default_value = "", global = true)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum DbCommand {
    /// Dump the database with pg_dump.
    Backup {
        #[arg(long, default_value = "shelter-backup.sql")]
        file: PathBuf,
    },
    /// Load a dump produced by `backup` with psql.
    Restore {
        #[arg(long, default_value = "shelter-backup.sql")]
        file: PathBuf,
    },
    /// Drop and recreate the database, then apply the schema migrations.
    Recreate,
    /// Create a facility and a superuser who can log in to it.
    Bootstrap {
        #[arg(long)]
        facility_name: String,
        #[arg(long)]
        facility_scope: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "SUPERUSER_PASSWORD")]
        password: String,
    },
}

impl DbArgs {
    fn config(&self) -> DatabaseConfig {
        DatabaseConfig {
            host: self.host.clone(),
            port: self.port,
            username: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
        }
    }

    fn command(&self, program: &str) -> Command {
        let mut cmd = Command::new(program);
        cmd.env("PGPASSWORD", &self.password)
            .arg("--host")
            .arg(&self.host)
            .arg("--port")
            .arg(self.port.to_string())
            .arg("--username")
            .arg(&self.user);
        cmd
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .try_init()?;

    let cli = Cli::parse();
    match &cli.command {
        DbCommand::Backup { file } => backup(&cli.db, file).await,
        DbCommand::Restore { file } => restore(&cli.db, file).await,
        DbCommand::Recreate => recreate(&cli.db).await,
        DbCommand::Bootstrap {
            facility_name,
            facility_scope,
            username,
            password,
        } => bootstrap(&cli.db, facility_name, facility_scope, username, password).await,
    }
}

async fn run(mut cmd: Command, what: &str) -> Result<()> {
    let status = cmd
        .status()
        .await
        .with_context(|| format!("failed to start {what}"))?;
    if !status.success() {
        bail!("{what} exited with {status}");
    }
    Ok(())
}

async fn backup(db: &DbArgs, file: &PathBuf) -> Result<()> {
    let mut cmd = db.command("pg_dump");
    cmd.arg("--clean")
        .arg("--if-exists")
        .arg("--file")
        .arg(file)
        .arg(&db.database);
    run(cmd, "pg_dump").await?;
    tracing::info!(file = %file.display(), "backup written");
    Ok(())
}

async fn restore(db: &DbArgs, file: &PathBuf) -> Result<()> {
    if !file.exists() {
        bail!("{} does not exist", file.display());
    }
    let mut cmd = db.command("psql");
    cmd.arg("--quiet")
        .arg("--set")
        .arg("ON_ERROR_STOP=1")
        .arg("--file")
        .arg(file)
        .arg(&db.database);
    run(cmd, "psql").await?;
    tracing::info!(file = %file.display(), "backup restored");
    Ok(())
}

fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("'{name}' is not a plain identifier");
    }
    Ok(format!("\"{name}\""))
}

async fn recreate(db: &DbArgs) -> Result<()> {
    let database = quote_identifier(&db.database)?;
    let owner = quote_identifier(&db.user)?;

    // 対象 DB を削除するため管理用の postgres DB に接続する
    let maintenance = PgPool::connect_with(
        PgConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password)
            .database("postgres"),
    )
    .await
    .context("cannot connect to the postgres database")?;
    sqlx::query(&format!("DROP DATABASE IF EXISTS {database} WITH (FORCE)"))
        .execute(&maintenance)
        .await?;
    sqlx::query(&format!("CREATE DATABASE {database} OWNER {owner}"))
        .execute(&maintenance)
        .await?;
    maintenance.close().await;

    let pool = connect_database_with(&db.config());
    pool.migrate().await?;
    tracing::info!(database = %db.database, "database recreated");
    Ok(())
}

async fn bootstrap(
    db: &DbArgs,
    facility_name: &str,
    facility_scope: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    if !is_valid_facility_scope(facility_scope) {
        bail!("'{facility_scope}' is not a valid facility scope");
    }
    let pool = connect_database_with(&db.config());
    pool.migrate().await?;
    create_superuser(pool, facility_name, facility_scope, username, password).await
}

async fn create_superuser(
    pool: ConnectionPool,
    facility_name: &str,
    facility_scope: &str,
    username: &str,
    password: &str,
) -> Result<()> {
    let facilities = FacilityRepositoryImpl::new(pool.clone());
    let users = UserRepositoryImpl::new(pool);
    if users.find_by_username(username).await?.is_some() {
        bail!("user '{username}' already exists");
    }

    let facility = facilities
        .create(CreateFacility {
            name: facility_name.to_string(),
            address1: None,
            address2: None,
            city: None,
            state: None,
            zip_code: None,
            phone: None,
            email: None,
            scope: facility_scope.to_string(),
            active: true,
        })
        .await?;
    let created = users
        .create(CreateUser {
            facility_id: facility.id,
            name: username.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            scope: SUPERUSER.to_string(),
            level: "info".into(),
            active: true,
        })
        .await;
    // ユーザーを作成できなければ施設も残さない
    let user = match created {
        Ok(user) => user,
        Err(e) => {
            facilities.delete(facility.id).await?;
            return Err(e.into());
        }
    };
    tracing::info!(facility = %facility.name, username = %user.username, "superuser created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_restricted() {
        assert_eq!(quote_identifier("shelter_db").unwrap(), "\"shelter_db\"");
        assert!(quote_identifier("x\"; DROP").is_err());
        assert!(quote_identifier("").is_err());
    }

    #[tokio::test]
    async fn bootstrap_rejects_bad_facility_scope() {
        let db = DbArgs {
            host: "localhost".into(),
            port: 5432,
            database: "shelter".into(),
            user: "shelter".into(),
            password: String::new(),
        };
        let res = bootstrap(&db, "Main", "main:admin", "root", "pw").await;
        assert!(res.is_err());
    }

    #[sqlx::test(migrations = "./adapter/migrations")]
    #[ignore = "requires PostgreSQL via DATABASE_URL"]
    async fn duplicate_username_leaves_no_facility(pool: PgPool) -> Result<()> {
        let pool = ConnectionPool::new(pool);
        create_superuser(pool.clone(), "Main", "main", "root", "pw").await?;

        let again = create_superuser(pool.clone(), "Annex", "annex", "root", "pw").await;
        assert!(again.is_err());

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM facilities")
            .fetch_one(pool.inner_ref())
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[test]
    fn flags_use_db_names() {
        let cli = Cli::try_parse_from([
            "dbtool",
            "--DB_HOST",
            "db.local",
            "--DB_PORT",
            "6543",
            "--DB_DB",
            "checkins",
            "--DB_USER",
            "admin",
            "--DB_PASSWORD",
            "pw",
            "backup",
            "--file",
            "out.sql",
        ])
        .unwrap();
        assert_eq!(cli.db.host, "db.local");
        assert_eq!(cli.db.port, 6543);
        assert_eq!(cli.db.config().database, "checkins");
        assert!(matches!(cli.command, DbCommand::Backup { ref file } if file == &PathBuf::from("out.sql")));
    }
}
