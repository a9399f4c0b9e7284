use std::sync::Arc;

use adapter::redis::RedisClient;
use adapter::repository::{
    auth::AuthRepositoryImpl, checkin::CheckinRepositoryImpl, facility::FacilityRepositoryImpl,
    guest::GuestRepositoryImpl, health::HealthCheckRepositoryImpl, log::LogRepositoryImpl,
    template::TemplateRepositoryImpl, user::UserRepositoryImpl,
};
use adapter::database::ConnectionPool;
use kernel::repository::{
    auth::AuthRepository, checkin::CheckinRepository, facility::FacilityRepository,
    guest::GuestRepository, health::HealthCheckRepository, log::LogRepository,
    template::TemplateRepository, user::UserRepository,
};
use shared::config::AppConfig;

#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    auth_repository: Arc<dyn AuthRepository>,
    facility_repository: Arc<dyn FacilityRepository>,
    guest_repository: Arc<dyn GuestRepository>,
    template_repository: Arc<dyn TemplateRepository>,
    user_repository: Arc<dyn UserRepository>,
    checkin_repository: Arc<dyn CheckinRepository>,
    log_repository: Arc<dyn LogRepository>,
}

impl AppRegistry {
    pub fn new(pool: ConnectionPool, redis_client: Arc<RedisClient>, app_config: AppConfig) -> Self {
        let health_check_repository = Arc::new(HealthCheckRepositoryImpl::new(pool.clone()));
        let auth_repository = Arc::new(AuthRepositoryImpl::new(
            pool.clone(),
            redis_client.clone(),
            app_config.auth.ttl,
            app_config.auth.refresh_ttl,
        ));
        let facility_repository = Arc::new(FacilityRepositoryImpl::new(pool.clone()));
        let guest_repository = Arc::new(GuestRepositoryImpl::new(pool.clone()));
        let template_repository = Arc::new(TemplateRepositoryImpl::new(pool.clone()));
        let user_repository = Arc::new(UserRepositoryImpl::new(pool.clone()));
        let checkin_repository = Arc::new(CheckinRepositoryImpl::new(pool.clone()));
        let log_repository = Arc::new(LogRepositoryImpl::new(app_config.log.directory.clone()));
        Self {
            health_check_repository,
            auth_repository,
            facility_repository,
            guest_repository,
            template_repository,
            user_repository,
            checkin_repository,
            log_repository,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn auth_repository(&self) -> Arc<dyn AuthRepository> {
        self.auth_repository.clone()
    }

    pub fn facility_repository(&self) -> Arc<dyn FacilityRepository> {
        self.facility_repository.clone()
    }

    pub fn guest_repository(&self) -> Arc<dyn GuestRepository> {
        self.guest_repository.clone()
    }

    pub fn template_repository(&self) -> Arc<dyn TemplateRepository> {
        self.template_repository.clone()
    }

    pub fn user_repository(&self) -> Arc<dyn UserRepository> {
        self.user_repository.clone()
    }

    pub fn checkin_repository(&self) -> Arc<dyn CheckinRepository> {
        self.checkin_repository.clone()
    }

    pub fn log_repository(&self) -> Arc<dyn LogRepository> {
        self.log_repository.clone()
    }
}
