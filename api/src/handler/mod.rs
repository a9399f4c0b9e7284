use kernel::model::{facility::Facility, id::FacilityId, scope::Permission};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::extractor::AuthorizedUser;

pub mod auth;
pub mod checkin;
pub mod facility;
pub mod guest;
pub mod health;
pub mod log;
pub mod template;
pub mod user;

#[cfg(test)]
mod testing;

/// Loads the facility and checks the caller holds `permission` on it.
pub(crate) async fn authorize(
    registry: &AppRegistry,
    user: &AuthorizedUser,
    facility_id: FacilityId,
    permission: Permission,
) -> AppResult<Facility> {
    let facility = registry
        .facility_repository()
        .find_by_id(facility_id)
        .await?
        .ok_or_else(|| AppError::EntityNotFound(format!("Facility {facility_id} was not found")))?;
    user.require(&facility.scope, permission)?;
    Ok(facility)
}
