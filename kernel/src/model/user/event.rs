use derive_new::new;

use crate::model::id::{FacilityId, UserId};

#[derive(Debug)]
pub struct CreateUser {
    pub facility_id: FacilityId,
    pub name: String,
    pub username: String,
    pub password: String,
    pub scope: String,
    pub level: String,
    pub active: bool,
}

/// `password` is only changed when present.
#[derive(Debug)]
pub struct UpdateUser {
    pub user_id: UserId,
    pub facility_id: FacilityId,
    pub name: String,
    pub username: String,
    pub password: Option<String>,
    pub scope: String,
    pub level: String,
    pub active: bool,
}

#[derive(Debug, new)]
pub struct DeleteUser {
    pub user_id: UserId,
    pub facility_id: FacilityId,
}
