use derive_new::new;

use crate::model::id::{FacilityId, GuestId};

#[derive(Debug)]
pub struct CreateGuest {
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub comments: Option<String>,
    pub favorite: Option<i32>,
    pub active: bool,
}

#[derive(Debug)]
pub struct UpdateGuest {
    pub guest_id: GuestId,
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub comments: Option<String>,
    pub favorite: Option<i32>,
    pub active: bool,
}

#[derive(Debug, new)]
pub struct DeleteGuest {
    pub guest_id: GuestId,
    pub facility_id: FacilityId,
}
