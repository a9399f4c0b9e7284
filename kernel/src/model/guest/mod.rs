use crate::model::id::{FacilityId, GuestId};

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guest {
    pub id: GuestId,
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub comments: Option<String>,
    pub favorite: Option<i32>,
    pub active: bool,
}
