use crate::model::id::FacilityId;

#[derive(Debug)]
pub struct CreateFacility {
    pub name: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub scope: String,
    pub active: bool,
}

#[derive(Debug)]
pub struct UpdateFacility {
    pub facility_id: FacilityId,
    pub name: String,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub scope: String,
    pub active: bool,
}
