use kernel::model::{facility::Facility, id::FacilityId};

#[derive(sqlx::FromRow)]
pub struct FacilityRow {
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

impl From<FacilityRow> for Facility {
    fn from(value: FacilityRow) -> Self {
        let FacilityRow {
            facility_id,
            name,
            address1,
            address2,
            city,
            state,
            zip_code,
            phone,
            email,
            scope,
            active,
        } = value;
        Facility {
            id: facility_id,
            name,
            address1,
            address2,
            city,
            state,
            zip_code,
            phone,
            email,
            scope,
            active,
        }
    }
}
