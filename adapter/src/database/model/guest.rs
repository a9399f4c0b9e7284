use kernel::model::{
    guest::Guest,
    id::{FacilityId, GuestId},
};

#[derive(sqlx::FromRow)]
pub struct GuestRow {
    pub guest_id: GuestId,
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub comments: Option<String>,
    pub favorite: Option<i32>,
    pub active: bool,
}

impl From<GuestRow> for Guest {
    fn from(value: GuestRow) -> Self {
        let GuestRow {
            guest_id,
            facility_id,
            first_name,
            last_name,
            comments,
            favorite,
            active,
        } = value;
        Guest {
            id: guest_id,
            facility_id,
            first_name,
            last_name,
            comments,
            favorite,
            active,
        }
    }
}
