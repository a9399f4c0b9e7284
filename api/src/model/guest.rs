use derive_new::new;
use garde::Validate;
use kernel::model::{
    guest::{
        event::{CreateGuest, UpdateGuest},
        Guest,
    },
    id::{FacilityId, GuestId},
};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuestRequest {
    #[garde(length(min = 1, max = 255))]
    pub first_name: String,
    #[garde(length(min = 1, max = 255))]
    pub last_name: String,
    #[garde(skip)]
    pub comments: Option<String>,
    #[garde(range(min = 1))]
    pub favorite: Option<i32>,
    #[serde(default = "default_active")]
    #[garde(skip)]
    pub active: bool,
}

#[derive(new)]
pub struct CreateGuestRequestWithId(FacilityId, GuestRequest);

impl From<CreateGuestRequestWithId> for CreateGuest {
    fn from(value: CreateGuestRequestWithId) -> Self {
        let CreateGuestRequestWithId(
            facility_id,
            GuestRequest {
                first_name,
                last_name,
                comments,
                favorite,
                active,
            },
        ) = value;
        CreateGuest {
            facility_id,
            first_name,
            last_name,
            comments,
            favorite,
            active,
        }
    }
}

#[derive(new)]
pub struct UpdateGuestRequestWithIds(FacilityId, GuestId, GuestRequest);

impl From<UpdateGuestRequestWithIds> for UpdateGuest {
    fn from(value: UpdateGuestRequestWithIds) -> Self {
        let UpdateGuestRequestWithIds(
            facility_id,
            guest_id,
            GuestRequest {
                first_name,
                last_name,
                comments,
                favorite,
                active,
            },
        ) = value;
        UpdateGuest {
            guest_id,
            facility_id,
            first_name,
            last_name,
            comments,
            favorite,
            active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestsResponse {
    pub items: Vec<GuestResponse>,
}

impl From<Vec<Guest>> for GuestsResponse {
    fn from(value: Vec<Guest>) -> Self {
        Self {
            items: value.into_iter().map(GuestResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestResponse {
    pub id: GuestId,
    pub facility_id: FacilityId,
    pub first_name: String,
    pub last_name: String,
    pub comments: Option<String>,
    pub favorite: Option<i32>,
    pub active: bool,
}

impl From<Guest> for GuestResponse {
    fn from(value: Guest) -> Self {
        let Guest {
            id,
            facility_id,
            first_name,
            last_name,
            comments,
            favorite,
            active,
        } = value;
        Self {
            id,
            facility_id,
            first_name,
            last_name,
            comments,
            favorite,
            active,
        }
    }
}
