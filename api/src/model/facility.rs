use derive_new::new;
use garde::Validate;
use kernel::model::{
    facility::{
        event::{CreateFacility, UpdateFacility},
        Facility,
    },
    id::FacilityId,
    scope::is_valid_facility_scope,
};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

fn facility_scope(value: &String, _: &()) -> garde::Result {
    if is_valid_facility_scope(value) {
        Ok(())
    } else {
        Err(garde::Error::new(
            "scope must be letters, digits or underscores",
        ))
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FacilityRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    pub address1: Option<String>,
    #[garde(skip)]
    pub address2: Option<String>,
    #[garde(skip)]
    pub city: Option<String>,
    #[garde(pattern(r"^[A-Z]{2}$"))]
    pub state: Option<String>,
    #[garde(pattern(r"^[0-9]{5}(-[0-9]{4})?$"))]
    pub zip_code: Option<String>,
    #[garde(pattern(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$"))]
    pub phone: Option<String>,
    #[garde(email)]
    pub email: Option<String>,
    #[garde(custom(facility_scope))]
    pub scope: String,
    #[serde(default = "default_active")]
    #[garde(skip)]
    pub active: bool,
}

impl From<FacilityRequest> for CreateFacility {
    fn from(value: FacilityRequest) -> Self {
        let FacilityRequest {
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
        CreateFacility {
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

#[derive(new)]
pub struct FacilityRequestWithId(FacilityId, FacilityRequest);

impl From<FacilityRequestWithId> for UpdateFacility {
    fn from(value: FacilityRequestWithId) -> Self {
        let FacilityRequestWithId(
            facility_id,
            FacilityRequest {
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
            },
        ) = value;
        UpdateFacility {
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
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitiesResponse {
    pub items: Vec<FacilityResponse>,
}

impl From<Vec<Facility>> for FacilitiesResponse {
    fn from(value: Vec<Facility>) -> Self {
        Self {
            items: value.into_iter().map(FacilityResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityResponse {
    pub id: FacilityId,
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

impl From<Facility> for FacilityResponse {
    fn from(value: Facility) -> Self {
        let Facility {
            id,
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
        Self {
            id,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> FacilityRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn valid_request_defaults_to_active() {
        let req = request(
            r#"{"name":"Downtown","state":"OR","zipCode":"97201","phone":"503-555-1212","scope":"downtown"}"#,
        );
        assert!(req.validate(&()).is_ok());
        assert!(req.active);
    }

    #[test]
    fn rejects_bad_fields() {
        for json in [
            r#"{"name":"","scope":"downtown"}"#,
            r#"{"name":"Downtown","scope":"down town"}"#,
            r#"{"name":"Downtown","scope":"downtown","state":"Oregon"}"#,
            r#"{"name":"Downtown","scope":"downtown","zipCode":"972"}"#,
            r#"{"name":"Downtown","scope":"downtown","email":"nope"}"#,
        ] {
            assert!(request(json).validate(&()).is_err(), "{json}");
        }
    }

    #[test]
    fn update_event_carries_id() {
        let id = FacilityId::new();
        let event = UpdateFacility::from(FacilityRequestWithId::new(
            id,
            request(r#"{"name":"Downtown","scope":"downtown","active":false}"#),
        ));
        assert_eq!(event.facility_id, id);
        assert!(!event.active);
    }
}
