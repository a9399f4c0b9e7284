use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{FacilityId, TemplateId},
    mats::MatsList,
    template::{
        event::{CreateTemplate, UpdateTemplate},
        Template, TemplateMats, TemplateMatsError,
    },
};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

fn mats_list(value: &String, _: &()) -> garde::Result {
    value
        .parse::<MatsList>()
        .map(|_| ())
        .map_err(|e| garde::Error::new(e.to_string()))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(skip)]
    pub comments: Option<String>,
    #[serde(default = "default_active")]
    #[garde(skip)]
    pub active: bool,
    #[garde(length(min = 1), custom(mats_list))]
    pub all_mats: String,
    #[garde(skip)]
    pub handicap_mats: Option<String>,
    #[garde(skip)]
    pub socket_mats: Option<String>,
    #[garde(skip)]
    pub work_mats: Option<String>,
}

impl TemplateRequest {
    // 各リストが allMats の部分集合になっているかを検証する
    pub fn mats(&self) -> Result<TemplateMats, TemplateMatsError> {
        TemplateMats::parse(
            &self.all_mats,
            self.handicap_mats.as_deref(),
            self.socket_mats.as_deref(),
            self.work_mats.as_deref(),
        )
    }
}

#[derive(new)]
pub struct CreateTemplateRequestWithId(FacilityId, TemplateRequest);

impl From<CreateTemplateRequestWithId> for CreateTemplate {
    fn from(value: CreateTemplateRequestWithId) -> Self {
        let CreateTemplateRequestWithId(
            facility_id,
            TemplateRequest {
                name,
                comments,
                active,
                all_mats,
                handicap_mats,
                socket_mats,
                work_mats,
            },
        ) = value;
        CreateTemplate {
            facility_id,
            name,
            comments,
            active,
            all_mats,
            handicap_mats,
            socket_mats,
            work_mats,
        }
    }
}

#[derive(new)]
pub struct UpdateTemplateRequestWithIds(FacilityId, TemplateId, TemplateRequest);

impl From<UpdateTemplateRequestWithIds> for UpdateTemplate {
    fn from(value: UpdateTemplateRequestWithIds) -> Self {
        let UpdateTemplateRequestWithIds(
            facility_id,
            template_id,
            TemplateRequest {
                name,
                comments,
                active,
                all_mats,
                handicap_mats,
                socket_mats,
                work_mats,
            },
        ) = value;
        UpdateTemplate {
            template_id,
            facility_id,
            name,
            comments,
            active,
            all_mats,
            handicap_mats,
            socket_mats,
            work_mats,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesResponse {
    pub items: Vec<TemplateResponse>,
}

impl From<Vec<Template>> for TemplatesResponse {
    fn from(value: Vec<Template>) -> Self {
        Self {
            items: value.into_iter().map(TemplateResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: TemplateId,
    pub facility_id: FacilityId,
    pub name: String,
    pub comments: Option<String>,
    pub active: bool,
    pub all_mats: String,
    pub handicap_mats: Option<String>,
    pub socket_mats: Option<String>,
    pub work_mats: Option<String>,
}

impl From<Template> for TemplateResponse {
    fn from(value: Template) -> Self {
        let Template {
            id,
            facility_id,
            name,
            comments,
            active,
            all_mats,
            handicap_mats,
            socket_mats,
            work_mats,
        } = value;
        Self {
            id,
            facility_id,
            name,
            comments,
            active,
            all_mats,
            handicap_mats,
            socket_mats,
            work_mats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> TemplateRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn malformed_lists_fail_validation() {
        let req = request(r#"{"name":"Standard","allMats":"1-x"}"#);
        assert!(req.validate(&()).is_err());
        let req = request(r#"{"name":"Standard","allMats":""}"#);
        assert!(req.validate(&()).is_err());
        let req = request(r#"{"name":"Standard","allMats":"1-10","workMats":"3-1"}"#);
        assert!(matches!(
            req.mats(),
            Err(TemplateMatsError::Unparseable {
                field: "workMats",
                ..
            })
        ));
    }

    #[test]
    fn lists_outside_all_mats_are_rejected() {
        let req = request(r#"{"name":"Standard","allMats":"1-10","handicapMats":"1,11"}"#);
        assert!(req.validate(&()).is_ok());
        assert_eq!(req.mats().unwrap_err(), TemplateMatsError::NotSubset("handicapMats"));
    }

    #[test]
    fn well_formed_template_builds_mats() {
        let req = request(
            r#"{"name":"Standard","allMats":"1-10","handicapMats":"1-2","socketMats":"9","workMats":"10"}"#,
        );
        assert!(req.validate(&()).is_ok());
        assert_eq!(req.mats().unwrap().generated_mats().len(), 10);
    }
}
