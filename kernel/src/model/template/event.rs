use derive_new::new;

use crate::model::id::{FacilityId, TemplateId};

#[derive(Debug)]
pub struct CreateTemplate {
    pub facility_id: FacilityId,
    pub name: String,
    pub comments: Option<String>,
    pub active: bool,
    pub all_mats: String,
    pub handicap_mats: Option<String>,
    pub socket_mats: Option<String>,
    pub work_mats: Option<String>,
}

#[derive(Debug)]
pub struct UpdateTemplate {
    pub template_id: TemplateId,
    pub facility_id: FacilityId,
    pub name: String,
    pub comments: Option<String>,
    pub active: bool,
    pub all_mats: String,
    pub handicap_mats: Option<String>,
    pub socket_mats: Option<String>,
    pub work_mats: Option<String>,
}

#[derive(Debug, new)]
pub struct DeleteTemplate {
    pub template_id: TemplateId,
    pub facility_id: FacilityId,
}
