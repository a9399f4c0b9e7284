use kernel::model::{
    id::{FacilityId, TemplateId},
    template::Template,
};

#[derive(sqlx::FromRow)]
pub struct TemplateRow {
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

impl From<TemplateRow> for Template {
    fn from(value: TemplateRow) -> Self {
        let TemplateRow {
            template_id,
            facility_id,
            name,
            comments,
            active,
            all_mats,
            handicap_mats,
            socket_mats,
            work_mats,
        } = value;
        Template {
            id: template_id,
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
