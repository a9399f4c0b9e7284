use crate::model::{
    id::{FacilityId, UserId},
    scope::Scopes,
};

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub facility_id: FacilityId,
    pub name: String,
    pub username: String,
    pub scope: String,
    pub level: String,
    pub active: bool,
}

impl User {
    pub fn scopes(&self) -> Scopes {
        Scopes::parse(&self.scope)
    }
}
