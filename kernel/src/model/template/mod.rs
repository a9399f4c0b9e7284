use thiserror::Error;

use crate::model::{
    checkin::event::GeneratedMat,
    id::{FacilityId, TemplateId},
    mats::{MatsList, MatsListError},
};

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
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

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateMatsError {
    #[error("{field}: {source}")]
    Unparseable {
        field: &'static str,
        #[source]
        source: MatsListError,
    },
    #[error("{0} must only contain mats listed in allMats")]
    NotSubset(&'static str),
}

/// Parsed mat lists of a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateMats {
    pub all: MatsList,
    pub handicap: MatsList,
    pub socket: MatsList,
    pub work: MatsList,
}

impl TemplateMats {
    pub fn parse(
        all_mats: &str,
        handicap_mats: Option<&str>,
        socket_mats: Option<&str>,
        work_mats: Option<&str>,
    ) -> Result<Self, TemplateMatsError> {
        fn list(field: &'static str, raw: Option<&str>) -> Result<MatsList, TemplateMatsError> {
            raw.unwrap_or_default()
                .parse()
                .map_err(|source| TemplateMatsError::Unparseable { field, source })
        }

        let mats = Self {
            all: list("allMats", Some(all_mats))?,
            handicap: list("handicapMats", handicap_mats)?,
            socket: list("socketMats", socket_mats)?,
            work: list("workMats", work_mats)?,
        };
        for (field, subset) in [
            ("handicapMats", &mats.handicap),
            ("socketMats", &mats.socket),
            ("workMats", &mats.work),
        ] {
            if !subset.is_subset_of(&mats.all) {
                return Err(TemplateMatsError::NotSubset(field));
            }
        }
        Ok(mats)
    }

    /// One entry per mat in `all`, tagged `H`, `S` and `W` for its features.
    pub fn generated_mats(&self) -> Vec<GeneratedMat> {
        self.all
            .iter()
            .map(|mat| {
                let mut features = String::new();
                if self.handicap.contains(mat) {
                    features.push('H');
                }
                if self.socket.contains(mat) {
                    features.push('S');
                }
                if self.work.contains(mat) {
                    features.push('W');
                }
                GeneratedMat::new(mat, (!features.is_empty()).then_some(features))
            })
            .collect()
    }
}

impl Template {
    pub fn mats(&self) -> Result<TemplateMats, TemplateMatsError> {
        TemplateMats::parse(
            &self.all_mats,
            self.handicap_mats.as_deref(),
            self.socket_mats.as_deref(),
            self.work_mats.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsets_must_fit_inside_all_mats() {
        let err = TemplateMats::parse("1-5", Some("2"), Some("6"), None).unwrap_err();
        assert_eq!(err, TemplateMatsError::NotSubset("socketMats"));
    }

    #[test]
    fn unparseable_lists_name_their_field() {
        let err = TemplateMats::parse("1-5", None, None, Some("x")).unwrap_err();
        assert!(matches!(
            err,
            TemplateMatsError::Unparseable {
                field: "workMats",
                ..
            }
        ));
    }

    #[test]
    fn generated_mats_carry_features() {
        let mats = TemplateMats::parse("1-4", Some("1,2"), Some("2"), Some("4")).unwrap();
        assert_eq!(
            mats.generated_mats(),
            vec![
                GeneratedMat::new(1, Some("H".into())),
                GeneratedMat::new(2, Some("HS".into())),
                GeneratedMat::new(3, None),
                GeneratedMat::new(4, Some("W".into())),
            ]
        );
    }
}
