use garde::Validate;
use kernel::model::list::ListOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[garde(skip)]
    pub active: Option<bool>,
    #[garde(skip)]
    pub name: Option<String>,
    #[garde(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
    #[garde(range(min = 0))]
    pub offset: Option<i64>,
}

impl From<ListQuery> for ListOptions {
    fn from(value: ListQuery) -> Self {
        let ListQuery {
            active,
            name,
            limit,
            offset,
        } = value;
        Self {
            active,
            name,
            limit: limit.unwrap_or(ListOptions::DEFAULT_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}
