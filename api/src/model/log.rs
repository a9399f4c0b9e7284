use garde::Validate;
use kernel::model::log::{ClientLog, LogLevel};
use serde::{Deserialize, Serialize};

fn log_level(value: &String, _: &()) -> garde::Result {
    value
        .parse::<LogLevel>()
        .map(|_| ())
        .map_err(|_| garde::Error::new(format!("'{value}' is not a log level")))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClientLogRequest {
    #[garde(custom(log_level))]
    pub level: String,
    #[garde(length(min = 1))]
    pub message: String,
    #[garde(skip)]
    pub username: Option<String>,
    #[garde(skip)]
    pub timestamp: Option<String>,
}

impl TryFrom<ClientLogRequest> for ClientLog {
    type Error = strum::ParseError;

    fn try_from(value: ClientLogRequest) -> Result<Self, Self::Error> {
        let ClientLogRequest {
            level,
            message,
            username,
            timestamp,
        } = value;
        Ok(ClientLog {
            level: level.parse()?,
            message,
            username,
            timestamp,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilesResponse {
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_log_level_must_be_known() {
        let req: ClientLogRequest =
            serde_json::from_str(r#"{"level":"WARN","message":"slow render"}"#).unwrap();
        assert!(req.validate(&()).is_ok());
        let log = ClientLog::try_from(req).unwrap();
        assert_eq!(log.level, LogLevel::Warn);

        let req: ClientLogRequest =
            serde_json::from_str(r#"{"level":"shout","message":"x"}"#).unwrap();
        assert!(req.validate(&()).is_err());
    }
}
