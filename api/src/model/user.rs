use derive_new::new;
use garde::Validate;
use kernel::model::{
    id::{FacilityId, UserId},
    log::LogLevel,
    scope::is_valid_user_scope,
    user::{
        event::{CreateUser, UpdateUser},
        User,
    },
};
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

fn default_level() -> String {
    LogLevel::Info.as_ref().to_string()
}

fn user_scope(value: &String, _: &()) -> garde::Result {
    if is_valid_user_scope(value) {
        Ok(())
    } else {
        Err(garde::Error::new(
            "scope must be 'superuser' or '<facility>:admin' / '<facility>:regular' tokens",
        ))
    }
}

fn log_level(value: &String, _: &()) -> garde::Result {
    value
        .parse::<LogLevel>()
        .map(|_| ())
        .map_err(|_| garde::Error::new(format!("'{value}' is not a log level")))
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1))]
    pub password: String,
    #[garde(custom(user_scope))]
    pub scope: String,
    #[serde(default = "default_level")]
    #[garde(custom(log_level))]
    pub level: String,
    #[serde(default = "default_active")]
    #[garde(skip)]
    pub active: bool,
}

#[derive(new)]
pub struct CreateUserRequestWithId(FacilityId, CreateUserRequest);

impl From<CreateUserRequestWithId> for CreateUser {
    fn from(value: CreateUserRequestWithId) -> Self {
        let CreateUserRequestWithId(
            facility_id,
            CreateUserRequest {
                name,
                username,
                password,
                scope,
                level,
                active,
            },
        ) = value;
        CreateUser {
            facility_id,
            name,
            username,
            password,
            scope,
            level: level.to_lowercase(),
            active,
        }
    }
}

/// Same fields as creation; the password is only replaced when given.
#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[garde(length(min = 1, max = 255))]
    pub name: String,
    #[garde(length(min = 1, max = 255))]
    pub username: String,
    #[garde(length(min = 1))]
    pub password: Option<String>,
    #[garde(custom(user_scope))]
    pub scope: String,
    #[serde(default = "default_level")]
    #[garde(custom(log_level))]
    pub level: String,
    #[serde(default = "default_active")]
    #[garde(skip)]
    pub active: bool,
}

#[derive(new)]
pub struct UpdateUserRequestWithIds(FacilityId, UserId, UpdateUserRequest);

impl From<UpdateUserRequestWithIds> for UpdateUser {
    fn from(value: UpdateUserRequestWithIds) -> Self {
        let UpdateUserRequestWithIds(
            facility_id,
            user_id,
            UpdateUserRequest {
                name,
                username,
                password,
                scope,
                level,
                active,
            },
        ) = value;
        UpdateUser {
            user_id,
            facility_id,
            name,
            username,
            password,
            scope,
            level: level.to_lowercase(),
            active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub items: Vec<UserResponse>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(value: Vec<User>) -> Self {
        Self {
            items: value.into_iter().map(UserResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub facility_id: FacilityId,
    pub name: String,
    pub username: String,
    pub scope: String,
    pub level: String,
    pub active: bool,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            id,
            facility_id,
            name,
            username,
            scope,
            level,
            active,
        } = value;
        Self {
            id,
            facility_id,
            name,
            username,
            scope,
            level,
            active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"Fred","username":"fred","password":"Pa55w0rd","scope":"east:regular"}"#,
        )
        .unwrap();
        assert!(req.validate(&()).is_ok());
        assert_eq!(req.level, "info");
        assert!(req.active);
    }

    #[test]
    fn rejects_unknown_scope_and_level() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"Fred","username":"fred","password":"x","scope":"east:owner"}"#,
        )
        .unwrap();
        assert!(req.validate(&()).is_err());
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"name":"Fred","username":"fred","password":"x","scope":"superuser","level":"chatty"}"#,
        )
        .unwrap();
        assert!(req.validate(&()).is_err());
    }

    #[test]
    fn update_without_password_keeps_it() {
        let req: UpdateUserRequest = serde_json::from_str(
            r#"{"name":"Fred","username":"fred","scope":"east:admin","level":"DEBUG"}"#,
        )
        .unwrap();
        assert!(req.validate(&()).is_ok());
        let event = UpdateUser::from(UpdateUserRequestWithIds::new(
            FacilityId::new(),
            UserId::new(),
            req,
        ));
        assert_eq!(event.password, None);
        assert_eq!(event.level, "debug");
    }

    #[test]
    fn response_never_contains_password() {
        let user = User {
            id: UserId::new(),
            facility_id: FacilityId::new(),
            name: "Fred".into(),
            username: "fred".into(),
            scope: "east:regular".into(),
            level: "info".into(),
            active: true,
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "fred");
    }
}
