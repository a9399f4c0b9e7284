use kernel::model::{
    id::{FacilityId, UserId},
    user::User,
};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub facility_id: FacilityId,
    pub name: String,
    pub username: String,
    pub scope: String,
    pub level: String,
    pub active: bool,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            facility_id,
            name,
            username,
            scope,
            level,
            active,
        } = value;
        User {
            id: user_id,
            facility_id,
            name,
            username,
            scope,
            level,
            active,
        }
    }
}

// ログイン時のパスワード検証にだけ使う
#[derive(sqlx::FromRow)]
pub struct UserCredentialRow {
    pub user_id: UserId,
    pub password_hash: String,
    pub active: bool,
}
