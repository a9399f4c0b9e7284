use std::collections::BTreeSet;

use strum::{AsRefStr, EnumString};

pub const SUPERUSER: &str = "superuser";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    Regular,
    Admin,
    Superuser,
}

/// The set of scope tokens granted to a user.
///
/// Tokens are either `superuser` or `<facility scope>:<permission>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scopes(BTreeSet<String>);

impl Scopes {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(str::to_string).collect())
    }

    pub fn is_superuser(&self) -> bool {
        self.0.contains(SUPERUSER)
    }

    pub fn allows(&self, facility_scope: &str, required: Permission) -> bool {
        if self.is_superuser() {
            return true;
        }
        match required {
            Permission::Superuser => false,
            Permission::Admin => self.0.contains(&token(facility_scope, Permission::Admin)),
            Permission::Regular => {
                self.0.contains(&token(facility_scope, Permission::Admin))
                    || self.0.contains(&token(facility_scope, Permission::Regular))
            }
        }
    }

    /// Facility scopes the user holds any permission on, or `None` for a superuser.
    pub fn visible_facilities(&self) -> Option<Vec<String>> {
        if self.is_superuser() {
            return None;
        }
        let facilities: BTreeSet<String> = self
            .tokens()
            .filter_map(|t| t.split_once(':'))
            .filter(|(_, permission)| {
                matches!(
                    permission.parse::<Permission>(),
                    Ok(Permission::Admin | Permission::Regular)
                )
            })
            .map(|(facility, _)| facility.to_string())
            .collect();
        Some(facilities.into_iter().collect())
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::fmt::Display for Scopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.tokens().collect::<Vec<_>>().join(" "))
    }
}

pub fn token(facility_scope: &str, permission: Permission) -> String {
    match permission {
        Permission::Superuser => SUPERUSER.to_string(),
        _ => format!("{}:{}", facility_scope, permission.as_ref()),
    }
}

/// A facility scope is a single token of letters, digits and underscores.
pub fn is_valid_facility_scope(scope: &str) -> bool {
    !scope.is_empty()
        && scope != SUPERUSER
        && scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Every token must be `superuser` or reference a facility scope with a known permission.
pub fn is_valid_user_scope(raw: &str) -> bool {
    let scopes = Scopes::parse(raw);
    !scopes.0.is_empty()
        && scopes.tokens().all(|t| {
            t == SUPERUSER
                || match t.split_once(':') {
                    Some((facility, permission)) => {
                        is_valid_facility_scope(facility)
                            && matches!(
                                permission.parse::<Permission>(),
                                Ok(Permission::Admin | Permission::Regular)
                            )
                    }
                    None => false,
                }
        })
}
