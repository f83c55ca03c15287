use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Roles issued by the roster service. `Admin` is the privileged role
/// that gates every mutating operation on both resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "USER")]
    User,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            _ => Err(anyhow::anyhow!("Unknown role: {s}")),
        }
    }
}

/// A user account as returned by the service. The id is assigned
/// server-side and is absent before creation. `password` round-trips on
/// writes but is never rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role: Role,
}

/// Payload for creating or replacing a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInput {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl UserInput {
    pub fn validate(&self) -> Result<(), Error> {
        if self.username.trim().chars().count() < 3 {
            return Err(Error::Validation(
                "username must be at least 3 characters long".into(),
            ));
        }
        if self.password.trim().chars().count() < 6 {
            return Err(Error::Validation(
                "password must be at least 6 characters long".into(),
            ));
        }
        Ok(())
    }
}
