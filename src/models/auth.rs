use serde::{Deserialize, Serialize};

/// Claims carried in the access token payload. Only the subject is
/// mandatory; the role arrives either as a singular `role` claim or as
/// the first entry of a `roles` array, depending on the issuer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl Claims {
    /// The singular `role` claim wins; otherwise the first of `roles`.
    pub fn resolved_role(&self) -> Option<&str> {
        if let Some(role) = self.role.as_deref() {
            return Some(role);
        }
        self.roles
            .as_deref()
            .and_then(|roles| roles.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// The persisted session triple. `username` and `role` are derived from
/// the token payload at install time and are written and cleared as a
/// unit with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
    pub role: String,
}
