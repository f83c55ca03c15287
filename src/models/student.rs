use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

lazy_static! {
    /// Local part starts with a letter and may contain letters, digits,
    /// dots and underscores; domain is letters-only with a TLD of at
    /// least two letters. Mirrors the service-side column constraint.
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z][A-Za-z0-9._]*@[A-Za-z]+\.[A-Za-z]{2,}$").unwrap();
}

/// A student record as returned by the service. The id is assigned
/// server-side and is absent before creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<i64>,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

/// Payload for creating or replacing a student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInput {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
}

impl StudentInput {
    pub fn validate(&self) -> Result<(), Error> {
        if self.firstname.trim().chars().count() < 2 {
            return Err(Error::Validation(
                "first name must be at least 2 characters long".into(),
            ));
        }
        if self.lastname.trim().chars().count() < 2 {
            return Err(Error::Validation(
                "last name must be at least 2 characters long".into(),
            ));
        }
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(Error::Validation(format!(
                "\"{}\" is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }
}
