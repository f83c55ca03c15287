use crate::error::Result;
use crate::models::user::{User, UserInput};
use crate::services::roster::{ListController, RosterRecord};

pub type UserController = ListController<User>;

impl RosterRecord for User {
    type Input = UserInput;

    const COLLECTION: &'static str = "users";
    /// The service exposes the user directory without a credential;
    /// only mutations are protected.
    const AUTHENTICATED_READS: bool = false;
    const DUPLICATE_FIELD: &'static str = "username";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(input: &UserInput) -> Result<()> {
        input.validate()
    }

    /// Usernames are unique case-insensitively.
    fn conflicts_with(&self, input: &UserInput) -> bool {
        self.username.to_lowercase() == input.username.trim().to_lowercase()
    }

    fn matches_filter(&self, needle: &str) -> bool {
        self.username.to_lowercase().contains(needle)
            || self.role.to_string().to_lowercase().contains(needle)
    }
}
