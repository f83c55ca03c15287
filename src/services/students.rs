use crate::error::Result;
use crate::models::student::{Student, StudentInput};
use crate::services::roster::{ListController, RosterRecord};

pub type StudentController = ListController<Student>;

impl RosterRecord for Student {
    type Input = StudentInput;

    const COLLECTION: &'static str = "students";
    const AUTHENTICATED_READS: bool = true;
    const DUPLICATE_FIELD: &'static str = "email";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(input: &StudentInput) -> Result<()> {
        input.validate()
    }

    /// Email uniqueness is enforced by the service (409 on conflict);
    /// there is no local pre-check.
    fn conflicts_with(&self, _input: &StudentInput) -> bool {
        false
    }

    fn matches_filter(&self, needle: &str) -> bool {
        self.firstname.to_lowercase().contains(needle)
            || self.lastname.to_lowercase().contains(needle)
            || self.email.to_lowercase().contains(needle)
    }
}
