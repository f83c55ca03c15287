pub mod auth;
pub mod gateway;
pub mod roster;
pub mod students;
pub mod users;
