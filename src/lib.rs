// Library exports for the CLI binary and tests
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
