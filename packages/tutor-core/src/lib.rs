//! Fixture loader and scenario runner for SQL subquery tutorials.
//!
//! Loads a small relational dataset into an external SQL engine, runs the
//! registered subquery scenarios against it, and verifies each result.

pub mod config;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod verify;

pub use config::RunConfig;
pub use engine::{Dialect, QueryInterface, ResultSet, Value};
pub use error::TutorError;
pub use runner::DemoRunner;
