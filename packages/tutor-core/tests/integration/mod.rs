//! Integration test suite.
//!
//! 1. Fixture lifecycle (load, reload, integrity)
//! 2. Scenario results against the standard fixture
//! 3. Full runs through the runner

pub mod fixture_tests;
pub mod runner_tests;
pub mod scenario_tests;
