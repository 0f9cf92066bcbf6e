//! Testing infrastructure for logweave tests.
//!
//! - `fixtures`: factories for realistic session log records
//! - `TestWorld`: temp directory holding a session log and its side files

pub mod fixtures;
pub mod world;

pub use world::{CliResult, TestWorld};
