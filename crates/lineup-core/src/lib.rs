// Library root: re-exports all modules so the CLI and integration tests
// can access the crate's public API.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod formation;
pub mod player;
pub mod prediction;
pub mod roster;
pub mod store;
pub mod submission;
pub mod validate;
