// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod balance;
pub mod cli;
pub mod config;
pub mod db;
pub mod roster;
