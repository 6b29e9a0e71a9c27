//! # Leader election test cases
//!
//! This subproject provides integration tests for the replica set leader election.

#[macro_use]
extern crate log;
pub mod cases;
mod steps;

pub use self::cases::smoke;
