//! Pre-built values for tests.

pub mod errors;
pub mod messages;
pub mod requests;
