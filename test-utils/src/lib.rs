//! Conduit Test Utils - shared fixtures for testing adapters and their callers.

pub mod fixtures;
