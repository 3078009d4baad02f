//! Utilities shared between Roomcast binaries and libraries.

pub mod logger;
pub mod time;
