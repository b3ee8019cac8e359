//! Shared error and value types.

pub mod errors;
pub mod types;

pub use errors::{Result, SysmonError};
