//! CLI command implementations.

pub mod about;
pub mod clean;
pub mod inspect;
