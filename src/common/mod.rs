// Shared constants used across the crate
pub mod constants;
