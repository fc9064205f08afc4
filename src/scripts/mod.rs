//! Maintenance commands that need network access

pub mod fetch_shims;
