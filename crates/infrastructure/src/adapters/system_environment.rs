//! Process environment access.

use std::path::PathBuf;

use nimbus_domain::{Mapping, Value};

/// Snapshot of the process environment as an `env:` mapping.
///
/// Variables whose name or value is not valid Unicode are skipped.
#[must_use]
pub fn system_environment() -> Mapping {
    std::env::vars_os()
        .filter_map(|(name, value)| {
            Some((name.into_string().ok()?, Value::String(value.into_string().ok()?)))
        })
        .collect()
}

/// The current user's home directory, used to expand `~` in file references.
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}
