//! Owner identity management.
//!
//! There is no ambient "current user" anywhere in the core: every store
//! and engine call takes an explicit owner id. This module only decides
//! which id the CLI passes in. Resolution order:
//! 1) CLI --owner (explicit)
//! 2) TD_OWNER environment variable
//! 3) Persisted value in `<data_dir>/owner`
//! 4) Config default (owner.default), if set

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;

/// Resolve the owner identity using CLI, environment, persisted value,
/// and config. Errors with `OwnerNotSet` when nothing resolves.
pub fn resolve_owner(
    storage: &Storage,
    config: &Config,
    cli_owner: Option<&str>,
) -> Result<String> {
    if let Some(owner) = non_empty(cli_owner) {
        return Ok(owner.to_string());
    }

    if let Ok(env_owner) = std::env::var("TD_OWNER") {
        if let Some(owner) = non_empty(Some(env_owner.as_str())) {
            return Ok(owner.to_string());
        }
    }

    if let Some(owner) = load_persisted_owner(storage)? {
        return Ok(owner);
    }

    if let Some(owner) = non_empty(config.owner.default.as_deref()) {
        return Ok(owner.to_string());
    }

    Err(Error::OwnerNotSet)
}

/// Persist the owner identity in `<data_dir>/owner`.
pub fn persist_owner(storage: &Storage, owner: &str) -> Result<()> {
    let owner = non_empty(Some(owner))
        .ok_or_else(|| Error::InvalidArgument("owner name cannot be empty".to_string()))?;

    std::fs::create_dir_all(storage.data_dir())?;
    std::fs::write(storage.owner_file(), format!("{owner}\n"))?;
    Ok(())
}

/// Load the persisted owner identity, if present.
pub fn load_persisted_owner(storage: &Storage) -> Result<Option<String>> {
    let path = storage.owner_file();
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let owner = raw.trim();
    if owner.is_empty() {
        return Ok(None);
    }

    Ok(Some(owner.to_string()))
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
