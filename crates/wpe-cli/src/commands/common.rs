//! Shared CLI helpers used across multiple commands.

use std::path::PathBuf;
use wpe_config::{ConfigError, Profile, default_profile_path, find_profile};

/// Where a profile came from.
pub enum ProfileSource {
    /// Loaded from this file.
    File(PathBuf),
    /// No file; built-in defaults.
    Defaults,
}

/// Load a profile by name or path, falling back to the user's default
/// profile and then to built-in defaults.
pub fn load_profile(name: Option<&str>) -> anyhow::Result<(Profile, ProfileSource)> {
    if let Some(name) = name {
        let path =
            find_profile(name).ok_or_else(|| ConfigError::ProfileNotFound(name.to_string()))?;
        let profile = Profile::load(&path)?;
        return Ok((profile, ProfileSource::File(path)));
    }

    let path = default_profile_path();
    if path.is_file() {
        let profile = Profile::load(&path)?;
        return Ok((profile, ProfileSource::File(path)));
    }

    Ok((Profile::default(), ProfileSource::Defaults))
}
