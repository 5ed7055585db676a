//! Platform-specific paths for dereverberation profiles.
//!
//! - **User config**: `~/.config/wpe/` (Linux),
//!   `~/Library/Application Support/wpe/` (macOS), `%APPDATA%\wpe\` (Windows)
//! - **Default profile**: `<user config>/profile.toml`
//! - **Named profiles**: `<user config>/profiles/<name>.toml`

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "wpe";

/// File name of the default profile.
const DEFAULT_PROFILE_FILE: &str = "profile.toml";

/// Subdirectory name for named profiles.
const PROFILES_SUBDIR: &str = "profiles";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the directory holding named profiles.
pub fn user_profiles_dir() -> PathBuf {
    user_config_dir().join(PROFILES_SUBDIR)
}

/// Returns the path of the default profile.
pub fn default_profile_path() -> PathBuf {
    user_config_dir().join(DEFAULT_PROFILE_FILE)
}

/// Find a profile file by path or name.
///
/// `name` may be a path to an existing TOML file, or a profile name (with or
/// without `.toml`) looked up in [`user_profiles_dir`].
pub fn find_profile(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    let user_path = user_profiles_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// List the named profiles in the user profiles directory.
pub fn list_user_profiles() -> Vec<PathBuf> {
    list_profiles_in_dir(&user_profiles_dir())
}

/// TOML files in `dir`, sorted by path. Empty if the directory is missing.
pub fn list_profiles_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut profiles: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    profiles.sort();
    profiles
}

/// Profile name from a file path (the file stem).
pub fn profile_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
