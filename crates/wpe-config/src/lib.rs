//! Profile management for WPE dereverberation.
//!
//! A [`Profile`] is a TOML file holding every knob of a dereverberation run
//! (array size, prediction order, framing, output bit depth). Profiles live
//! in the platform config directory (see [`paths`]) or anywhere on disk.
//!
//! # Example
//!
//! ```rust,no_run
//! use wpe_config::{Profile, default_profile_path};
//!
//! let mut profile = Profile::new("conference");
//! profile.mic_num = 8;
//! profile.out_num = 1;
//! profile.save(default_profile_path()).unwrap();
//!
//! let config = Profile::load(default_profile_path())
//!     .unwrap()
//!     .to_wpe_config()
//!     .unwrap();
//! assert_eq!(config.mic_count, 8);
//! ```

mod error;
mod profile;

/// Platform-specific paths for profiles.
pub mod paths;

pub use error::ConfigError;
pub use paths::{
    default_profile_path, find_profile, list_user_profiles, profile_name_from_path, user_config_dir,
    user_profiles_dir,
};
pub use profile::{DEFAULT_BIT_DEPTH, DEFAULT_WINDOW, Profile};
