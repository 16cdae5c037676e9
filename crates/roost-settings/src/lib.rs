//! # roost-settings
//!
//! Client configuration, resolved once before an orchestrator is built.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ClientSettings::default()`]
//! 2. **Settings file**: optional JSON file, deep-merged over defaults
//! 3. **Environment variables**: `TWITTER_*` overrides (highest priority)
//!
//! Loading never fails on missing credentials; that is the job of
//! [`ClientSettings::validate`], which the client facade calls before it
//! constructs anything.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, apply_overrides_with, deep_merge, load_settings, load_settings_from_path};
pub use types::*;
