//! Loader for profile files (RON, or JSON by extension).

use bevy::prelude::*;
use ron::Options;
use std::fs;
use std::path::Path;

use super::Profile;

/// Error type for profile loading failures.
#[derive(Debug)]
pub struct ProfileLoadError {
    pub file: String,
    pub message: String,
}

impl std::fmt::Display for ProfileLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to load {}: {}", self.file, self.message)
    }
}

impl std::error::Error for ProfileLoadError {}

/// Create RON options with extensions enabled for more flexible parsing.
fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

/// Parse a profile from RON source. `file` is only used for error context.
pub fn parse_profile(file: &str, contents: &str) -> Result<Profile, ProfileLoadError> {
    ron_options()
        .from_str(contents)
        .map_err(|e| ProfileLoadError {
            file: file.to_string(),
            message: format!("Parse error: {}", e),
        })
}

/// Load a profile from disk. Files ending in `.json` are read as JSON,
/// everything else as RON. Missing fields fall back to defaults.
pub fn load_profile(path: &Path) -> Result<Profile, ProfileLoadError> {
    let file_name = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|e| ProfileLoadError {
        file: file_name.clone(),
        message: format!("IO error: {}", e),
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let profile = if is_json {
        serde_json::from_str(&contents).map_err(|e| ProfileLoadError {
            file: file_name.clone(),
            message: format!("Parse error: {}", e),
        })?
    } else {
        parse_profile(&file_name, &contents)?
    };

    info!(
        "Loaded profile {}: walk_speed={}, jump_speed={}, air_jumps={}",
        file_name,
        profile.walk_speed,
        profile.jump_speed,
        profile.air_jump_count()
    );

    Ok(profile)
}
