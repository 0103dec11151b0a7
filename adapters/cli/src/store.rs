//! JSON persistence of the current game state.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{debug, warn};
use slide_exit_core::GameState;

/// Loads the saved state at `path`.
///
/// A missing or unreadable file yields `None`. The state is not validated.
pub(crate) fn load(path: &Path) -> Option<GameState> {
    if !path.exists() {
        debug!("no saved game at {}", path.display());
        return None;
    }
    match try_load(path) {
        Ok(state) => Some(state),
        Err(error) => {
            warn!("ignoring saved game: {error:#}");
            None
        }
    }
}

/// Saves `state` to `path`. Failures are logged and otherwise ignored.
pub(crate) fn save(path: &Path, state: &GameState) {
    if let Err(error) = try_save(path, state) {
        warn!("game state was not saved: {error:#}");
    }
}

fn try_load(path: &Path) -> Result<GameState> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn try_save(path: &Path, state: &GameState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        format!("failed to move {} to {}", tmp.display(), path.display())
    })?;
    debug!("saved game to {}", path.display());
    Ok(())
}
