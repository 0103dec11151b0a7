#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure level-authoring system.
//!
//! Translates tap and hold gestures on grid cells or edge slots into tile and
//! exit edits on the current level. Edits never touch status, score or turn.

use log::debug;
use slide_exit_core::{
    grid::place_tile, EditLocation, EngineError, ExitLocation, GameState, Goal, Position,
    Requirement, Settings, SettingsPatch, Side,
};

/// Authoring gesture kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// Short press: cycles values and creates or strengthens exits.
    Tap,
    /// Long press: deletes tiles and exits.
    Hold,
}

/// Applies an authoring gesture to the current level.
///
/// Returns whether anything changed. Targets outside the grid are ignored.
///
/// # Errors
///
/// Returns [`EngineError::MissingLevelSettings`] when the current level has no
/// settings.
pub fn apply_edit(
    state: &mut GameState,
    gesture: Gesture,
    location: EditLocation,
) -> Result<bool, EngineError> {
    let grid = state.settings()?.grid_size;
    let changed = match (gesture, location) {
        (_, EditLocation::Tile { position }) if !grid.contains(position) => false,
        (Gesture::Tap, EditLocation::Tile { position }) => tap_tile(state, position)?,
        (Gesture::Hold, EditLocation::Tile { position }) => hold_tile(state, position),
        (_, EditLocation::ExitLocation { side, index }) if index >= grid.edge_len(side) => false,
        (Gesture::Tap, EditLocation::ExitLocation { side, index }) => {
            tap_exit(state.settings_mut()?, side, index)
        }
        (Gesture::Hold, EditLocation::ExitLocation { side, index }) => {
            hold_exit(state.settings_mut()?, side, index)
        }
    };
    debug!("{gesture:?} on {location:?} changed={changed}");
    Ok(changed)
}

/// Next value in the authoring cycle: wall, zero, one, then doubling.
#[must_use]
pub const fn cycle_value(value: Option<u32>) -> Option<u32> {
    match value {
        None => Some(0),
        Some(0) => Some(1),
        Some(value) => Some(value.saturating_mul(2)),
    }
}

fn tap_tile(state: &mut GameState, position: Position) -> Result<bool, EngineError> {
    match state.tiles.iter().position(|tile| tile.position == position) {
        Some(index) => {
            let tile = &mut state.tiles[index];
            tile.set_value(cycle_value(tile.value));
        }
        None => {
            let _ = place_tile(&mut state.tiles, position, None)?;
        }
    }
    Ok(true)
}

fn hold_tile(state: &mut GameState, position: Position) -> bool {
    let before = state.tiles.len();
    state.tiles.retain(|tile| tile.position != position);
    state.tiles.len() != before
}

fn tap_exit(settings: &mut Settings, side: Side, index: u32) -> bool {
    let existing = settings
        .goals
        .iter_mut()
        .filter_map(Goal::exit_mut)
        .find(|exit| exit.is_at(side, index));

    match existing {
        Some(exit) => {
            let value = match exit.requirements.value() {
                0 => 1,
                value => value.saturating_mul(2),
            };
            exit.requirements = exit.requirements.with_value(value);
        }
        None => settings.goals.push(Goal::ExitLocation(ExitLocation::new(
            side,
            index,
            Requirement::GreaterThanEqualTo { value: 0 },
        ))),
    }
    true
}

fn hold_exit(settings: &mut Settings, side: Side, index: u32) -> bool {
    let before = settings.goals.len();
    settings
        .goals
        .retain(|goal| !goal.exit().is_some_and(|exit| exit.is_at(side, index)));
    settings.goals.len() != before
}

/// Merges `patch` into the settings of the one-based `level`.
///
/// # Errors
///
/// Returns [`EngineError::MissingLevelSettings`] when the level is not configured.
pub fn apply_settings_patch(
    state: &mut GameState,
    level: u32,
    patch: &SettingsPatch,
) -> Result<(), EngineError> {
    let settings = level
        .checked_sub(1)
        .and_then(|index| state.level_settings.get_mut(index as usize))
        .ok_or(EngineError::MissingLevelSettings { level })?;
    settings.apply_patch(patch);
    debug!("level {level} settings patched");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_cycle_walks_wall_zero_then_doubles() {
        let mut value = None;
        let mut seen = Vec::new();
        for _ in 0..5 {
            value = cycle_value(value);
            seen.push(value);
        }
        assert_eq!(seen, vec![Some(0), Some(1), Some(2), Some(4), Some(8)]);
    }
}
