#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game rules for Slide Exit.
//!
//! [`apply_action`] is the single entry point: it takes an [`Action`] carrying
//! the current snapshot, works on an owned copy and returns the next snapshot.
//! Every random draw comes from a generator derived from the seed, level and
//! turn, so replaying an action always produces the same state.

mod config;

use log::debug;
use slide_exit_core::{
    derive_rand, Action, Direction, EditLocation, EngineError, GameState, LevelEntry, Rand, Seed,
    Settings, Status, TileId, RNG_STREAM_AI_SPAWN, RNG_STREAM_LEVEL_SETUP, RNG_STREAM_TURN,
};
use slide_exit_system_editing::{apply_edit, apply_settings_patch, Gesture};
use slide_exit_system_exits::resolve_exits;
use slide_exit_system_movement::slide;
use slide_exit_system_progression::{
    next_level_entry, place_carried, resolve_end_state, start_level, CarriedTile, EndState,
};
use slide_exit_system_spawning::{resolve_spawn_priorities, spawn_tile};

pub use config::{default_levels, ConfigError, LevelCatalog};
pub use slide_exit_system_diff::get_state_diffs;

/// Applies `action` and returns the resulting snapshot.
///
/// Actions that do not fit the current status are ignored and return the
/// state unchanged.
///
/// # Errors
///
/// Fails fast on broken invariants: a level without settings, a level setup
/// without room for its mandatory tiles, or a colliding placement.
pub fn apply_action(action: Action) -> Result<GameState, EngineError> {
    match action {
        Action::Init { seed, levels } => init(seed, levels.unwrap_or_else(default_levels)),
        Action::Up { state } => slide_turn(state, Direction::Up),
        Action::Down { state } => slide_turn(state, Direction::Down),
        Action::Left { state } => slide_turn(state, Direction::Left),
        Action::Right { state } => slide_turn(state, Direction::Right),
        Action::Tap { state } | Action::Tick { state } => ai_turn(state),
        Action::EditTap { state, location } => edit(state, Gesture::Tap, location),
        Action::EditHold { state, location } => edit(state, Gesture::Hold, location),
        Action::EditLevelSettings {
            mut state,
            level,
            settings,
        } => {
            apply_settings_patch(&mut state, level, &settings)?;
            if level == state.level {
                rebuild_level(&mut state)?;
            }
            Ok(state)
        }
        Action::ResetLevel { mut state } => {
            rebuild_level(&mut state)?;
            Ok(state)
        }
        Action::ResetGame { mut state } => {
            begin_level(&mut state, 1, LevelEntry::default())?;
            Ok(state)
        }
        Action::RegenerateLevel { mut state, seed } => {
            state.seed = seed;
            rebuild_level(&mut state)?;
            Ok(state)
        }
    }
}

fn init(seed: Seed, levels: Vec<Settings>) -> Result<GameState, EngineError> {
    let mut state = GameState {
        tiles: Vec::new(),
        score: 0,
        status: Status::UserTurn,
        level: 1,
        seed,
        turn: 0,
        level_settings: levels,
        overlay_tiles: Vec::new(),
        entry: LevelEntry::default(),
    };
    begin_level(&mut state, 1, LevelEntry::default())?;
    Ok(state)
}

fn slide_turn(mut state: GameState, direction: Direction) -> Result<GameState, EngineError> {
    if state.status != Status::UserTurn {
        debug!("ignoring {direction:?} during {:?}", state.status);
        return Ok(state);
    }

    let settings = state.settings()?.clone();
    let slid = slide(&mut state.tiles, direction, settings.grid_size);
    let exits = resolve_exits(&mut state.tiles, direction, &settings);
    state.score += slid.score;

    let mut pending = Status::UserTurn;
    if slid.changed || exits.changed {
        if settings.defers_spawn() {
            pending = Status::AiTurn;
        } else {
            let mut rand = derive_rand(&state.seed, state.level, state.turn, RNG_STREAM_TURN);
            spawn_phase(&mut state, &settings, &mut rand)?;
        }
        state.turn += 1;
    }

    finish_turn(state, Some(direction), pending)
}

fn ai_turn(mut state: GameState) -> Result<GameState, EngineError> {
    if state.status != Status::AiTurn {
        debug!("no automatic step pending during {:?}", state.status);
        return Ok(state);
    }

    let settings = state.settings()?.clone();
    let mut rand = derive_rand(&state.seed, state.level, state.turn, RNG_STREAM_AI_SPAWN);
    spawn_phase(&mut state, &settings, &mut rand)?;
    finish_turn(state, None, Status::UserTurn)
}

/// Spawns the turn's tile and refreshes the spawn overlay.
fn spawn_phase(
    state: &mut GameState,
    settings: &Settings,
    rand: &mut Rand,
) -> Result<(), EngineError> {
    let reserved: Vec<TileId> = state
        .tiles
        .iter()
        .filter_map(|tile| tile.merged_from)
        .flatten()
        .collect();
    let spawned = spawn_tile(
        &mut state.tiles,
        settings,
        &state.overlay_tiles,
        &reserved,
        rand,
    )?;
    state.overlay_tiles = resolve_spawn_priorities(
        settings,
        &state.overlay_tiles,
        spawned.map(|spawned| spawned.position),
        rand,
    )?;
    Ok(())
}

fn finish_turn(
    mut state: GameState,
    direction: Option<Direction>,
    pending: Status,
) -> Result<GameState, EngineError> {
    match resolve_end_state(&state, direction)? {
        EndState::Continue => state.status = pending,
        EndState::Lost => state.status = Status::Lost,
        EndState::Won => state.status = Status::Won,
        EndState::Advance { carried } => {
            let entry = next_level_entry(&state, carried)?;
            let level = state.level + 1;
            begin_level(&mut state, level, entry)?;
        }
    }
    debug!(
        "level {} turn {} ends with {:?}",
        state.level, state.turn, state.status
    );
    Ok(state)
}

fn edit(
    mut state: GameState,
    gesture: Gesture,
    location: EditLocation,
) -> Result<GameState, EngineError> {
    if state.status != Status::UserTurn {
        debug!("ignoring {gesture:?} during {:?}", state.status);
        return Ok(state);
    }
    let _ = apply_edit(&mut state, gesture, location)?;
    Ok(state)
}

fn begin_level(state: &mut GameState, level: u32, entry: LevelEntry) -> Result<(), EngineError> {
    let mut rand = derive_rand(&state.seed, level, 0, RNG_STREAM_LEVEL_SETUP);
    start_level(state, level, entry, &mut rand)
}

/// Restarts the current level from its entry snapshot, refitted to the grid.
fn rebuild_level(state: &mut GameState) -> Result<(), EngineError> {
    let grid = state.settings()?.grid_size;
    let carried = state
        .entry
        .tiles
        .iter()
        .cloned()
        .map(|tile| CarriedTile { tile, via: None })
        .collect();
    let entry = LevelEntry {
        tiles: place_carried(carried, grid),
        score: state.entry.score,
        reserved_ids: state.entry.reserved_ids.clone(),
    };
    let level = state.level;
    begin_level(state, level, entry)
}

/// Query functions that provide read-only projections of a game state.
pub mod query {
    use serde::{Deserialize, Serialize};
    use slide_exit_core::{grid, EngineError, GameState, Position, TileId};

    /// Minimal, stable projection of a state used for snapshots and exports.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TestProps {
        /// Tiles ordered by identifier.
        pub tiles: Vec<TileProps>,
    }

    /// Projection of a single tile.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TileProps {
        /// Identifier of the tile.
        pub tile_id: TileId,
        /// Value of the tile, `None` for walls.
        pub value: Option<u32>,
        /// Row of the tile.
        pub row: i32,
        /// Column of the tile.
        pub column: i32,
    }

    /// Projects the tiles of `state` sorted by identifier.
    #[must_use]
    pub fn test_props(state: &GameState) -> TestProps {
        let mut tiles: Vec<TileProps> = state
            .tiles
            .iter()
            .map(|tile| TileProps {
                tile_id: tile.id,
                value: tile.value,
                row: tile.position.row(),
                column: tile.position.column(),
            })
            .collect();
        tiles.sort_by_key(|tile| tile.tile_id);
        TestProps { tiles }
    }

    /// Tile value that completes the current level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingLevelSettings`] for an unconfigured level.
    pub fn goal_value(state: &GameState) -> Result<u32, EngineError> {
        Ok(grid::goal_value(state.settings()?.grid_size))
    }

    /// Free cells of the current level in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingLevelSettings`] for an unconfigured level.
    pub fn available_positions(state: &GameState) -> Result<Vec<Position>, EngineError> {
        Ok(grid::available_positions(
            state.settings()?.grid_size,
            &state.tiles,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_exit_core::{GridSize, Position, Tile};

    fn single_level_state(tiles: Vec<Tile>) -> GameState {
        GameState {
            tiles,
            score: 0,
            status: Status::UserTurn,
            level: 1,
            seed: Seed::Number(1),
            turn: 0,
            level_settings: vec![Settings::new(GridSize::new(4, 4))],
            overlay_tiles: Vec::new(),
            entry: LevelEntry::default(),
        }
    }

    #[test]
    fn slides_are_ignored_outside_the_player_turn() {
        let mut state =
            single_level_state(vec![Tile::new(TileId::new(0), Position::new(3, 0), Some(2))]);
        state.status = Status::Won;

        let next = apply_action(Action::Up {
            state: state.clone(),
        })
        .expect("valid state");
        assert_eq!(next, state);
    }

    #[test]
    fn ticks_are_ignored_on_the_player_turn() {
        let state =
            single_level_state(vec![Tile::new(TileId::new(0), Position::new(3, 0), Some(2))]);
        let next = apply_action(Action::Tick {
            state: state.clone(),
        })
        .expect("valid state");
        assert_eq!(next, state);
    }

    #[test]
    fn unchanged_slide_keeps_the_turn_counter() {
        let state =
            single_level_state(vec![Tile::new(TileId::new(0), Position::new(0, 0), Some(2))]);
        let next = apply_action(Action::Up { state }).expect("valid state");
        assert_eq!(next.turn, 0);
        assert_eq!(next.tiles.len(), 1);
    }

    #[test]
    fn query_projects_tiles_by_id() {
        let state = single_level_state(vec![
            Tile::new(TileId::new(3), Position::new(1, 2), Some(4)),
            Tile::new(TileId::new(1), Position::new(0, 0), None),
        ]);
        let props = query::test_props(&state);
        assert_eq!(props.tiles[0].tile_id, TileId::new(1));
        assert_eq!(props.tiles[1].row, 1);
        assert_eq!(query::goal_value(&state), Ok(2_048));
        assert_eq!(query::available_positions(&state).map(|cells| cells.len()), Ok(14));
    }
}
