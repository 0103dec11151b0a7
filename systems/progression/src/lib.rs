#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level progression system.
//!
//! Decides how a completed turn ends (keep playing, lose, win or advance),
//! carries qualifying tiles across a level boundary and runs the setup of a
//! freshly entered level.

use std::collections::HashSet;

use log::{debug, warn};
use slide_exit_core::{
    grid::{available_positions, goal_value, has_adjacent_merge},
    Direction, EngineError, GameState, GridSize, LevelEntry, Position, Rand, Side, Status, Tile,
    TileId,
};
use slide_exit_system_exits::resolve_random_exits;
use slide_exit_system_spawning::{
    resolve_spawn_priorities, spawn_obstacles, spawn_starters,
};

/// Tile leaving the current level together with the edge it left through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarriedTile {
    /// Tile as it stood at the end of the turn.
    pub tile: Tile,
    /// Edge the tile left through. `None` keeps its position.
    pub via: Option<Side>,
}

/// How a completed turn ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EndState {
    /// Play continues on the current level.
    Continue,
    /// No move can change the board.
    Lost,
    /// The final level was completed.
    Won,
    /// The level was completed and the next one should start with `carried`.
    Advance {
        /// Tiles taken into the next level.
        carried: Vec<CarriedTile>,
    },
}

/// Evaluates the end of a turn in priority order: exits, goal value, deadlock.
///
/// `direction` is the slide that completed the turn, if any. Tiles merged up
/// to the goal value this turn are carried as if they left through that side.
/// A tile that already held the goal value before the turn does not complete
/// the level again.
///
/// # Errors
///
/// Returns [`EngineError::MissingLevelSettings`] when the current level has no
/// settings.
pub fn resolve_end_state(
    state: &GameState,
    direction: Option<Direction>,
) -> Result<EndState, EngineError> {
    let grid = state.settings()?.grid_size;

    let exited: Vec<CarriedTile> = state
        .tiles
        .iter()
        .filter(|tile| !grid.contains(tile.position))
        .map(|tile| CarriedTile {
            tile: tile.clone(),
            via: exit_side(tile.position, grid),
        })
        .collect();
    if !exited.is_empty() {
        debug!("{} tile(s) exited level {}", exited.len(), state.level);
        return Ok(complete_level(state, exited));
    }

    let goal = goal_value(grid);
    let reached: Vec<CarriedTile> = state
        .tiles
        .iter()
        .filter(|tile| tile.merged_from.is_some())
        .filter(|tile| tile.value.is_some_and(|value| value >= goal))
        .map(|tile| CarriedTile {
            tile: tile.clone(),
            via: direction.map(Direction::side),
        })
        .collect();
    if !reached.is_empty() {
        debug!("goal value {goal} reached on level {}", state.level);
        return Ok(complete_level(state, reached));
    }

    if available_positions(grid, &state.tiles).is_empty() && !has_adjacent_merge(grid, &state.tiles)
    {
        debug!("level {} deadlocked", state.level);
        return Ok(EndState::Lost);
    }

    Ok(EndState::Continue)
}

fn complete_level(state: &GameState, carried: Vec<CarriedTile>) -> EndState {
    if state.is_last_level() {
        EndState::Won
    } else {
        EndState::Advance { carried }
    }
}

/// Edge a tile crossed to reach an out-of-bounds position.
#[must_use]
pub fn exit_side(position: Position, grid: GridSize) -> Option<Side> {
    if position.row() < 0 {
        Some(Side::Top)
    } else if position.row() >= grid.rows as i32 {
        Some(Side::Bottom)
    } else if position.column() < 0 {
        Some(Side::Left)
    } else if position.column() >= grid.columns as i32 {
        Some(Side::Right)
    } else {
        None
    }
}

/// Cell of `grid` a tile re-enters on after leaving through `via`.
///
/// The tile appears on the opposite edge, keeping its column (or row) and
/// clamped into the grid.
#[must_use]
pub fn entry_position(position: Position, via: Option<Side>, grid: GridSize) -> Position {
    let last_row = grid.rows.saturating_sub(1) as i32;
    let last_column = grid.columns.saturating_sub(1) as i32;
    let entered = match via {
        Some(Side::Top) => Position::new(last_row, position.column()),
        Some(Side::Bottom) => Position::new(0, position.column()),
        Some(Side::Left) => Position::new(position.row(), last_column),
        Some(Side::Right) => Position::new(position.row(), 0),
        None => position,
    };
    grid.clamp(entered)
}

/// Entry snapshot of the level after the current one.
///
/// Every identifier of the finished level that is not carried over, including
/// tiles absorbed by this turn's merges, is reserved for the new level.
///
/// # Errors
///
/// Returns [`EngineError::MissingLevelSettings`] when the next level has no
/// settings.
pub fn next_level_entry(
    state: &GameState,
    carried: Vec<CarriedTile>,
) -> Result<LevelEntry, EngineError> {
    let grid = state.settings_for(state.level + 1)?.grid_size;
    let tiles = place_carried(carried, grid);
    let kept: HashSet<TileId> = tiles.iter().map(|tile| tile.id).collect();

    let mut reserved_ids: Vec<TileId> = state
        .tiles
        .iter()
        .flat_map(|tile| std::iter::once(tile.id).chain(tile.merged_from.into_iter().flatten()))
        .filter(|id| !kept.contains(id))
        .collect();
    reserved_ids.sort_unstable();
    reserved_ids.dedup();

    Ok(LevelEntry {
        tiles,
        score: state.score,
        reserved_ids,
    })
}

/// Lays carried tiles out on `grid`.
///
/// Tiles keep their id and value, lose their merge marker and land on the
/// entry edge for their side. A tile landing on a cell already taken by an
/// earlier carried tile is dropped.
#[must_use]
pub fn place_carried(carried: Vec<CarriedTile>, grid: GridSize) -> Vec<Tile> {
    let mut occupied = HashSet::new();
    let mut tiles = Vec::with_capacity(carried.len());

    for CarriedTile { mut tile, via } in carried {
        let position = entry_position(tile.position, via, grid);
        if !occupied.insert(position) {
            warn!(
                "dropping carried tile {} because {position} is already taken",
                tile.id.get()
            );
            continue;
        }
        tile.position = position;
        tile.merged_from = None;
        tiles.push(tile);
    }
    tiles
}

/// Starts `level` from `entry`.
///
/// Random exits are rolled, obstacles scattered, the spawn overlay built and
/// the starter tiles placed. The turn counter restarts and the player moves
/// next.
///
/// # Errors
///
/// Returns [`EngineError::MissingLevelSettings`] for an unknown level and
/// [`EngineError::NoSpawnPosition`] when the level has no room for its
/// mandatory tiles.
pub fn start_level(
    state: &mut GameState,
    level: u32,
    entry: LevelEntry,
    rand: &mut Rand,
) -> Result<(), EngineError> {
    state.level = level;
    let settings = state.settings_mut()?;
    let grid = settings.grid_size;
    resolve_random_exits(&mut settings.goals, grid, rand)?;
    let settings = settings.clone();

    let mut tiles = entry.tiles.clone();
    let reserved = &entry.reserved_ids;
    let _ = spawn_obstacles(&mut tiles, &settings, reserved, level, rand)?;
    let overlays = resolve_spawn_priorities(&settings, &[], None, rand)?;
    let starters = spawn_starters(&mut tiles, &settings, &overlays, reserved, level, rand)?;
    let last_spawn = starters.last().map(|spawned| spawned.position);
    let overlays = resolve_spawn_priorities(&settings, &overlays, last_spawn, rand)?;

    debug!(
        "level {level} started with {} tile(s) on a {}x{} grid",
        tiles.len(),
        grid.rows,
        grid.columns
    );

    state.tiles = tiles;
    state.overlay_tiles = overlays;
    state.score = entry.score;
    state.turn = 0;
    state.status = Status::UserTurn;
    state.entry = entry;
    Ok(())
}
