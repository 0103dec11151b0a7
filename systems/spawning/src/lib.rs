#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system.
//!
//! Chooses the value and cell of new tiles, scatters level obstacles and
//! maintains the spawn-priority overlay that overrides random placement.

mod priorities;

use log::debug;
use slide_exit_core::{
    grid::{next_free_id, Occupancy},
    EngineError, OverlayTile, Position, Rand, RandError, Settings, SpawnTilesMethod, Tile,
    TileColors, TileId,
};

pub use priorities::resolve_spawn_priorities;

/// Number of tiles placed when a level starts.
pub const STARTER_TILE_COUNT: usize = 2;

/// Description of a tile created by the spawning system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Spawned {
    /// Identifier allocated to the tile.
    pub id: TileId,
    /// Cell the tile appeared on.
    pub position: Position,
    /// Value of the tile.
    pub value: Option<u32>,
    /// Colours derived from the value.
    pub colors: TileColors,
}

/// How the cell of a spawn is selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Uniformly random among free cells, ignoring spawn priorities.
    Random,
    /// Follows the level's spawn method and overlay priorities.
    Configured,
}

/// Value the next per-turn spawn should carry.
///
/// Perm-zero obstacles are replenished first while fewer than the configured
/// number remain on the board.
#[must_use]
pub fn next_spawn_value(tiles: &[Tile], settings: &Settings) -> u32 {
    if missing_zero_tiles(tiles, settings) > 0 {
        0
    } else {
        settings.new_tile_value()
    }
}

/// Number of perm-zero obstacles short of the level's configured count.
#[must_use]
pub fn missing_zero_tiles(tiles: &[Tile], settings: &Settings) -> u32 {
    let zero_count = tiles
        .iter()
        .filter(|tile| tile.value == Some(0) && settings.grid_size.contains(tile.position))
        .count();
    let zero_count = u32::try_from(zero_count).unwrap_or(u32::MAX);
    settings.perm_zero_count().saturating_sub(zero_count)
}

/// Picks the cell for the next spawn among `available` cells.
///
/// Returns `Ok(None)` when no cell is free.
///
/// # Errors
///
/// Propagates [`RandError`] from the generator.
pub fn choose_spawn_position(
    available: &[Position],
    settings: &Settings,
    overlays: &[OverlayTile],
    placement: Placement,
    rand: &mut Rand,
) -> Result<Option<Position>, RandError> {
    if available.is_empty() {
        return Ok(None);
    }

    if placement == Placement::Configured && settings.spawn_method() != SpawnTilesMethod::Random {
        let ranked = overlays
            .iter()
            .filter(|overlay| available.contains(&overlay.position))
            .filter_map(|overlay| overlay.spawn_priority().map(|rank| (rank, overlay.position)))
            .min();
        if let Some((_, position)) = ranked {
            return Ok(Some(position));
        }
    }

    rand.pick(available).map(|position| Some(*position))
}

/// Spawns the per-turn tile after a changed slide.
///
/// A full board is not an error: the spawn is skipped and `Ok(None)` returned.
/// `reserved` lists identifiers that must not be reused this turn.
///
/// # Errors
///
/// Propagates [`RandError`] from the generator.
pub fn spawn_tile(
    tiles: &mut Vec<Tile>,
    settings: &Settings,
    overlays: &[OverlayTile],
    reserved: &[TileId],
    rand: &mut Rand,
) -> Result<Option<Spawned>, RandError> {
    let available = Occupancy::from_tiles(settings.grid_size, tiles).available_positions();
    let Some(position) =
        choose_spawn_position(&available, settings, overlays, Placement::Configured, rand)?
    else {
        debug!("board full, skipping spawn");
        return Ok(None);
    };

    let value = Some(next_spawn_value(tiles, settings));
    Ok(Some(insert(tiles, position, value, reserved)))
}

/// Spawns a mandatory tile during level setup.
///
/// New tiles skip the identifiers in `reserved`.
///
/// # Errors
///
/// Returns [`EngineError::NoSpawnPosition`] when the grid has no free cell and
/// propagates generator misuse.
#[allow(clippy::too_many_arguments)]
pub fn spawn_forced(
    tiles: &mut Vec<Tile>,
    settings: &Settings,
    overlays: &[OverlayTile],
    value: Option<u32>,
    placement: Placement,
    reserved: &[TileId],
    level: u32,
    rand: &mut Rand,
) -> Result<Spawned, EngineError> {
    let available = Occupancy::from_tiles(settings.grid_size, tiles).available_positions();
    let position = choose_spawn_position(&available, settings, overlays, placement, rand)?
        .ok_or(EngineError::NoSpawnPosition { level })?;
    Ok(insert(tiles, position, value, reserved))
}

/// Scatters the level's walls and perm-zero obstacles at random free cells.
///
/// Perm-zero tiles already on the board (for example carried from a previous
/// level) count toward the configured total.
///
/// # Errors
///
/// Returns [`EngineError::NoSpawnPosition`] when the grid runs out of room.
pub fn spawn_obstacles(
    tiles: &mut Vec<Tile>,
    settings: &Settings,
    reserved: &[TileId],
    level: u32,
    rand: &mut Rand,
) -> Result<Vec<Spawned>, EngineError> {
    let mut spawned = Vec::new();
    for _ in 0..settings.fixed_tile_count() {
        spawned.push(spawn_forced(
            tiles,
            settings,
            &[],
            None,
            Placement::Random,
            reserved,
            level,
            rand,
        )?);
    }

    for _ in 0..missing_zero_tiles(tiles, settings) {
        spawned.push(spawn_forced(
            tiles,
            settings,
            &[],
            Some(0),
            Placement::Random,
            reserved,
            level,
            rand,
        )?);
    }
    Ok(spawned)
}

/// Places the starter tiles of a level following the configured spawn method.
///
/// # Errors
///
/// Returns [`EngineError::NoSpawnPosition`] when the grid runs out of room.
pub fn spawn_starters(
    tiles: &mut Vec<Tile>,
    settings: &Settings,
    overlays: &[OverlayTile],
    reserved: &[TileId],
    level: u32,
    rand: &mut Rand,
) -> Result<Vec<Spawned>, EngineError> {
    let value = Some(settings.new_tile_value());
    (0..STARTER_TILE_COUNT)
        .map(|_| {
            spawn_forced(
                tiles,
                settings,
                overlays,
                value,
                Placement::Configured,
                reserved,
                level,
                rand,
            )
        })
        .collect()
}

fn insert(
    tiles: &mut Vec<Tile>,
    position: Position,
    value: Option<u32>,
    reserved: &[TileId],
) -> Spawned {
    let tile = Tile::new(next_free_id(tiles, reserved), position, value);
    let spawned = Spawned {
        id: tile.id,
        position,
        value,
        colors: tile.colors(),
    };
    debug!("spawned tile {} at {position} with value {value:?}", tile.id.get());
    tiles.push(tile);
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_exit_core::GridSize;

    #[test]
    fn zero_tiles_are_replenished_first() {
        let mut settings = Settings::new(GridSize::new(3, 3));
        settings.perm_zero_tile_count = Some(1);
        settings.new_tile_value = Some(2);
        assert_eq!(next_spawn_value(&[], &settings), 0);

        let zero = Tile::new(TileId::new(0), Position::new(0, 0), Some(0));
        assert_eq!(next_spawn_value(&[zero], &settings), 2);
    }

    #[test]
    fn empty_availability_yields_no_position() {
        let settings = Settings::new(GridSize::new(1, 1));
        let mut rand = Rand::from_state(1);
        let chosen = choose_spawn_position(&[], &settings, &[], Placement::Configured, &mut rand);
        assert_eq!(chosen, Ok(None));
    }
}
