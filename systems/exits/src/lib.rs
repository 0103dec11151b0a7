#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Exit-location system.
//!
//! Exits are edge cells through which a qualifying tile leaves the grid.
//! After a slide, a tile resting on an exit that faces the slide direction
//! steps one cell past the boundary. It stays in the tile list with that
//! out-of-bounds position until level progression reclaims it.

use log::{debug, warn};
use slide_exit_core::{
    Direction, ExitLocation, Goal, GridSize, Rand, RandError, Settings, Side, Tile, TileId,
};

/// Result of resolving exits after a slide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Whether any tile left the grid.
    pub changed: bool,
    /// Tiles that left the grid, in exit order.
    pub exited: Vec<TileId>,
}

/// Moves every qualifying tile through the exits on the slide edge.
///
/// Walls, perm-zero tiles and tiles produced by a merge this turn never exit.
pub fn resolve_exits(tiles: &mut [Tile], direction: Direction, settings: &Settings) -> ExitOutcome {
    let side = direction.side();
    let grid = settings.grid_size;
    let mut outcome = ExitOutcome::default();

    for exit in settings.exits().filter(|exit| exit.side == side) {
        let Some(cell) = exit.edge_cell(grid) else {
            continue;
        };
        let Some(tile) = tiles.iter_mut().find(|tile| tile.position == cell) else {
            continue;
        };
        if !qualifies(tile, exit) {
            continue;
        }

        tile.position = cell.step(direction);
        debug!("tile {} exited through {side:?} {}", tile.id.get(), exit.index);
        outcome.changed = true;
        outcome.exited.push(tile.id);
    }

    outcome
}

fn qualifies(tile: &Tile, exit: &ExitLocation) -> bool {
    match tile.value {
        None | Some(0) => false,
        Some(value) => tile.merged_from.is_none() && exit.requirements.is_met_by(value),
    }
}

/// Rolls every random exit template onto a free edge slot.
///
/// Earlier rolls are discarded first. Slots already carrying a fixed exit or
/// an exit rolled earlier in this pass are skipped. A template with no slot
/// left stays unresolved.
///
/// # Errors
///
/// Propagates [`RandError`] from the generator.
pub fn resolve_random_exits(
    goals: &mut [Goal],
    grid: GridSize,
    rand: &mut Rand,
) -> Result<(), RandError> {
    for goal in goals.iter_mut() {
        if let Goal::RandomExitLocation { resolved, .. } = goal {
            *resolved = None;
        }
    }

    for index in 0..goals.len() {
        let Goal::RandomExitLocation { requirements, .. } = goals[index] else {
            continue;
        };

        let taken: Vec<(Side, u32)> = goals
            .iter()
            .filter_map(Goal::exit)
            .map(|exit| (exit.side, exit.index))
            .collect();
        let slots: Vec<(Side, u32)> = Side::ALL
            .iter()
            .flat_map(|&side| (0..grid.edge_len(side)).map(move |index| (side, index)))
            .filter(|slot| !taken.contains(slot))
            .collect();

        if slots.is_empty() {
            warn!("no free edge slot left for a random exit on a {}x{} grid", grid.rows, grid.columns);
            continue;
        }

        let (side, slot_index) = *rand.pick(&slots)?;
        if let Goal::RandomExitLocation { resolved, .. } = &mut goals[index] {
            *resolved = Some(ExitLocation::new(side, slot_index, requirements));
        }
    }
    Ok(())
}
