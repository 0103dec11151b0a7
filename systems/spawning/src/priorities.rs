//! Spawn-priority overlay resolution.

use slide_exit_core::{
    GridSize, OverlayIcon, OverlayTile, Position, Rand, RandError, Settings, SpawnTilesMethod,
};

/// Recomputes the spawn-priority overlay for the next spawn.
///
/// * `random` strips every spawn-priority icon.
/// * `rtl-sequence` ranks cells row by row from the top, each row right to
///   left, rotated so the anchor ranks first. The anchor is the cell after
///   `last_spawn` in that order, else the current rank-one cell, else the
///   configured start, else the top-right cell.
/// * `fixed-random` keeps an existing complete ranking and otherwise shuffles
///   the raster order once.
///
/// # Errors
///
/// Propagates [`RandError`] from the generator.
pub fn resolve_spawn_priorities(
    settings: &Settings,
    overlays: &[OverlayTile],
    last_spawn: Option<Position>,
    rand: &mut Rand,
) -> Result<Vec<OverlayTile>, RandError> {
    let grid = settings.grid_size;
    match settings.spawn_method() {
        SpawnTilesMethod::Random => Ok(strip_priorities(overlays)),
        SpawnTilesMethod::RtlSequence { start } => {
            let order = rtl_order(grid);
            let anchor = last_spawn
                .and_then(|cell| rank_of(&order, cell))
                .map(|index| (index + 1) % order.len())
                .or_else(|| {
                    overlays
                        .iter()
                        .find(|overlay| overlay.spawn_priority() == Some(1))
                        .and_then(|overlay| rank_of(&order, overlay.position))
                })
                .or_else(|| start.and_then(|cell| rank_of(&order, cell)))
                .unwrap_or(0);
            let mut rotated = order;
            rotated.rotate_left(anchor);
            Ok(ranked_overlays(&rotated, grid))
        }
        SpawnTilesMethod::FixedRandom => {
            if is_complete_ranking(overlays, grid) {
                return Ok(overlays.to_vec());
            }
            let mut order: Vec<Position> = grid.positions().collect();
            rand.shuffle(&mut order);
            Ok(ranked_overlays(&order, grid))
        }
    }
}

fn rtl_order(grid: GridSize) -> Vec<Position> {
    let columns = grid.columns as i32;
    (0..grid.rows as i32)
        .flat_map(|row| (0..columns).rev().map(move |column| Position::new(row, column)))
        .collect()
}

fn rank_of(order: &[Position], cell: Position) -> Option<usize> {
    order.iter().position(|candidate| *candidate == cell)
}

fn ranked_overlays(order: &[Position], grid: GridSize) -> Vec<OverlayTile> {
    let mut overlays: Vec<OverlayTile> = order
        .iter()
        .enumerate()
        .map(|(rank, &position)| OverlayTile {
            position,
            id: raster_index(position, grid),
            icons: vec![OverlayIcon::SpawnPriority {
                priority: rank as u32 + 1,
            }],
        })
        .collect();
    overlays.sort_by_key(|overlay| overlay.id);
    overlays
}

fn raster_index(position: Position, grid: GridSize) -> u32 {
    position.row() as u32 * grid.columns + position.column() as u32
}

fn is_complete_ranking(overlays: &[OverlayTile], grid: GridSize) -> bool {
    let ranked = overlays
        .iter()
        .filter(|overlay| overlay.spawn_priority().is_some())
        .filter(|overlay| grid.contains(overlay.position))
        .count();
    ranked > 0 && ranked as u32 == grid.cell_count() && ranked == overlays.len()
}

fn strip_priorities(overlays: &[OverlayTile]) -> Vec<OverlayTile> {
    overlays
        .iter()
        .cloned()
        .filter_map(|mut overlay| {
            overlay
                .icons
                .retain(|icon| !matches!(icon, OverlayIcon::SpawnPriority { .. }));
            (!overlay.icons.is_empty()).then_some(overlay)
        })
        .collect()
}
