//! Grid and position utilities shared by the systems.

use crate::{EngineError, GridSize, Position, Tile, TileId};

/// Dense occupancy map from grid cells to indices into a tile slice.
///
/// Tiles outside the grid (for example ones that just exited) are ignored.
#[derive(Clone, Debug)]
pub struct Occupancy {
    grid: GridSize,
    cells: Vec<Option<usize>>,
}

impl Occupancy {
    /// Builds the map for `tiles` laid out on `grid`.
    #[must_use]
    pub fn from_tiles(grid: GridSize, tiles: &[Tile]) -> Self {
        let capacity = usize::try_from(grid.cell_count()).unwrap_or(0);
        let mut occupancy = Self {
            grid,
            cells: vec![None; capacity],
        };
        for (index, tile) in tiles.iter().enumerate() {
            occupancy.occupy(tile.position, index);
        }
        occupancy
    }

    /// Index of the tile occupying the cell, if any.
    #[must_use]
    pub fn occupant(&self, position: Position) -> Option<usize> {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Reports whether the cell is inside the grid and unoccupied.
    #[must_use]
    pub fn is_free(&self, position: Position) -> bool {
        self.index(position)
            .is_some_and(|index| self.cells.get(index).copied().flatten().is_none())
    }

    /// Marks the cell as holding the tile at `tile_index`.
    pub fn occupy(&mut self, position: Position, tile_index: usize) {
        if let Some(index) = self.index(position) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = Some(tile_index);
            }
        }
    }

    /// Every free in-bounds cell in row-major order.
    #[must_use]
    pub fn available_positions(&self) -> Vec<Position> {
        self.grid
            .positions()
            .filter(|position| self.is_free(*position))
            .collect()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.grid.contains(position) {
            return None;
        }
        let row = usize::try_from(position.row()).ok()?;
        let column = usize::try_from(position.column()).ok()?;
        let width = usize::try_from(self.grid.columns).ok()?;
        Some(row * width + column)
    }
}

/// Every free in-bounds cell of `grid` in row-major order.
#[must_use]
pub fn available_positions(grid: GridSize, tiles: &[Tile]) -> Vec<Position> {
    Occupancy::from_tiles(grid, tiles).available_positions()
}

/// Lowest identifier not used by any tile in `tiles` nor listed in `reserved`.
///
/// `reserved` carries identifiers of tiles absorbed earlier in the same
/// action so a fresh tile never reuses an id the previous snapshot still shows.
#[must_use]
pub fn next_free_id(tiles: &[Tile], reserved: &[TileId]) -> TileId {
    let mut used: Vec<u32> = tiles
        .iter()
        .map(|tile| tile.id)
        .chain(reserved.iter().copied())
        .map(|id| id.get())
        .collect();
    used.sort_unstable();
    used.dedup();
    let mut candidate = 0;
    for id in used {
        if id != candidate {
            break;
        }
        candidate += 1;
    }
    TileId::new(candidate)
}

/// Places a new tile at an explicit position.
///
/// # Errors
///
/// Returns [`EngineError::PositionOccupied`] when another tile already sits
/// on the cell.
pub fn place_tile(
    tiles: &mut Vec<Tile>,
    position: Position,
    value: Option<u32>,
) -> Result<TileId, EngineError> {
    if tiles.iter().any(|tile| tile.position == position) {
        return Err(EngineError::PositionOccupied { position });
    }
    let id = next_free_id(tiles, &[]);
    tiles.push(Tile::new(id, position, value));
    Ok(id)
}

/// Tile value that completes a level on a grid of this size.
#[must_use]
pub fn goal_value(grid: GridSize) -> u32 {
    match grid.cell_count() {
        0..=4 => 16,
        5..=6 => 64,
        7..=9 => 256,
        10..=12 => 512,
        13..=16 => 2_048,
        17..=25 => 4_096,
        _ => 8_192,
    }
}

/// Reports whether any two orthogonally adjacent in-bounds cells hold tiles
/// that could merge.
#[must_use]
pub fn has_adjacent_merge(grid: GridSize, tiles: &[Tile]) -> bool {
    let occupancy = Occupancy::from_tiles(grid, tiles);
    let value_at = |position: Position| {
        occupancy
            .occupant(position)
            .and_then(|index| tiles[index].value)
    };

    grid.positions().any(|position| {
        let Some(value) = value_at(position) else {
            return false;
        };
        let right = Position::new(position.row(), position.column() + 1);
        let down = Position::new(position.row() + 1, position.column());
        value_at(right) == Some(value) || value_at(down) == Some(value)
    })
}
