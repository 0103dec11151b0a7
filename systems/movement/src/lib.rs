#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure slide-and-merge system.
//!
//! The grid is decomposed into independent lines (columns for vertical
//! slides, rows for horizontal ones). Each line is compacted toward the
//! slide edge while equal neighbours merge at most once per turn. Walls
//! split a line into segments that never interact.

use std::collections::BTreeMap;

use log::debug;
use slide_exit_core::{Direction, GridSize, Position, Tile};

/// Result of compacting every line of the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideOutcome {
    /// Whether any tile moved or merged.
    pub changed: bool,
    /// Points earned from merges this slide.
    pub score: u64,
    /// Tiles absorbed into a merge target, with their final pre-merge state.
    pub absorbed: Vec<Tile>,
}

impl SlideOutcome {
    /// Number of merges performed.
    #[must_use]
    pub fn merges(&self) -> usize {
        self.absorbed.len()
    }
}

/// Slides `tiles` toward `direction`, mutating the working copy in place.
///
/// Merge markers from the previous turn are cleared first. Absorbed tiles are
/// removed from `tiles` and reported in the outcome.
pub fn slide(tiles: &mut Vec<Tile>, direction: Direction, grid: GridSize) -> SlideOutcome {
    for tile in tiles.iter_mut() {
        tile.merged_from = None;
    }

    let mut outcome = SlideOutcome::default();
    let mut absorbed_indices = Vec::new();

    for line in group_lines(tiles, direction, grid).into_values() {
        slide_line(tiles, &line, direction, grid, &mut outcome, &mut absorbed_indices);
    }

    absorbed_indices.sort_unstable();
    for index in absorbed_indices.into_iter().rev() {
        outcome.absorbed.push(tiles.remove(index));
    }
    outcome.absorbed.sort_by_key(|tile| tile.id);

    debug!(
        "slide {direction:?}: changed={} merges={} score+={}",
        outcome.changed,
        outcome.merges(),
        outcome.score
    );
    outcome
}

/// Groups in-bounds tile indices by line, each ordered from the slide edge.
fn group_lines(
    tiles: &[Tile],
    direction: Direction,
    grid: GridSize,
) -> BTreeMap<i32, Vec<usize>> {
    let mut lines: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, tile) in tiles.iter().enumerate() {
        if !grid.contains(tile.position) {
            continue;
        }
        let key = match direction {
            Direction::Up | Direction::Down => tile.position.column(),
            Direction::Left | Direction::Right => tile.position.row(),
        };
        lines.entry(key).or_default().push(index);
    }

    for line in lines.values_mut() {
        line.sort_by_key(|&index| {
            let position = tiles[index].position;
            match direction {
                Direction::Up => position.row(),
                Direction::Down => -position.row(),
                Direction::Left => position.column(),
                Direction::Right => -position.column(),
            }
        });
    }
    lines
}

fn slide_line(
    tiles: &mut [Tile],
    line: &[usize],
    direction: Direction,
    grid: GridSize,
    outcome: &mut SlideOutcome,
    absorbed: &mut Vec<usize>,
) {
    let step = match direction {
        Direction::Up | Direction::Left => 1,
        Direction::Down | Direction::Right => -1,
    };
    let mut next_slot = match direction {
        Direction::Up | Direction::Left => 0,
        Direction::Down => grid.rows as i32 - 1,
        Direction::Right => grid.columns as i32 - 1,
    };
    let mut anchor: Option<usize> = None;

    for &index in line {
        let current = &tiles[index];
        let along = axis_coordinate(current.position, direction);

        let Some(value) = current.value else {
            anchor = None;
            next_slot = along + step;
            continue;
        };

        if let Some(last) = anchor {
            let target = &tiles[last];
            if target.value == Some(value) && target.merged_from.is_none() {
                let merged_value = value.saturating_mul(2);
                let absorbed_id = tiles[index].id;
                let target_position = tiles[last].position;
                tiles[index].position = target_position;

                let target = &mut tiles[last];
                target.merged_from = Some([target.id, absorbed_id]);
                target.set_value(Some(merged_value));

                outcome.score += u64::from(merged_value);
                outcome.changed = true;
                absorbed.push(index);
                continue;
            }
        }

        let destination = with_axis_coordinate(current.position, direction, next_slot);
        if destination != current.position {
            outcome.changed = true;
            tiles[index].position = destination;
        }
        anchor = Some(index);
        next_slot += step;
    }
}

fn axis_coordinate(position: Position, direction: Direction) -> i32 {
    match direction {
        Direction::Up | Direction::Down => position.row(),
        Direction::Left | Direction::Right => position.column(),
    }
}

fn with_axis_coordinate(position: Position, direction: Direction, coordinate: i32) -> Position {
    match direction {
        Direction::Up | Direction::Down => Position::new(coordinate, position.column()),
        Direction::Left | Direction::Right => Position::new(position.row(), coordinate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_exit_core::TileId;

    #[test]
    fn empty_board_is_a_no_op() {
        let mut tiles = Vec::new();
        let outcome = slide(&mut tiles, Direction::Left, GridSize::new(4, 4));
        assert_eq!(outcome, SlideOutcome::default());
    }

    #[test]
    fn clears_stale_merge_markers() {
        let mut tile = Tile::new(TileId::new(0), Position::new(0, 0), Some(4));
        tile.merged_from = Some([TileId::new(0), TileId::new(3)]);
        let mut tiles = vec![tile];
        let outcome = slide(&mut tiles, Direction::Up, GridSize::new(4, 4));
        assert!(!outcome.changed);
        assert_eq!(tiles[0].merged_from, None);
    }
}
