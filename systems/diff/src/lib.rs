#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! State diff system.
//!
//! Compares two snapshots tile by tile and reports the animatable changes
//! between them. Diffs come out grouped by kind (moves, merges, spawns,
//! removes, value changes) and ordered by tile id within each group, so the
//! same pair of snapshots always yields the same sequence.

use std::collections::BTreeMap;

use slide_exit_core::{Diff, GameState, Tile, TileId};

/// Computes the diffs that turn `prev` into `next`.
///
/// A tile whose merge marker is new in `next` reports a merge, even when the
/// value stayed the same as with two perm-zero tiles. Tiles absorbed by a merge
/// are reported as moving onto the surviving tile rather than as removed.
/// Comparing a snapshot with itself yields nothing.
#[must_use]
pub fn get_state_diffs(prev: &GameState, next: &GameState) -> Vec<Diff> {
    let before = index_by_id(&prev.tiles);
    let after = index_by_id(&next.tiles);
    let absorbed_into = absorbed_targets(&next.tiles);

    let mut moves = Vec::new();
    let mut merges = Vec::new();
    let mut spawns = Vec::new();
    let mut removes = Vec::new();
    let mut value_changes = Vec::new();

    for (&id, &old) in &before {
        if let Some(&new) = after.get(&id) {
            if old.position != new.position {
                moves.push(Diff::Move {
                    tile_id: id,
                    from: old.position,
                    to: new.position,
                });
            }
            match new.merged_from {
                Some(sources) if new.merged_from != old.merged_from => merges.push(Diff::Merge {
                    merged_to_tile_id: id,
                    merged_from_tile_ids: sources.to_vec(),
                    prev_value: old.value,
                    new_value: new.value,
                    colors: new.colors(),
                }),
                _ if old.value != new.value => value_changes.push(Diff::ValueChange {
                    tile_id: id,
                    prev_value: old.value,
                    new_value: new.value,
                }),
                _ => {}
            }
        } else if let Some(target) = absorbed_into.get(&id) {
            if old.position != target.position {
                moves.push(Diff::Move {
                    tile_id: id,
                    from: old.position,
                    to: target.position,
                });
            }
        } else {
            removes.push(Diff::Remove { tile_id: id });
        }
    }

    for (&id, &new) in &after {
        if !before.contains_key(&id) {
            spawns.push(Diff::Spawn {
                tile_id: id,
                position: new.position,
                value: new.value,
                colors: new.colors(),
            });
        }
    }

    let mut diffs = moves;
    diffs.append(&mut merges);
    diffs.append(&mut spawns);
    diffs.append(&mut removes);
    diffs.append(&mut value_changes);
    diffs
}

fn index_by_id(tiles: &[Tile]) -> BTreeMap<TileId, &Tile> {
    tiles.iter().map(|tile| (tile.id, tile)).collect()
}

/// Maps every absorbed tile id to the tile that absorbed it.
fn absorbed_targets(tiles: &[Tile]) -> BTreeMap<TileId, &Tile> {
    tiles
        .iter()
        .filter_map(|tile| tile.merged_from.map(|sources| (sources, tile)))
        .flat_map(|(sources, tile)| {
            sources
                .into_iter()
                .filter(move |source| *source != tile.id)
                .map(move |source| (source, tile))
        })
        .collect()
}
