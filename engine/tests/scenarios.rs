use slide_exit_core::{
    Action, Direction, EditLocation, EngineError, ExitLocation, GameState, Goal, GridSize,
    LevelEntry, Position, Requirement, Seed, Settings, SettingsPatch, Side, Status, Tile, TileId,
};
use slide_exit_engine::{apply_action, get_state_diffs, query};

fn tile(id: u32, row: i32, column: i32, value: Option<u32>) -> Tile {
    Tile::new(TileId::new(id), Position::new(row, column), value)
}

fn state_with(levels: Vec<Settings>, tiles: Vec<Tile>) -> GameState {
    GameState {
        tiles,
        score: 0,
        status: Status::UserTurn,
        level: 1,
        seed: Seed::Text("scenario".to_owned()),
        turn: 0,
        level_settings: levels,
        overlay_tiles: Vec::new(),
        entry: LevelEntry::default(),
    }
}

fn four_by_four() -> Settings {
    Settings::new(GridSize::new(4, 4))
}

fn slide(state: GameState, direction: Direction) -> GameState {
    apply_action(Action::slide(direction, state)).expect("well-formed state")
}

#[test]
fn single_tile_slides_up_and_a_tile_spawns() {
    let state = state_with(vec![four_by_four()], vec![tile(0, 1, 0, Some(2))]);

    let next = slide(state, Direction::Up);

    let moved = next.tile(TileId::new(0)).expect("tile kept");
    assert_eq!(moved.position, Position::new(0, 0));
    assert_eq!(moved.value, Some(2));
    assert_eq!(next.tiles.len(), 2);
    let spawned = next.tile(TileId::new(1)).expect("spawned tile");
    assert_eq!(spawned.value, Some(1));
    assert_ne!(spawned.position, Position::new(0, 0));
    assert_eq!(next.turn, 1);
    assert_eq!(next.status, Status::UserTurn);
}

#[test]
fn pair_merges_and_scores() {
    let state = state_with(
        vec![four_by_four()],
        vec![tile(0, 0, 0, Some(2)), tile(1, 1, 0, Some(2))],
    );

    let next = slide(state, Direction::Up);

    let merged = next.tile(TileId::new(0)).expect("merge target kept");
    assert_eq!(merged.position, Position::new(0, 0));
    assert_eq!(merged.value, Some(4));
    assert_eq!(merged.merged_from, Some([TileId::new(0), TileId::new(1)]));
    assert_eq!(next.score, 4);
    assert_eq!(next.tiles.len(), 2);
    assert!(next.tile(TileId::new(1)).is_none(), "absorbed id is not reused");
}

#[test]
fn three_equal_tiles_merge_once() {
    let state = state_with(
        vec![four_by_four()],
        vec![
            tile(0, 0, 0, Some(2)),
            tile(1, 1, 0, Some(2)),
            tile(2, 2, 0, Some(2)),
        ],
    );

    let next = slide(state, Direction::Up);

    assert_eq!(next.tile_at(Position::new(0, 0)).map(|t| t.value), Some(Some(4)));
    assert_eq!(next.tile_at(Position::new(1, 0)).map(|t| t.value), Some(Some(2)));
    assert_eq!(next.tiles.len(), 3);
}

#[test]
fn locked_board_is_lost() {
    let tiles: Vec<Tile> = GridSize::new(4, 4)
        .positions()
        .enumerate()
        .map(|(index, position)| {
            let value = if (position.row() + position.column()) % 2 == 0 { 2 } else { 4 };
            Tile::new(TileId::new(index as u32), position, Some(value))
        })
        .collect();
    let state = state_with(vec![four_by_four()], tiles.clone());

    for direction in Direction::ALL {
        let next = slide(state.clone(), direction);
        assert_eq!(next.status, Status::Lost);
        assert_eq!(next.tiles, tiles);
        assert_eq!(next.turn, 0);
    }
}

#[test]
fn goal_value_on_last_level_wins() {
    let state = state_with(
        vec![four_by_four()],
        vec![tile(0, 0, 0, Some(1_024)), tile(1, 1, 0, Some(1_024))],
    );

    let next = slide(state, Direction::Up);

    assert_eq!(next.status, Status::Won);
    assert_eq!(next.level, 1);
}

#[test]
fn goal_value_advances_and_carries_the_tile() {
    let state = state_with(
        vec![four_by_four(), four_by_four()],
        vec![
            tile(0, 0, 1, Some(1_024)),
            tile(1, 1, 1, Some(1_024)),
            tile(2, 3, 3, Some(2)),
        ],
    );

    let next = slide(state, Direction::Up);

    assert_eq!(next.level, 2);
    assert_eq!(next.turn, 0);
    assert_eq!(next.status, Status::UserTurn);
    assert_eq!(next.score, 2_048);
    let carried = next.tile(TileId::new(0)).expect("goal tile carried");
    assert_eq!(carried.position, Position::new(3, 1));
    assert_eq!(carried.value, Some(2_048));
    assert_eq!(carried.merged_from, None);
    assert_eq!(next.tiles.len(), 3, "carried tile plus two starters");
    assert_eq!(next.entry.tiles.len(), 1);
}

#[test]
fn carried_goal_tile_does_not_complete_the_next_level() {
    let state = state_with(
        vec![four_by_four(), four_by_four(), four_by_four()],
        vec![tile(0, 0, 1, Some(1_024)), tile(1, 1, 1, Some(1_024))],
    );
    let advanced = slide(state, Direction::Up);
    assert_eq!(advanced.level, 2);

    let next = slide(advanced, Direction::Down);

    assert_eq!(next.level, 2);
    assert_eq!(next.status, Status::UserTurn);
    assert_eq!(
        next.tile(TileId::new(0)).and_then(|tile| tile.value),
        Some(2_048)
    );
}

#[test]
fn next_level_starters_never_reuse_earlier_ids() {
    let prev = state_with(
        vec![four_by_four(), four_by_four()],
        vec![
            tile(0, 0, 1, Some(1_024)),
            tile(1, 1, 1, Some(1_024)),
            tile(2, 3, 3, Some(2)),
        ],
    );

    let next = slide(prev.clone(), Direction::Up);
    assert_eq!(next.level, 2);

    let earlier: Vec<TileId> = prev.tiles.iter().map(|tile| tile.id).collect();
    let spawned: Vec<TileId> = get_state_diffs(&prev, &next)
        .into_iter()
        .filter_map(|diff| match diff {
            slide_exit_core::Diff::Spawn { tile_id, .. } => Some(tile_id),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 2, "both starters reported as spawns");
    assert!(spawned.iter().all(|id| !earlier.contains(id)));
}

#[test]
fn exit_moves_tile_into_the_next_level() {
    let mut first = Settings::new(GridSize::new(3, 3));
    first.goals.push(Goal::ExitLocation(ExitLocation::new(
        Side::Top,
        1,
        Requirement::GreaterThanEqualTo { value: 4 },
    )));
    let second = Settings::new(GridSize::new(3, 3));
    let state = state_with(vec![first, second], vec![tile(5, 2, 1, Some(4))]);

    let next = slide(state, Direction::Up);

    assert_eq!(next.level, 2);
    let carried = next.tile(TileId::new(5)).expect("exited tile carried");
    assert_eq!(carried.position, Position::new(2, 1));
    assert_eq!(next.tiles.len(), 3);
}

#[test]
fn exit_requirement_must_be_met() {
    let mut first = Settings::new(GridSize::new(3, 3));
    first.goals.push(Goal::ExitLocation(ExitLocation::new(
        Side::Top,
        1,
        Requirement::EqualTo { value: 8 },
    )));
    let state = state_with(vec![first, four_by_four()], vec![tile(5, 2, 1, Some(4))]);

    let next = slide(state, Direction::Up);

    assert_eq!(next.level, 1);
    assert_eq!(
        next.tile(TileId::new(5)).map(|t| t.position),
        Some(Position::new(0, 1))
    );
}

#[test]
fn deferred_spawn_waits_for_tick() {
    let mut settings = four_by_four();
    settings.defer_spawn = Some(true);
    let state = state_with(vec![settings], vec![tile(0, 3, 0, Some(2))]);

    let slid = slide(state, Direction::Up);
    assert_eq!(slid.status, Status::AiTurn);
    assert_eq!(slid.tiles.len(), 1);
    assert_eq!(slid.turn, 1);

    let ignored = slide(slid.clone(), Direction::Down);
    assert_eq!(ignored, slid);

    let ticked = apply_action(Action::Tick { state: slid }).expect("well-formed state");
    assert_eq!(ticked.status, Status::UserTurn);
    assert_eq!(ticked.tiles.len(), 2);

    let tapped = apply_action(Action::Tap { state: ticked.clone() }).expect("well-formed state");
    assert_eq!(tapped, ticked, "tap outside the automatic step is ignored");
}

#[test]
fn init_builds_the_first_level() {
    let state = apply_action(Action::Init {
        seed: Seed::Number(2024),
        levels: None,
    })
    .expect("default campaign is valid");

    assert_eq!(state.level, 1);
    assert_eq!(state.turn, 0);
    assert_eq!(state.score, 0);
    assert_eq!(state.status, Status::UserTurn);
    assert_eq!(state.tiles.len(), 2);
    assert!(state.tiles.iter().all(|tile| tile.value == Some(1)));
}

#[test]
fn init_without_levels_fails_fast() {
    let result = apply_action(Action::Init {
        seed: Seed::Number(1),
        levels: Some(Vec::new()),
    });
    assert_eq!(result, Err(EngineError::MissingLevelSettings { level: 1 }));
}

#[test]
fn reset_level_rebuilds_the_entry_board() {
    let start = apply_action(Action::Init {
        seed: Seed::Text("reset".to_owned()),
        levels: None,
    })
    .expect("valid campaign");

    let mut played = start.clone();
    for direction in [Direction::Left, Direction::Down, Direction::Right] {
        played = slide(played, direction);
    }

    let reset = apply_action(Action::ResetLevel { state: played }).expect("valid state");
    assert_eq!(reset, start);
}

#[test]
fn reset_game_returns_to_level_one() {
    let state = state_with(
        vec![four_by_four(), four_by_four()],
        vec![tile(0, 0, 1, Some(1_024)), tile(1, 1, 1, Some(1_024))],
    );
    let advanced = slide(state, Direction::Up);
    assert_eq!(advanced.level, 2);

    let reset = apply_action(Action::ResetGame { state: advanced }).expect("valid state");
    assert_eq!(reset.level, 1);
    assert_eq!(reset.score, 0);
    assert_eq!(reset.tiles.len(), 2);
}

#[test]
fn regenerate_level_switches_seed_and_restarts_turns() {
    let start = apply_action(Action::Init {
        seed: Seed::Number(5),
        levels: None,
    })
    .expect("valid campaign");
    let played = slide(start, Direction::Up);

    let regenerated = apply_action(Action::RegenerateLevel {
        state: played,
        seed: Seed::Text("fresh".to_owned()),
    })
    .expect("valid state");

    assert_eq!(regenerated.seed, Seed::Text("fresh".to_owned()));
    assert_eq!(regenerated.turn, 0);
    assert_eq!(regenerated.tiles.len(), 2);
}

#[test]
fn edits_apply_on_the_player_turn_only() {
    let state = state_with(vec![four_by_four()], Vec::new());
    let location = EditLocation::Tile {
        position: Position::new(2, 2),
    };

    let edited = apply_action(Action::EditTap {
        state: state.clone(),
        location,
    })
    .expect("valid state");
    assert!(edited.tile_at(Position::new(2, 2)).is_some_and(Tile::is_wall));

    let mut lost = state;
    lost.status = Status::Lost;
    let ignored = apply_action(Action::EditTap {
        state: lost.clone(),
        location,
    })
    .expect("valid state");
    assert_eq!(ignored, lost);

    let removed = apply_action(Action::EditHold {
        state: edited,
        location,
    })
    .expect("valid state");
    assert!(removed.tiles.is_empty());
}

#[test]
fn editing_current_level_settings_rebuilds_it() {
    let start = apply_action(Action::Init {
        seed: Seed::Number(77),
        levels: None,
    })
    .expect("valid campaign");

    let next = apply_action(Action::EditLevelSettings {
        state: start,
        level: 1,
        settings: SettingsPatch {
            grid_size: Some(GridSize::new(2, 5)),
            random_fixed_tiles: Some(1),
            ..SettingsPatch::default()
        },
    })
    .expect("valid state");

    assert_eq!(next.level_settings[0].grid_size, GridSize::new(2, 5));
    assert_eq!(next.tiles.len(), 3);
    assert!(next
        .tiles
        .iter()
        .all(|tile| GridSize::new(2, 5).contains(tile.position)));
    assert_eq!(query::available_positions(&next).map(|cells| cells.len()), Ok(7));
}

#[test]
fn editing_other_level_settings_leaves_board_alone() {
    let state = state_with(
        vec![four_by_four(), four_by_four()],
        vec![tile(0, 1, 1, Some(2))],
    );

    let next = apply_action(Action::EditLevelSettings {
        state: state.clone(),
        level: 2,
        settings: SettingsPatch {
            new_tile_value: Some(4),
            ..SettingsPatch::default()
        },
    })
    .expect("valid state");

    assert_eq!(next.tiles, state.tiles);
    assert_eq!(next.level_settings[1].new_tile_value(), 4);
}

#[test]
fn slide_diffs_describe_move_and_spawn() {
    let prev = state_with(vec![four_by_four()], vec![tile(0, 3, 2, Some(2))]);
    let next = slide(prev.clone(), Direction::Up);

    let diffs = get_state_diffs(&prev, &next);

    assert_eq!(diffs.len(), 2);
    assert!(matches!(
        diffs[0],
        slide_exit_core::Diff::Move { tile_id, to, .. }
            if tile_id == TileId::new(0) && to == Position::new(0, 2)
    ));
    assert!(matches!(diffs[1], slide_exit_core::Diff::Spawn { .. }));
}
