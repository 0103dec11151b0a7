use slide_exit_core::{
    EditLocation, EngineError, ExitLocation, GameState, Goal, GridSize, LevelEntry, Position,
    Requirement, Seed, Settings, SettingsPatch, Side, SpawnTilesMethod, Status, Tile, TileColors,
    TileId,
};
use slide_exit_system_editing::{apply_edit, apply_settings_patch, Gesture};

fn state_with(tiles: Vec<Tile>) -> GameState {
    GameState {
        tiles,
        score: 30,
        status: Status::UserTurn,
        level: 1,
        seed: Seed::Number(9),
        turn: 4,
        level_settings: vec![Settings::new(GridSize::new(3, 3))],
        overlay_tiles: Vec::new(),
        entry: LevelEntry::default(),
    }
}

fn cell(row: i32, column: i32) -> EditLocation {
    EditLocation::Tile {
        position: Position::new(row, column),
    }
}

fn slot(side: Side, index: u32) -> EditLocation {
    EditLocation::ExitLocation { side, index }
}

fn exits(state: &GameState) -> Vec<ExitLocation> {
    state.level_settings[0].exits().copied().collect()
}

#[test]
fn tap_on_empty_cell_places_a_wall() {
    let mut state = state_with(vec![Tile::new(TileId::new(0), Position::new(0, 0), Some(2))]);

    let changed = apply_edit(&mut state, Gesture::Tap, cell(1, 2)).expect("level configured");

    assert!(changed);
    let wall = state.tile_at(Position::new(1, 2)).expect("wall placed");
    assert_eq!(wall.id, TileId::new(1));
    assert!(wall.is_wall());
    assert_eq!(wall.colors(), TileColors::for_value(None));
}

#[test]
fn repeated_taps_cycle_the_value() {
    let mut state = state_with(Vec::new());
    let mut values = Vec::new();
    for _ in 0..5 {
        let _ = apply_edit(&mut state, Gesture::Tap, cell(2, 2)).expect("level configured");
        values.push(state.tile_at(Position::new(2, 2)).map(|tile| tile.value));
    }

    assert_eq!(
        values,
        vec![Some(None), Some(Some(0)), Some(Some(1)), Some(Some(2)), Some(Some(4))]
    );
    let tile = state.tile_at(Position::new(2, 2)).expect("tile present");
    assert_eq!(tile.colors(), TileColors::for_value(Some(4)));
}

#[test]
fn hold_deletes_tile_and_ignores_empty_cells() {
    let mut state = state_with(vec![Tile::new(TileId::new(0), Position::new(1, 1), Some(8))]);

    assert!(!apply_edit(&mut state, Gesture::Hold, cell(0, 0)).expect("configured"));
    assert!(apply_edit(&mut state, Gesture::Hold, cell(1, 1)).expect("configured"));
    assert!(state.tiles.is_empty());
}

#[test]
fn edits_leave_progress_untouched() {
    let mut state = state_with(Vec::new());
    let _ = apply_edit(&mut state, Gesture::Tap, cell(0, 0)).expect("configured");
    let _ = apply_edit(&mut state, Gesture::Tap, slot(Side::Left, 1)).expect("configured");

    assert_eq!(state.score, 30);
    assert_eq!(state.turn, 4);
    assert_eq!(state.status, Status::UserTurn);
}

#[test]
fn exit_taps_create_then_double_requirement() {
    let mut state = state_with(Vec::new());
    let mut thresholds = Vec::new();
    for _ in 0..4 {
        let _ = apply_edit(&mut state, Gesture::Tap, slot(Side::Top, 2)).expect("configured");
        thresholds.push(exits(&state)[0].requirements.value());
    }

    assert_eq!(thresholds, vec![0, 1, 2, 4]);
    assert_eq!(exits(&state).len(), 1);
    assert_eq!(
        exits(&state)[0],
        ExitLocation::new(Side::Top, 2, Requirement::GreaterThanEqualTo { value: 4 })
    );
}

#[test]
fn exit_tap_keeps_equality_requirements() {
    let mut state = state_with(Vec::new());
    state.level_settings[0]
        .goals
        .push(Goal::ExitLocation(ExitLocation::new(
            Side::Right,
            0,
            Requirement::EqualTo { value: 16 },
        )));

    let _ = apply_edit(&mut state, Gesture::Tap, slot(Side::Right, 0)).expect("configured");

    assert_eq!(exits(&state)[0].requirements, Requirement::EqualTo { value: 32 });
}

#[test]
fn exit_hold_removes_only_that_slot() {
    let mut state = state_with(Vec::new());
    let _ = apply_edit(&mut state, Gesture::Tap, slot(Side::Bottom, 0)).expect("configured");
    let _ = apply_edit(&mut state, Gesture::Tap, slot(Side::Bottom, 1)).expect("configured");

    assert!(apply_edit(&mut state, Gesture::Hold, slot(Side::Bottom, 0)).expect("configured"));
    assert!(!apply_edit(&mut state, Gesture::Hold, slot(Side::Bottom, 0)).expect("configured"));

    let remaining = exits(&state);
    assert_eq!(remaining.len(), 1);
    assert!(remaining[0].is_at(Side::Bottom, 1));
}

#[test]
fn out_of_range_targets_are_ignored() {
    let mut state = state_with(Vec::new());
    let before = state.clone();

    assert!(!apply_edit(&mut state, Gesture::Tap, cell(3, 0)).expect("configured"));
    assert!(!apply_edit(&mut state, Gesture::Tap, slot(Side::Left, 3)).expect("configured"));
    assert_eq!(state, before);
}

#[test]
fn settings_patch_overwrites_present_fields() {
    let mut state = state_with(Vec::new());
    let patch = SettingsPatch {
        new_tile_value: Some(2),
        spawn_tiles_method: Some(SpawnTilesMethod::FixedRandom),
        ..SettingsPatch::default()
    };

    apply_settings_patch(&mut state, 1, &patch).expect("level configured");

    let settings = &state.level_settings[0];
    assert_eq!(settings.new_tile_value(), 2);
    assert_eq!(settings.spawn_method(), SpawnTilesMethod::FixedRandom);
    assert_eq!(settings.grid_size, GridSize::new(3, 3));
}

#[test]
fn settings_patch_for_unknown_level_fails() {
    let mut state = state_with(Vec::new());
    assert_eq!(
        apply_settings_patch(&mut state, 2, &SettingsPatch::default()),
        Err(EngineError::MissingLevelSettings { level: 2 })
    );
}
