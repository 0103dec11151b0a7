#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Slide Exit engine.
//!
//! This crate defines the value types that flow between the presentation
//! layer, the `apply_action` entry point and the pure systems. Presentation
//! code submits [`Action`] values carrying the current [`GameState`], the
//! engine answers with a brand new state, and the diff system reconciles two
//! consecutive snapshots into [`Diff`] values that drive animation.
//!
//! Every type here is a plain serialisable value. Nothing in this crate keeps
//! mutable state between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod grid;
mod random;
mod seed;

pub use random::{Rand, RandError};
pub use seed::{
    derive_rand, RNG_STREAM_AI_SPAWN, RNG_STREAM_LEVEL_SETUP, RNG_STREAM_TURN,
};

/// Unique identifier assigned to a tile within a single game state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a grid cell expressed as row and column.
///
/// Coordinates are signed so a tile that exited the board can sit one step
/// past any edge. Serialises as a `[row, column]` pair.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    row: i32,
    column: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Returns the neighbouring position one step in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self::new(self.row - 1, self.column),
            Direction::Down => Self::new(self.row + 1, self.column),
            Direction::Left => Self::new(self.row, self.column - 1),
            Direction::Right => Self::new(self.row, self.column + 1),
        }
    }
}

impl From<[i32; 2]> for Position {
    fn from(value: [i32; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<Position> for [i32; 2] {
    fn from(value: Position) -> Self {
        [value.row, value.column]
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.row, self.column)
    }
}

/// Dimensions of the playing grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows in the grid.
    pub rows: u32,
    /// Number of columns in the grid.
    pub columns: u32,
}

impl GridSize {
    /// Creates a grid description with explicit dimensions.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub const fn cell_count(&self) -> u32 {
        self.rows * self.columns
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position.row() >= 0
            && position.column() >= 0
            && (position.row() as u32) < self.rows
            && (position.column() as u32) < self.columns
    }

    /// Number of cells along the provided edge.
    #[must_use]
    pub const fn edge_len(&self, side: Side) -> u32 {
        match side {
            Side::Top | Side::Bottom => self.columns,
            Side::Left | Side::Right => self.rows,
        }
    }

    /// Every in-bounds position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let columns = self.columns as i32;
        let rows = self.rows as i32;
        (0..rows).flat_map(move |row| (0..columns).map(move |column| Position::new(row, column)))
    }

    /// Moves an arbitrary position onto the nearest in-bounds cell.
    #[must_use]
    pub fn clamp(&self, position: Position) -> Position {
        let max_row = self.rows.saturating_sub(1) as i32;
        let max_column = self.columns.saturating_sub(1) as i32;
        Position::new(
            position.row().clamp(0, max_row),
            position.column().clamp(0, max_column),
        )
    }
}

/// Cardinal slide directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Toward row zero.
    Up,
    /// Toward the last row.
    Down,
    /// Toward column zero.
    Left,
    /// Toward the last column.
    Right,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Edge of the grid that tiles compact against when sliding this way.
    #[must_use]
    pub const fn side(self) -> Side {
        match self {
            Self::Up => Side::Top,
            Self::Down => Side::Bottom,
            Self::Left => Side::Left,
            Self::Right => Side::Right,
        }
    }
}

/// Edge of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// Row zero.
    Top,
    /// Last row.
    Bottom,
    /// Column zero.
    Left,
    /// Last column.
    Right,
}

impl Side {
    /// All four sides in a fixed order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// The edge facing this one across the grid.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Direction a tile travels to leave the grid through this edge.
    #[must_use]
    pub const fn outward(self) -> Direction {
        match self {
            Self::Top => Direction::Up,
            Self::Bottom => Direction::Down,
            Self::Left => Direction::Left,
            Self::Right => Direction::Right,
        }
    }

    /// Cell on this edge at `index`, or `None` when the index is past the edge.
    #[must_use]
    pub fn edge_cell(self, grid: GridSize, index: u32) -> Option<Position> {
        if index >= grid.edge_len(self) {
            return None;
        }
        let index = index as i32;
        let last_row = grid.rows as i32 - 1;
        let last_column = grid.columns as i32 - 1;
        Some(match self {
            Self::Top => Position::new(0, index),
            Self::Bottom => Position::new(last_row, index),
            Self::Left => Position::new(index, 0),
            Self::Right => Position::new(index, last_column),
        })
    }
}

/// Visual colour component attached to tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl TileColor {
    /// Creates a new colour from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the colour.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the colour.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the colour.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl fmt::Display for TileColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

const WALL_BACKGROUND: TileColor = TileColor::from_rgb(0x5a, 0x55, 0x50);
const WALL_TEXT: TileColor = TileColor::from_rgb(0xf9, 0xf6, 0xf2);
const ZERO_BACKGROUND: TileColor = TileColor::from_rgb(0xcd, 0xc1, 0xb4);
const DARK_TEXT: TileColor = TileColor::from_rgb(0x77, 0x6e, 0x65);
const LIGHT_TEXT: TileColor = TileColor::from_rgb(0xf9, 0xf6, 0xf2);
const VALUE_BACKGROUNDS: [TileColor; 12] = [
    TileColor::from_rgb(0xee, 0xe4, 0xda),
    TileColor::from_rgb(0xed, 0xe0, 0xc8),
    TileColor::from_rgb(0xf2, 0xb1, 0x79),
    TileColor::from_rgb(0xf5, 0x95, 0x63),
    TileColor::from_rgb(0xf6, 0x7c, 0x5f),
    TileColor::from_rgb(0xf6, 0x5e, 0x3b),
    TileColor::from_rgb(0xed, 0xcf, 0x72),
    TileColor::from_rgb(0xed, 0xcc, 0x61),
    TileColor::from_rgb(0xed, 0xc8, 0x50),
    TileColor::from_rgb(0xed, 0xc5, 0x3f),
    TileColor::from_rgb(0xed, 0xc2, 0x2e),
    TileColor::from_rgb(0x3c, 0x3a, 0x32),
];

/// Background and text colour pair derived from a tile value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileColors {
    /// Fill colour of the tile.
    pub background: TileColor,
    /// Colour used for the tile's label.
    pub text: TileColor,
}

impl TileColors {
    /// Palette entry for the provided tile value.
    ///
    /// Walls and perm-zero tiles have fixed colours; numeric values pick a
    /// shade by their base-two magnitude, saturating at the darkest shade.
    #[must_use]
    pub fn for_value(value: Option<u32>) -> Self {
        match value {
            None => Self {
                background: WALL_BACKGROUND,
                text: WALL_TEXT,
            },
            Some(0) => Self {
                background: ZERO_BACKGROUND,
                text: ZERO_BACKGROUND,
            },
            Some(value) => {
                let magnitude = (31 - value.leading_zeros()) as usize;
                let background = VALUE_BACKGROUNDS[magnitude.min(VALUE_BACKGROUNDS.len() - 1)];
                let text = if magnitude < 2 { DARK_TEXT } else { LIGHT_TEXT };
                Self { background, text }
            }
        }
    }
}

/// A single tile resting on (or just past the edge of) the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Identifier unique within the owning state.
    pub id: TileId,
    /// Cell the tile occupies.
    pub position: Position,
    /// `None` marks an immovable wall, `Some(0)` a perm-zero obstacle.
    pub value: Option<u32>,
    /// Identifiers of the two tiles merged into this one during the current turn.
    #[serde(default)]
    pub merged_from: Option<[TileId; 2]>,
    /// Fill colour derived from the value.
    pub background_color: TileColor,
    /// Label colour derived from the value.
    pub text_color: TileColor,
}

impl Tile {
    /// Creates a tile and derives its colours from the value.
    #[must_use]
    pub fn new(id: TileId, position: Position, value: Option<u32>) -> Self {
        let colors = TileColors::for_value(value);
        Self {
            id,
            position,
            value,
            merged_from: None,
            background_color: colors.background,
            text_color: colors.text,
        }
    }

    /// Replaces the value and recolours the tile.
    pub fn set_value(&mut self, value: Option<u32>) {
        let colors = TileColors::for_value(value);
        self.value = value;
        self.background_color = colors.background;
        self.text_color = colors.text;
    }

    /// Colours currently applied to the tile.
    #[must_use]
    pub const fn colors(&self) -> TileColors {
        TileColors {
            background: self.background_color,
            text: self.text_color,
        }
    }

    /// Reports whether the tile is a fixed wall.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        self.value.is_none()
    }
}

/// Lifecycle status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Waiting for the player to act.
    UserTurn,
    /// Waiting for an automatic follow-up step driven by `tick` or `tap`.
    AiTurn,
    /// The final level was completed.
    Won,
    /// No move can change the board.
    Lost,
}

/// Value condition a tile must satisfy to leave through an exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Requirement {
    /// Tile value must be at least `value`.
    GreaterThanEqualTo {
        /// Threshold compared against the tile value.
        value: u32,
    },
    /// Tile value must equal `value`.
    EqualTo {
        /// Exact value the tile must carry.
        value: u32,
    },
}

impl Requirement {
    /// Reports whether a tile value satisfies the requirement.
    #[must_use]
    pub const fn is_met_by(self, tile_value: u32) -> bool {
        match self {
            Self::GreaterThanEqualTo { value } => tile_value >= value,
            Self::EqualTo { value } => tile_value == value,
        }
    }

    /// Threshold carried by the requirement.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::GreaterThanEqualTo { value } | Self::EqualTo { value } => value,
        }
    }

    /// Same comparison with a different threshold.
    #[must_use]
    pub const fn with_value(self, value: u32) -> Self {
        match self {
            Self::GreaterThanEqualTo { .. } => Self::GreaterThanEqualTo { value },
            Self::EqualTo { .. } => Self::EqualTo { value },
        }
    }
}

/// Concrete exit carved into one edge cell of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExitLocation {
    /// Edge the exit sits on.
    pub side: Side,
    /// Offset along the edge, counted from the top or left.
    pub index: u32,
    /// Condition a tile must meet to leave.
    pub requirements: Requirement,
}

impl ExitLocation {
    /// Creates an exit on `side` at `index`.
    #[must_use]
    pub const fn new(side: Side, index: u32, requirements: Requirement) -> Self {
        Self {
            side,
            index,
            requirements,
        }
    }

    /// In-bounds cell guarded by the exit, if the index fits the grid.
    #[must_use]
    pub fn edge_cell(&self, grid: GridSize) -> Option<Position> {
        self.side.edge_cell(grid, self.index)
    }

    /// Reports whether the exit sits at the given side and index.
    #[must_use]
    pub fn is_at(&self, side: Side, index: u32) -> bool {
        self.side == side && self.index == index
    }
}

/// Per-level objective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Goal {
    /// Fixed exit at a known edge cell.
    ExitLocation(ExitLocation),
    /// Exit template rolled onto a free edge cell whenever the level starts.
    #[serde(rename_all = "camelCase")]
    RandomExitLocation {
        /// Condition copied onto the rolled exit.
        requirements: Requirement,
        /// Exit produced by the most recent roll.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolved: Option<ExitLocation>,
    },
}

impl Goal {
    /// Concrete exit currently in effect for this goal.
    #[must_use]
    pub fn exit(&self) -> Option<&ExitLocation> {
        match self {
            Self::ExitLocation(exit) => Some(exit),
            Self::RandomExitLocation { resolved, .. } => resolved.as_ref(),
        }
    }

    /// Mutable access to the exit currently in effect for this goal.
    pub fn exit_mut(&mut self) -> Option<&mut ExitLocation> {
        match self {
            Self::ExitLocation(exit) => Some(exit),
            Self::RandomExitLocation { resolved, .. } => resolved.as_mut(),
        }
    }
}

/// Strategy used to choose where new tiles appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SpawnTilesMethod {
    /// Uniformly random among free cells.
    #[default]
    Random,
    /// Right-to-left raster order rotated to start at an anchor cell.
    RtlSequence {
        /// Preferred first cell of the sequence.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<Position>,
    },
    /// Raster order shuffled once when the level starts.
    FixedRandom,
}

/// Configuration of a single level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Grid dimensions.
    pub grid_size: GridSize,
    /// Exit objectives.
    #[serde(default)]
    pub goals: Vec<Goal>,
    /// Number of perm-zero obstacles kept on the board.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perm_zero_tile_count: Option<u32>,
    /// Number of walls scattered when the level starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_fixed_tiles: Option<u32>,
    /// Value assigned to newly spawned tiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_tile_value: Option<u32>,
    /// Placement strategy for new tiles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_tiles_method: Option<SpawnTilesMethod>,
    /// Defers the post-slide spawn to an automatic follow-up step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defer_spawn: Option<bool>,
}

impl Settings {
    /// Creates settings for an empty level of the given size.
    #[must_use]
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            grid_size,
            goals: Vec::new(),
            perm_zero_tile_count: None,
            random_fixed_tiles: None,
            new_tile_value: None,
            spawn_tiles_method: None,
            defer_spawn: None,
        }
    }

    /// Value of freshly spawned tiles, defaulting to one.
    #[must_use]
    pub fn new_tile_value(&self) -> u32 {
        self.new_tile_value.unwrap_or(1)
    }

    /// Configured spawn placement strategy.
    #[must_use]
    pub fn spawn_method(&self) -> SpawnTilesMethod {
        self.spawn_tiles_method.unwrap_or_default()
    }

    /// Number of perm-zero obstacles the level maintains.
    #[must_use]
    pub fn perm_zero_count(&self) -> u32 {
        self.perm_zero_tile_count.unwrap_or(0)
    }

    /// Number of walls scattered at level start.
    #[must_use]
    pub fn fixed_tile_count(&self) -> u32 {
        self.random_fixed_tiles.unwrap_or(0)
    }

    /// Reports whether spawns wait for an automatic follow-up step.
    #[must_use]
    pub fn defers_spawn(&self) -> bool {
        self.defer_spawn.unwrap_or(false)
    }

    /// Concrete exits currently in effect.
    pub fn exits(&self) -> impl Iterator<Item = &ExitLocation> {
        self.goals.iter().filter_map(Goal::exit)
    }

    /// Overwrites every field present in the patch.
    pub fn apply_patch(&mut self, patch: &SettingsPatch) {
        if let Some(grid_size) = patch.grid_size {
            self.grid_size = grid_size;
        }
        if let Some(goals) = &patch.goals {
            self.goals = goals.clone();
        }
        if patch.perm_zero_tile_count.is_some() {
            self.perm_zero_tile_count = patch.perm_zero_tile_count;
        }
        if patch.random_fixed_tiles.is_some() {
            self.random_fixed_tiles = patch.random_fixed_tiles;
        }
        if patch.new_tile_value.is_some() {
            self.new_tile_value = patch.new_tile_value;
        }
        if patch.spawn_tiles_method.is_some() {
            self.spawn_tiles_method = patch.spawn_tiles_method;
        }
        if patch.defer_spawn.is_some() {
            self.defer_spawn = patch.defer_spawn;
        }
    }
}

/// Partial [`Settings`] used by level authoring.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    /// Replacement grid dimensions.
    pub grid_size: Option<GridSize>,
    /// Replacement goal list.
    pub goals: Option<Vec<Goal>>,
    /// Replacement perm-zero count.
    pub perm_zero_tile_count: Option<u32>,
    /// Replacement wall count.
    pub random_fixed_tiles: Option<u32>,
    /// Replacement spawn value.
    pub new_tile_value: Option<u32>,
    /// Replacement placement strategy.
    pub spawn_tiles_method: Option<SpawnTilesMethod>,
    /// Replacement deferred-spawn flag.
    pub defer_spawn: Option<bool>,
}

/// Marker drawn over a cell independently of whether a tile occupies it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OverlayIcon {
    /// Rank of the cell in the spawn order; lower spawns first.
    SpawnPriority {
        /// One-based rank.
        priority: u32,
    },
}

/// Auxiliary per-cell metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayTile {
    /// Cell the overlay decorates.
    pub position: Position,
    /// Identifier unique among overlays.
    pub id: u32,
    /// Icons drawn on the cell.
    pub icons: Vec<OverlayIcon>,
}

impl OverlayTile {
    /// Spawn rank carried by the overlay, if any.
    #[must_use]
    pub fn spawn_priority(&self) -> Option<u32> {
        self.icons.iter().find_map(|icon| match icon {
            OverlayIcon::SpawnPriority { priority } => Some(*priority),
        })
    }
}

/// Snapshot of how the current level began, used to rebuild it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelEntry {
    /// Tiles carried into the level before any setup spawns.
    pub tiles: Vec<Tile>,
    /// Score when the level began.
    pub score: u64,
    /// Identifiers left behind by the previous level. Setup spawns skip them.
    #[serde(default)]
    pub reserved_ids: Vec<TileId>,
}

/// Seed accepted by the deterministic random generator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seed {
    /// Numeric seed, truncated to 32 bits.
    Number(i64),
    /// Textual seed, reduced by summing character codes.
    Text(String),
}

impl Seed {
    /// Initial 32-bit generator state for the seed.
    #[must_use]
    pub fn state(&self) -> u32 {
        match self {
            Self::Number(value) => *value as u32,
            Self::Text(text) => text
                .chars()
                .fold(0u32, |sum, character| sum.wrapping_add(character as u32)),
        }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Complete, immutable snapshot of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Tiles in the order the engine last arranged them.
    pub tiles: Vec<Tile>,
    /// Accumulated merge score.
    pub score: u64,
    /// Lifecycle status.
    pub status: Status,
    /// One-based index into `level_settings`.
    pub level: u32,
    /// Seed every per-turn generator derives from.
    pub seed: Seed,
    /// Completed changing turns on the current level.
    pub turn: u32,
    /// Configuration of every level in order.
    pub level_settings: Vec<Settings>,
    /// Per-cell metadata such as spawn priorities.
    #[serde(default)]
    pub overlay_tiles: Vec<OverlayTile>,
    /// How the current level began.
    #[serde(default)]
    pub entry: LevelEntry,
}

impl GameState {
    /// Settings of the current level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingLevelSettings`] when no settings exist for
    /// the current level.
    pub fn settings(&self) -> Result<&Settings, EngineError> {
        self.settings_for(self.level)
    }

    /// Settings of the given one-based level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingLevelSettings`] when the level is not configured.
    pub fn settings_for(&self, level: u32) -> Result<&Settings, EngineError> {
        level
            .checked_sub(1)
            .and_then(|index| self.level_settings.get(index as usize))
            .ok_or(EngineError::MissingLevelSettings { level })
    }

    /// Mutable settings of the current level.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingLevelSettings`] when no settings exist for
    /// the current level.
    pub fn settings_mut(&mut self) -> Result<&mut Settings, EngineError> {
        let level = self.level;
        level
            .checked_sub(1)
            .and_then(|index| self.level_settings.get_mut(index as usize))
            .ok_or(EngineError::MissingLevelSettings { level })
    }

    /// Reports whether the current level is the final one.
    #[must_use]
    pub fn is_last_level(&self) -> bool {
        self.level as usize >= self.level_settings.len()
    }

    /// Tile occupying the position, if any.
    #[must_use]
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.position == position)
    }

    /// Tile carrying the identifier, if any.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.id == id)
    }
}

/// Target of an authoring gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EditLocation {
    /// A grid cell.
    Tile {
        /// Cell the gesture landed on.
        position: Position,
    },
    /// An edge slot that may carry an exit.
    ExitLocation {
        /// Edge of the slot.
        side: Side,
        /// Offset along the edge.
        index: u32,
    },
}

/// Every request the presentation layer may submit to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Starts a new game.
    Init {
        /// Seed for every derived generator.
        seed: Seed,
        /// Campaign override; the built-in campaign is used when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        levels: Option<Vec<Settings>>,
    },
    /// Slides tiles toward row zero.
    Up {
        /// State the action applies to.
        state: GameState,
    },
    /// Slides tiles toward the last row.
    Down {
        /// State the action applies to.
        state: GameState,
    },
    /// Slides tiles toward column zero.
    Left {
        /// State the action applies to.
        state: GameState,
    },
    /// Slides tiles toward the last column.
    Right {
        /// State the action applies to.
        state: GameState,
    },
    /// Advances a pending automatic step.
    Tap {
        /// State the action applies to.
        state: GameState,
    },
    /// Advances a pending automatic step on a timer.
    Tick {
        /// State the action applies to.
        state: GameState,
    },
    /// Short authoring gesture.
    EditTap {
        /// State the action applies to.
        state: GameState,
        /// Target of the gesture.
        location: EditLocation,
    },
    /// Long authoring gesture.
    EditHold {
        /// State the action applies to.
        state: GameState,
        /// Target of the gesture.
        location: EditLocation,
    },
    /// Merges partial settings into one level.
    EditLevelSettings {
        /// State the action applies to.
        state: GameState,
        /// One-based level to edit.
        level: u32,
        /// Fields to overwrite.
        settings: SettingsPatch,
    },
    /// Rebuilds the current level from its entry snapshot.
    ResetLevel {
        /// State the action applies to.
        state: GameState,
    },
    /// Restarts from the first level.
    ResetGame {
        /// State the action applies to.
        state: GameState,
    },
    /// Rebuilds the current level under a new seed.
    RegenerateLevel {
        /// State the action applies to.
        state: GameState,
        /// Replacement seed.
        seed: Seed,
    },
}

impl Action {
    /// Slide direction for directional actions.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self {
            Self::Up { .. } => Some(Direction::Up),
            Self::Down { .. } => Some(Direction::Down),
            Self::Left { .. } => Some(Direction::Left),
            Self::Right { .. } => Some(Direction::Right),
            _ => None,
        }
    }

    /// Builds the directional action for `direction`.
    #[must_use]
    pub fn slide(direction: Direction, state: GameState) -> Self {
        match direction {
            Direction::Up => Self::Up { state },
            Direction::Down => Self::Down { state },
            Direction::Left => Self::Left { state },
            Direction::Right => Self::Right { state },
        }
    }
}

/// One animatable change between two snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Diff {
    /// A tile changed position.
    #[serde(rename_all = "camelCase")]
    Move {
        /// Tile that moved.
        tile_id: TileId,
        /// Previous position.
        from: Position,
        /// New position.
        to: Position,
    },
    /// Two tiles combined into one.
    #[serde(rename_all = "camelCase")]
    Merge {
        /// Surviving tile.
        merged_to_tile_id: TileId,
        /// Tiles that took part in the merge.
        merged_from_tile_ids: Vec<TileId>,
        /// Value of the surviving tile before the merge.
        prev_value: Option<u32>,
        /// Value after the merge.
        new_value: Option<u32>,
        /// Colours after the merge.
        colors: TileColors,
    },
    /// A new tile appeared.
    #[serde(rename_all = "camelCase")]
    Spawn {
        /// New tile.
        tile_id: TileId,
        /// Cell the tile appeared on.
        position: Position,
        /// Value of the new tile.
        value: Option<u32>,
        /// Colours of the new tile.
        colors: TileColors,
    },
    /// A tile disappeared without merging.
    #[serde(rename_all = "camelCase")]
    Remove {
        /// Tile that disappeared.
        tile_id: TileId,
    },
    /// A tile's value changed outside of a merge.
    #[serde(rename_all = "camelCase")]
    ValueChange {
        /// Tile whose value changed.
        tile_id: TileId,
        /// Value before the change.
        prev_value: Option<u32>,
        /// Value after the change.
        new_value: Option<u32>,
    },
}

/// Broken engine invariants. These are programmer errors and are never
/// recovered from inside the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The requested level has no configured settings.
    #[error("no settings configured for level {level}")]
    MissingLevelSettings {
        /// One-based level that was looked up.
        level: u32,
    },
    /// A tile was placed on a cell that already holds one.
    #[error("cannot place a tile at {position}: cell is occupied")]
    PositionOccupied {
        /// Cell of the collision.
        position: Position,
    },
    /// Level setup ran out of room for its mandatory tiles.
    #[error("no free cell left for mandatory tiles on level {level}")]
    NoSpawnPosition {
        /// Level being set up.
        level: u32,
    },
    /// The random generator was misused.
    #[error(transparent)]
    Rand(#[from] RandError),
}
