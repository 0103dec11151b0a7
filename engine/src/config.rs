//! Level campaign configuration.

use serde::{Deserialize, Serialize};
use slide_exit_core::{
    ExitLocation, Goal, GridSize, Requirement, Settings, Side, SpawnTilesMethod,
};
use thiserror::Error;

/// Ordered list of level settings loaded from TOML.
///
/// ```toml
/// [[levels]]
/// gridSize = { rows = 3, columns = 3 }
/// newTileValue = 1
///
/// [[levels.goals]]
/// type = "exit-location"
/// side = "top"
/// index = 1
/// requirements = { type = "greater-than-equal-to", value = 4 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalog {
    /// Levels in play order.
    pub levels: Vec<Settings>,
}

impl LevelCatalog {
    /// Parses and validates a catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the text is not valid TOML or describes an
    /// unplayable campaign.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let catalog: Self = toml::from_str(contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks that every level has a grid and that fixed exits fit it.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (index, settings) in self.levels.iter().enumerate() {
            let level = index as u32 + 1;
            let grid = settings.grid_size;
            if grid.rows == 0 || grid.columns == 0 {
                return Err(ConfigError::EmptyGrid { level });
            }
            for goal in &settings.goals {
                if let Goal::ExitLocation(exit) = goal {
                    if exit.edge_cell(grid).is_none() {
                        return Err(ConfigError::ExitOutOfRange {
                            level,
                            side: exit.side,
                            index: exit.index,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Consumes the catalog, yielding its levels.
    #[must_use]
    pub fn into_levels(self) -> Vec<Settings> {
        self.levels
    }
}

/// Problems found while loading a level catalog.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The text is not a valid catalog document.
    #[error("failed to parse level catalog")]
    Parse(#[from] toml::de::Error),
    /// The catalog lists no levels.
    #[error("level catalog contains no levels")]
    NoLevels,
    /// A level has zero rows or columns.
    #[error("level {level} has an empty grid")]
    EmptyGrid {
        /// One-based level.
        level: u32,
    },
    /// A fixed exit names a slot past the end of its edge.
    #[error("exit on level {level} at {side:?} index {index} lies outside the grid")]
    ExitOutOfRange {
        /// One-based level.
        level: u32,
        /// Edge of the exit.
        side: Side,
        /// Offset along the edge.
        index: u32,
    },
}

/// Built-in campaign used when a game starts without a catalog.
#[must_use]
pub fn default_levels() -> Vec<Settings> {
    let mut first = Settings::new(GridSize::new(3, 3));
    first.goals.push(Goal::ExitLocation(ExitLocation::new(
        Side::Top,
        1,
        Requirement::GreaterThanEqualTo { value: 4 },
    )));

    let mut second = Settings::new(GridSize::new(3, 4));
    second.random_fixed_tiles = Some(1);
    second.goals.push(Goal::RandomExitLocation {
        requirements: Requirement::GreaterThanEqualTo { value: 8 },
        resolved: None,
    });

    let mut third = Settings::new(GridSize::new(4, 4));
    third.perm_zero_tile_count = Some(2);
    third.spawn_tiles_method = Some(SpawnTilesMethod::RtlSequence { start: None });
    third.goals.push(Goal::ExitLocation(ExitLocation::new(
        Side::Right,
        2,
        Requirement::GreaterThanEqualTo { value: 16 },
    )));

    let mut fourth = Settings::new(GridSize::new(4, 4));
    fourth.random_fixed_tiles = Some(2);
    fourth.new_tile_value = Some(2);
    fourth.spawn_tiles_method = Some(SpawnTilesMethod::FixedRandom);
    fourth.goals.push(Goal::RandomExitLocation {
        requirements: Requirement::EqualTo { value: 64 },
        resolved: None,
    });

    vec![first, second, third, fourth]
}
