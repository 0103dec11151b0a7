//! Single-line board export: `tiles:v1:<rows>x<cols>:<base64 json>`.
//!
//! The payload is the engine's tile projection, so a decoded export can be
//! compared directly against `query::test_props` of a live state.

use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use slide_exit_core::{EngineError, GameState, GridSize, TileId};
use slide_exit_engine::query::{self, TestProps};
use thiserror::Error;

/// Format name and revision that open every export.
pub(crate) const EXPORT_PREFIX: &str = "tiles:v1:";

/// Tiles of one board together with the grid they sit on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct BoardSnapshot {
    pub(crate) grid: GridSize,
    pub(crate) props: TestProps,
}

/// Reasons an export string was rejected.
#[derive(Debug, Error)]
pub(crate) enum StateTransferError {
    #[error("board export must start with 'tiles:v1:'")]
    UnknownFormat,
    #[error("board export has no payload after the grid dimensions")]
    MissingPayload,
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    #[error("board payload is not base64")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("board payload is not a tile list")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("tile {} appears more than once", .0.get())]
    DuplicateTile(TileId),
}

impl BoardSnapshot {
    pub(crate) fn capture(state: &GameState) -> Result<Self, EngineError> {
        Ok(Self {
            grid: state.settings()?.grid_size,
            props: query::test_props(state),
        })
    }

    pub(crate) fn encode(&self) -> serde_json::Result<String> {
        let json = serde_json::to_vec(&self.props)?;
        Ok(format!(
            "{EXPORT_PREFIX}{}x{}:{}",
            self.grid.rows,
            self.grid.columns,
            STANDARD_NO_PAD.encode(json)
        ))
    }

    /// Parses an export produced by [`BoardSnapshot::encode`].
    ///
    /// Tile identifiers must be unique; positions are not checked against the
    /// grid because exited tiles legitimately sit one step outside it.
    pub(crate) fn decode(value: &str) -> Result<Self, StateTransferError> {
        let body = value
            .trim()
            .strip_prefix(EXPORT_PREFIX)
            .ok_or(StateTransferError::UnknownFormat)?;
        let (dimensions, payload) = body
            .split_once(':')
            .ok_or(StateTransferError::MissingPayload)?;

        let grid = parse_grid(dimensions)?;
        let props: TestProps = serde_json::from_slice(&STANDARD_NO_PAD.decode(payload)?)?;

        let mut seen = HashSet::new();
        if let Some(tile) = props.tiles.iter().find(|tile| !seen.insert(tile.tile_id)) {
            return Err(StateTransferError::DuplicateTile(tile.tile_id));
        }
        Ok(Self { grid, props })
    }
}

fn parse_grid(dimensions: &str) -> Result<GridSize, StateTransferError> {
    let invalid = || StateTransferError::InvalidDimensions(dimensions.to_owned());
    let (rows, columns) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;
    match (rows.trim().parse::<u32>(), columns.trim().parse::<u32>()) {
        (Ok(rows), Ok(columns)) if rows > 0 && columns > 0 => Ok(GridSize::new(rows, columns)),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slide_exit_engine::query::TileProps;

    fn props(id: u32, value: Option<u32>, row: i32, column: i32) -> TileProps {
        TileProps {
            tile_id: TileId::new(id),
            value,
            row,
            column,
        }
    }

    fn board(tiles: Vec<TileProps>) -> BoardSnapshot {
        BoardSnapshot {
            grid: GridSize::new(3, 4),
            props: TestProps { tiles },
        }
    }

    #[test]
    fn export_names_the_grid_and_decodes_back() {
        let snapshot = board(vec![props(0, Some(8), 0, 3), props(2, None, 2, 1)]);
        let encoded = snapshot.encode().expect("tiles serialise");

        assert!(encoded.starts_with("tiles:v1:3x4:"));
        assert_eq!(BoardSnapshot::decode(&format!("  {encoded}\n")).expect("decodes"), snapshot);
    }

    #[test]
    fn exited_tiles_survive_an_export() {
        let snapshot = board(vec![props(5, Some(16), -1, 2)]);
        let encoded = snapshot.encode().expect("tiles serialise");
        assert_eq!(BoardSnapshot::decode(&encoded).expect("decodes"), snapshot);
    }

    #[test]
    fn rejects_other_formats_and_bad_grids() {
        assert!(matches!(
            BoardSnapshot::decode("maze:v1:3x4:e30"),
            Err(StateTransferError::UnknownFormat)
        ));
        assert!(matches!(
            BoardSnapshot::decode("tiles:v2:3x4:e30"),
            Err(StateTransferError::UnknownFormat)
        ));
        assert!(matches!(
            BoardSnapshot::decode("tiles:v1:3x4"),
            Err(StateTransferError::MissingPayload)
        ));
        assert!(matches!(
            BoardSnapshot::decode("tiles:v1:0x4:e30"),
            Err(StateTransferError::InvalidDimensions(dimensions)) if dimensions == "0x4"
        ));
    }

    #[test]
    fn rejects_broken_payloads() {
        assert!(matches!(
            BoardSnapshot::decode("tiles:v1:3x4:!!!"),
            Err(StateTransferError::InvalidEncoding(_))
        ));
        assert!(matches!(
            BoardSnapshot::decode("tiles:v1:3x4:e30"),
            Err(StateTransferError::InvalidPayload(_))
        ));

        let twice = board(vec![props(1, Some(2), 0, 0), props(1, Some(4), 1, 1)]);
        let encoded = twice.encode().expect("tiles serialise");
        assert!(matches!(
            BoardSnapshot::decode(&encoded),
            Err(StateTransferError::DuplicateTile(id)) if id == TileId::new(1)
        ));
    }
}
