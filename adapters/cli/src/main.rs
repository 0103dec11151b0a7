#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Slide Exit from a saved JSON state.

mod state_transfer;
mod store;

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use slide_exit_core::{
    Action, Direction, EditLocation, GameState, Position, Requirement, Seed, Settings, Side, Status,
};
use slide_exit_engine::{apply_action, get_state_diffs, LevelCatalog};

use crate::state_transfer::BoardSnapshot;

#[derive(Debug, Parser)]
#[command(author, version, about = "Slide tiles toward the exits, one command at a time")]
struct Cli {
    /// File holding the current game state.
    #[arg(long, value_name = "FILE", default_value = "slide-exit-state.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Start a new game.
    New {
        /// Seed for every random draw; integers are used as-is.
        #[arg(long, default_value = "slide-exit")]
        seed: String,
        /// TOML level catalog replacing the built-in campaign.
        #[arg(long, value_name = "FILE")]
        levels: Option<PathBuf>,
    },
    /// Slide every tile in one direction.
    Move {
        /// Direction of the slide.
        #[arg(value_enum)]
        direction: DirectionArg,
    },
    /// Advance a pending automatic step.
    Tick,
    /// Advance a pending automatic step by tapping.
    Tap,
    /// Print the current board.
    Show,
    /// Print a single-line board export.
    Export,
    /// Print the tiles stored in a board export.
    Decode {
        /// Export string produced by `export`.
        payload: String,
    },
    /// Restart the current level.
    ResetLevel,
    /// Restart from the first level.
    ResetGame,
    /// Rebuild the current level under a new seed.
    Regenerate {
        /// Replacement seed.
        seed: String,
    },
    /// Tap a cell (`ROW,COL`) or an exit slot (`SIDE:INDEX`).
    EditTap {
        /// Target of the gesture.
        #[arg(value_parser = parse_location)]
        target: EditLocation,
    },
    /// Hold a cell (`ROW,COL`) or an exit slot (`SIDE:INDEX`).
    EditHold {
        /// Target of the gesture.
        #[arg(value_parser = parse_location)]
        target: EditLocation,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Up,
    Down,
    Left,
    Right,
}

impl From<DirectionArg> for Direction {
    fn from(value: DirectionArg) -> Self {
        match value {
            DirectionArg::Up => Direction::Up,
            DirectionArg::Down => Direction::Down,
            DirectionArg::Left => Direction::Left,
            DirectionArg::Right => Direction::Right,
        }
    }
}

/// Entry point for the Slide Exit command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match cli.command {
        CliCommand::New { seed, levels } => {
            let levels = levels.map(|path| load_catalog(&path)).transpose()?;
            let action = Action::Init {
                seed: parse_seed(&seed),
                levels,
            };
            let state = apply_action(action).context("failed to start a new game")?;
            store::save(&cli.state, &state);
            info!("started a new game with seed {seed}");
            print!("{}", render_board(&state)?);
        }
        CliCommand::Show => print!("{}", render_board(&load_state(&cli.state)?)?),
        CliCommand::Export => {
            let state = load_state(&cli.state)?;
            println!("{}", BoardSnapshot::capture(&state)?.encode()?);
        }
        CliCommand::Decode { payload } => {
            let snapshot = BoardSnapshot::decode(&payload)?;
            println!("{}x{} board", snapshot.grid.rows, snapshot.grid.columns);
            for tile in snapshot.props.tiles {
                let value = tile.value.map_or_else(|| "wall".to_owned(), |v| v.to_string());
                println!(
                    "  tile {:>3} at [{}, {}]: {value}",
                    tile.tile_id.get(),
                    tile.row,
                    tile.column
                );
            }
        }
        CliCommand::Move { direction } => {
            let direction = Direction::from(direction);
            play(&cli.state, &format!("{direction:?}"), |state| {
                Action::slide(direction, state)
            })?;
        }
        CliCommand::Tick => play(&cli.state, "tick", |state| Action::Tick { state })?,
        CliCommand::Tap => play(&cli.state, "tap", |state| Action::Tap { state })?,
        CliCommand::ResetLevel => {
            play(&cli.state, "reset-level", |state| Action::ResetLevel { state })?;
        }
        CliCommand::ResetGame => {
            play(&cli.state, "reset-game", |state| Action::ResetGame { state })?;
        }
        CliCommand::Regenerate { seed } => {
            play(&cli.state, "regenerate-level", |state| {
                Action::RegenerateLevel {
                    state,
                    seed: parse_seed(&seed),
                }
            })?;
        }
        CliCommand::EditTap { target } => {
            play(&cli.state, "edit-tap", |state| Action::EditTap {
                state,
                location: target,
            })?;
        }
        CliCommand::EditHold { target } => {
            play(&cli.state, "edit-hold", |state| Action::EditHold {
                state,
                location: target,
            })?;
        }
    }
    Ok(())
}

/// Applies one action to the saved state and stores the result.
fn play(path: &Path, label: &str, build: impl FnOnce(GameState) -> Action) -> Result<()> {
    let state = load_state(path)?;
    let next = apply_action(build(state.clone())).with_context(|| format!("{label} failed"))?;
    let diffs = get_state_diffs(&state, &next);
    for diff in &diffs {
        debug!("{diff:?}");
    }
    store::save(path, &next);
    info!("applied {label}: {} change(s)", diffs.len());
    print!("{}", render_board(&next)?);
    Ok(())
}

fn load_state(path: &Path) -> Result<GameState> {
    store::load(path).ok_or_else(|| {
        anyhow!(
            "no saved game at {}; run `slide-exit new` first",
            path.display()
        )
    })
}

fn load_catalog(path: &Path) -> Result<Vec<Settings>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level catalog {}", path.display()))?;
    let catalog = LevelCatalog::from_toml_str(&contents)
        .with_context(|| format!("invalid level catalog {}", path.display()))?;
    Ok(catalog.into_levels())
}

fn parse_seed(raw: &str) -> Seed {
    raw.parse::<i64>()
        .map_or_else(|_| Seed::Text(raw.to_owned()), Seed::Number)
}

fn parse_location(raw: &str) -> Result<EditLocation, String> {
    if let Some((side, index)) = raw.split_once(':') {
        let side = match side.trim().to_ascii_lowercase().as_str() {
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            other => return Err(format!("unknown side '{other}'")),
        };
        let index = index
            .trim()
            .parse::<u32>()
            .map_err(|error| format!("invalid exit index: {error}"))?;
        return Ok(EditLocation::ExitLocation { side, index });
    }

    let (row, column) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL or SIDE:INDEX, got '{raw}'"))?;
    let row = row
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid row: {error}"))?;
    let column = column
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("invalid column: {error}"))?;
    Ok(EditLocation::Tile {
        position: Position::new(row, column),
    })
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::UserTurn => "your turn",
        Status::AiTurn => "waiting for tick",
        Status::Won => "won",
        Status::Lost => "lost",
    }
}

/// Renders the current level as a text grid followed by its exits.
fn render_board(state: &GameState) -> Result<String> {
    let settings = state.settings()?;
    let grid = settings.grid_size;
    let mut out = String::new();
    writeln!(
        out,
        "level {}/{}  score {}  turn {}  {}",
        state.level,
        state.level_settings.len(),
        state.score,
        state.turn,
        status_label(state.status)
    )?;

    for position in grid.positions() {
        let cell = match state.tile_at(position).map(|tile| tile.value) {
            None => ".".to_owned(),
            Some(None) => "#".to_owned(),
            Some(Some(value)) => value.to_string(),
        };
        write!(out, "{cell:>6}")?;
        if position.column() + 1 == grid.columns as i32 {
            writeln!(out)?;
        }
    }

    for exit in settings.exits() {
        let rule = match exit.requirements {
            Requirement::GreaterThanEqualTo { value } => format!(">= {value}"),
            Requirement::EqualTo { value } => format!("== {value}"),
        };
        writeln!(out, "exit {:?} {}: {rule}", exit.side, exit.index)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_parse_cells_and_exit_slots() {
        assert_eq!(
            parse_location("2, 3"),
            Ok(EditLocation::Tile {
                position: Position::new(2, 3)
            })
        );
        assert_eq!(
            parse_location("Top:1"),
            Ok(EditLocation::ExitLocation {
                side: Side::Top,
                index: 1
            })
        );
        assert!(parse_location("middle:1").is_err());
        assert!(parse_location("7").is_err());
    }

    #[test]
    fn numeric_seeds_stay_numeric() {
        assert_eq!(parse_seed("42"), Seed::Number(42));
        assert_eq!(parse_seed("forty-two"), Seed::Text("forty-two".to_owned()));
    }

    #[test]
    fn board_renders_walls_values_and_exits() {
        let state = apply_action(Action::Init {
            seed: Seed::Number(1),
            levels: None,
        })
        .expect("default campaign");
        let rendered = render_board(&state).expect("renders");
        assert!(rendered.starts_with("level 1/4"));
        assert_eq!(rendered.lines().filter(|line| line.contains('.')).count(), 3);
        assert!(rendered.contains("exit Top 1: >= 4"));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
