#![deny(warnings)]

//! Persistence layer: game snapshots as JSON documents.
//!
//! A [`Snapshot`] holds the full [`GameState`] and the grid as rows of cells.
//! Loading backfills fields that older saves lack instead of failing, and the
//! grid's building index is rebuilt from the saved cells.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sim_core::{Catalog, GameState};
use sim_world::{Grid, GridCell, GridError};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Format written by this version. Saves without a version field are 1.
pub const FORMAT_VERSION: u32 = 2;

/// Game state fields added after the first save format, filled with defaults when absent.
const BACKFILLED_FIELDS: [&str; 4] = ["activeLoans", "archivedLoans", "loanCountsByType", "gameDate"];

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed snapshot: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("snapshot format {0} is newer than this build supports")]
    UnsupportedVersion(u32),
    #[error("corrupt grid: {0}")]
    Grid(#[from] GridError),
}

fn legacy_version() -> u32 {
    1
}

/// Everything needed to resume a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "legacy_version")]
    pub version: u32,
    pub game_state: GameState,
    /// Rows of cells, `grid[y][x]`.
    pub grid: Vec<Vec<GridCell>>,
}

impl Snapshot {
    /// Capture the current game.
    pub fn capture(state: &GameState, grid: &Grid) -> Self {
        Snapshot {
            version: FORMAT_VERSION,
            game_state: state.clone(),
            grid: grid.rows(),
        }
    }

    /// Turn the snapshot back into live state, rebuilding the building index.
    /// A tax rate outside the configured bounds is clamped.
    pub fn restore(self, catalog: &Catalog) -> Result<(GameState, Grid), PersistenceError> {
        if self.version > FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(self.version));
        }
        let mut state = self.game_state;
        let tax = catalog.economy.clamp_tax(state.current_tax);
        if tax != state.current_tax {
            warn!(saved = state.current_tax, clamped = tax, "saved tax rate out of bounds");
            state.current_tax = tax;
        }
        let grid = Grid::from_rows(self.grid, catalog)?;
        if grid.size() != catalog.game.grid_size {
            warn!(
                saved = grid.size(),
                configured = catalog.game.grid_size,
                "saved grid size differs from configuration, keeping the saved one"
            );
        }
        Ok((state, grid))
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a snapshot, logging every field that had to be backfilled.
    pub fn from_json(text: &str) -> Result<Self, PersistenceError> {
        let value: Value = serde_json::from_str(text)?;
        report_backfills(&value);
        let snapshot: Snapshot = serde_json::from_value(value)?;
        if snapshot.version < FORMAT_VERSION {
            info!(version = snapshot.version, "loading save from an older format");
        }
        Ok(snapshot)
    }
}

fn report_backfills(value: &Value) {
    let Some(state) = value.get("gameState").and_then(Value::as_object) else {
        return;
    };
    for field in BACKFILLED_FIELDS {
        if state.get(field).map_or(true, Value::is_null) {
            warn!(field, "snapshot lacks field, using default");
        }
    }
    let legacy_loans = state
        .get("activeLoans")
        .and_then(Value::as_array)
        .map_or(0, |loans| {
            loans
                .iter()
                .filter(|l| l.get("lastPaymentDate").map_or(true, Value::is_null))
                .count()
        });
    if legacy_loans > 0 {
        warn!(legacy_loans, "loans without payment date restart from their start date");
    }
}

/// Write `data` next to `path` and rename it into place so a crash never
/// leaves a half-written save behind.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), PersistenceError> {
    let io = |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let mut file = File::create(&tmp).map_err(io)?;
    file.write_all(data).map_err(io)?;
    file.sync_all().map_err(io)?;
    fs::rename(&tmp, path).map_err(io)?;
    Ok(())
}

pub fn save_to_path(path: &Path, snapshot: &Snapshot) -> Result<(), PersistenceError> {
    atomic_write(path, snapshot.to_json()?.as_bytes())?;
    info!(path = %path.display(), "game saved");
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Snapshot, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = Snapshot::from_json(&text)?;
    info!(path = %path.display(), version = snapshot.version, "save loaded");
    Ok(snapshot)
}
