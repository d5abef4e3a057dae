#![deny(warnings)]

//! World grid and placement engine.
//!
//! The grid is a fixed square of cells. Each cell holds at most one occupant:
//! a cell of a building footprint or a single decorative object. Every placed
//! building gets an [`InstanceId`]; all of its cells carry that id and the
//! grid keeps an index from id to anchor, kind, orientation and footprint, so
//! any occupied cell resolves to its building without scanning neighbours.

use serde::{Deserialize, Serialize};
use sim_core::{BuildingKind, ConfigError};
use std::fmt;
use thiserror::Error;

pub mod grid;
pub mod path;
pub mod placement;
pub mod scatter;

pub use grid::{footprint_cells, BuildingInstance, Grid, GridCell};
pub use path::{find_road_path, road_component};
pub use placement::{refund_for, Removed};
pub use scatter::{scatter_positions, Lcg};

/// A cell coordinate, `x` to the right and `y` downwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: u32,
    pub y: u32,
}

impl Pos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identity of a placed building, shared by all cells of its footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub u64);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a placement, removal or move was rejected. The grid is unchanged.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("footprint at {0} leaves the grid")]
    OutOfBounds(Pos),
    #[error("cell {0} is occupied")]
    Occupied(Pos),
    #[error("no building at {0}")]
    NoBuilding(Pos),
    #[error("no decorative object at {0}")]
    NoDecoration(Pos),
    #[error("{0} needs a road next to it")]
    NoRoadAccess(BuildingKind),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Integrity problems found while rebuilding a grid from saved cells.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid must be square and non-empty")]
    NotSquare,
    #[error("cell stored at {stored} sits at {actual}")]
    CellMismatch { stored: Pos, actual: Pos },
    #[error("cell {0} holds both a building and a decorative object")]
    Overlap(Pos),
    #[error("building {0} is not a homogeneous rectangle")]
    Fragmented(InstanceId),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
