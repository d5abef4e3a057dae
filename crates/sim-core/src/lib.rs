#![deny(warnings)]

//! Core domain models and invariants for the city simulation.
//!
//! This crate defines the serializable types shared by every engine: building
//! and decoration kinds, the configuration catalog, the persisted game state
//! and the resolved policy modifiers. Validation helpers guard the invariants
//! that configuration files must satisfy before a game can start.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod policy;
pub mod state;

pub use config::{
    BuildingConfig, Catalog, ConfigError, DecorationConfig, DecorationCounts, EconomyConfig,
    Footprint, GameConfig, LoanConfig, PolicyConfig,
};
pub use policy::PolicyEffects;
pub use state::{ActiveLoan, ArchivedLoan, GameState, DAYS_PER_MONTH, DEFAULT_START_DATE};

/// Every building the player can place on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingKind {
    Road,
    RoadTurn,
    House,
    Apartment,
    Hospital,
    School,
    Police,
    Fire,
    Park,
    ParkLarge,
    Monument,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 11] = [
        BuildingKind::Road,
        BuildingKind::RoadTurn,
        BuildingKind::House,
        BuildingKind::Apartment,
        BuildingKind::Hospital,
        BuildingKind::School,
        BuildingKind::Police,
        BuildingKind::Fire,
        BuildingKind::Park,
        BuildingKind::ParkLarge,
        BuildingKind::Monument,
    ];

    /// Identifier used in configuration files and snapshots.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildingKind::Road => "road",
            BuildingKind::RoadTurn => "roadTurn",
            BuildingKind::House => "house",
            BuildingKind::Apartment => "apartment",
            BuildingKind::Hospital => "hospital",
            BuildingKind::School => "school",
            BuildingKind::Police => "police",
            BuildingKind::Fire => "fire",
            BuildingKind::Park => "park",
            BuildingKind::ParkLarge => "parkLarge",
            BuildingKind::Monument => "monument",
        }
    }

    /// Buildings that house citizens.
    pub fn is_residential(self) -> bool {
        matches!(self, BuildingKind::House | BuildingKind::Apartment)
    }

    /// Straight and turning road tiles both belong to the road network.
    pub fn is_road(self) -> bool {
        matches!(self, BuildingKind::Road | BuildingKind::RoadTurn)
    }

    pub fn is_park(self) -> bool {
        matches!(self, BuildingKind::Park | BuildingKind::ParkLarge)
    }
}

impl fmt::Display for BuildingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-cell scenery scattered at game start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecorKind {
    Tree,
    Rock,
}

impl DecorKind {
    /// Scatter order: trees first, then rocks.
    pub const ALL: [DecorKind; 2] = [DecorKind::Tree, DecorKind::Rock];

    pub fn as_str(self) -> &'static str {
        match self {
            DecorKind::Tree => "tree",
            DecorKind::Rock => "rock",
        }
    }
}

impl fmt::Display for DecorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visual rotation of a placed building in quarter turns (0..=3).
///
/// Orientation never changes the occupied rectangle.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Orientation(u8);

impl Orientation {
    pub const NORTH: Orientation = Orientation(0);

    pub fn new(quarter_turns: u8) -> Option<Self> {
        (quarter_turns < 4).then_some(Orientation(quarter_turns))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Next orientation clockwise, wrapping after three turns.
    pub fn rotated(self) -> Self {
        Orientation((self.0 + 1) % 4)
    }
}

impl TryFrom<u8> for Orientation {
    type Error = ValidationError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Orientation::new(v).ok_or(ValidationError::InvalidOrientation(v))
    }
}

impl From<Orientation> for u8 {
    fn from(o: Orientation) -> u8 {
        o.0
    }
}

/// Identifier of a policy, e.g. "low_taxes".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolicyId(pub String);

/// Identifier of a loan product, e.g. "loan_100".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub String);

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PolicyId {
    fn from(s: &str) -> Self {
        PolicyId(s.to_string())
    }
}

impl From<&str> for LoanId {
    fn from(s: &str) -> Self {
        LoanId(s.to_string())
    }
}

/// Validation errors for configuration invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Orientation outside 0..=3.
    #[error("orientation {0} is out of range [0, 3]")]
    InvalidOrientation(u8),
    /// Footprint must cover at least one cell.
    #[error("footprint of {0} must be at least 1x1")]
    EmptyFootprint(String),
    /// Price or cost must be non-negative.
    #[error("negative monetary value for {0}")]
    NegativeMoney(String),
    /// Numeric field must be finite.
    #[error("non-finite numeric value in {0}")]
    NonFinite(String),
    /// Tax bounds are inverted.
    #[error("tax bounds are inverted: min {min} > max {max}")]
    InvalidTaxBounds { min: f64, max: f64 },
    /// Grid must contain at least one cell.
    #[error("grid size must be > 0")]
    ZeroGridSize,
    /// A game month must last some real time.
    #[error("month duration must be > 0 seconds")]
    NonPositiveMonth,
    /// Loan product cannot be amortized.
    #[error("invalid loan product: {0}")]
    InvalidLoan(String),
    /// The same id appears twice in a table.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
}

/// Round to the nearest integer, ties towards positive infinity.
///
/// Displayed statistics and currency amounts use this rule, so -2.5 becomes -2.
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn ensure_finite(value: f64, what: &str) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite(what.to_string()))
    }
}

/// Validate a building entry.
pub fn validate_building(kind: BuildingKind, b: &BuildingConfig) -> Result<(), ValidationError> {
    if b.size.width == 0 || b.size.height == 0 {
        return Err(ValidationError::EmptyFootprint(kind.to_string()));
    }
    if b.cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(kind.to_string()));
    }
    ensure_finite(b.happiness_delta, kind.as_str())
}

/// Validate a decorative object entry.
pub fn validate_decoration(d: &DecorationConfig) -> Result<(), ValidationError> {
    if d.size.width == 0 || d.size.height == 0 {
        return Err(ValidationError::EmptyFootprint(d.id.to_string()));
    }
    if d.destruction_cost < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(d.id.to_string()));
    }
    Ok(())
}

/// Validate a policy entry: every present modifier must be finite.
pub fn validate_policy(p: &PolicyConfig) -> Result<(), ValidationError> {
    let fields = [
        p.tax_multiplier,
        p.happiness_delta,
        p.crime_delta,
        p.maintenance_multiplier,
        p.maintenance_police_multiplier,
    ];
    for v in fields.into_iter().flatten() {
        ensure_finite(v, &p.id.0)?;
    }
    Ok(())
}

/// Validate economy constants.
pub fn validate_economy(e: &EconomyConfig) -> Result<(), ValidationError> {
    ensure_finite(e.base_tax_per_citizen, "baseTaxPerCitizen")?;
    ensure_finite(e.happiness_income_bonus, "happinessIncomeBonus")?;
    ensure_finite(e.tax_min, "taxMin")?;
    ensure_finite(e.tax_max, "taxMax")?;
    if !(e.month_duration_seconds.is_finite() && e.month_duration_seconds > 0.0) {
        return Err(ValidationError::NonPositiveMonth);
    }
    if e.tax_min > e.tax_max {
        return Err(ValidationError::InvalidTaxBounds {
            min: e.tax_min,
            max: e.tax_max,
        });
    }
    for (key, v) in &e.maintenance {
        ensure_finite(*v, key)?;
    }
    Ok(())
}

/// Validate a loan product.
pub fn validate_loan(l: &LoanConfig) -> Result<(), ValidationError> {
    if l.duration_months == 0 || l.amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidLoan(l.id.0.clone()));
    }
    if !l.interest_rate.is_finite() || l.interest_rate < 0.0 {
        return Err(ValidationError::InvalidLoan(l.id.0.clone()));
    }
    Ok(())
}

/// Validate global game parameters.
pub fn validate_game(g: &GameConfig) -> Result<(), ValidationError> {
    if g.grid_size == 0 {
        return Err(ValidationError::ZeroGridSize);
    }
    Ok(())
}

/// Validate the whole catalog, including id uniqueness across tables.
pub fn validate_catalog(c: &Catalog) -> Result<(), ValidationError> {
    validate_game(&c.game)?;
    validate_economy(&c.economy)?;
    for (kind, b) in &c.buildings {
        validate_building(*kind, b)?;
    }

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for p in &c.policies {
        validate_policy(p)?;
        if !ids.insert(&p.id.0) {
            return Err(ValidationError::DuplicateId(p.id.0.clone()));
        }
    }
    ids.clear();
    for l in &c.loans {
        validate_loan(l)?;
        if !ids.insert(&l.id.0) {
            return Err(ValidationError::DuplicateId(l.id.0.clone()));
        }
    }
    let mut decor: BTreeSet<DecorKind> = BTreeSet::new();
    for d in &c.decorations {
        validate_decoration(d)?;
        if !decor.insert(d.id) {
            return Err(ValidationError::DuplicateId(d.id.to_string()));
        }
    }
    Ok(())
}
