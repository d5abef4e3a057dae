//! Configuration store: immutable per-type tables loaded once per session.

use crate::{validate_catalog, BuildingKind, DecorKind, LoanId, PolicyId, ValidationError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const GAME_FILE: &str = "game.yaml";
const ECONOMY_FILE: &str = "economy.yaml";
const BUILDINGS_FILE: &str = "buildings.yaml";
const POLICIES_FILE: &str = "policies.yaml";
const LOANS_FILE: &str = "loans.yaml";
const DECORATIONS_FILE: &str = "decorations.yaml";

/// Errors raised while loading or querying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid {file}: {message}")]
    Parse { file: String, message: String },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("no configuration for building {0}")]
    MissingBuilding(BuildingKind),
    #[error("no configuration for decoration {0}")]
    MissingDecoration(DecorKind),
    #[error("unknown policy: {0}")]
    MissingPolicy(PolicyId),
    #[error("unknown loan product: {0}")]
    MissingLoan(LoanId),
}

/// Rectangle of cells covered by a building, `[width, height]` on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const UNIT: Footprint = Footprint {
        width: 1,
        height: 1,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(self) -> u32 {
        self.width * self.height
    }
}

impl From<[u32; 2]> for Footprint {
    fn from([width, height]: [u32; 2]) -> Self {
        Footprint { width, height }
    }
}

impl From<Footprint> for [u32; 2] {
    fn from(f: Footprint) -> Self {
        [f.width, f.height]
    }
}

fn unit_footprint() -> Footprint {
    Footprint::UNIT
}

/// Per-type building parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingConfig {
    /// Footprint in cells; orientation never swaps the axes.
    pub size: Footprint,
    /// Purchase price. Removal refunds half of it, rounded down.
    pub cost: Decimal,
    #[serde(default)]
    pub requires_road: bool,
    /// Citizens housed per instance.
    #[serde(default)]
    pub citizens: u32,
    /// Service capacity per instance (hospital beds, school seats).
    #[serde(default)]
    pub capacity: u32,
    #[serde(default, alias = "coverage")]
    pub coverage_radius: u32,
    #[serde(default, alias = "happiness")]
    pub happiness_delta: f64,
    /// Key into `EconomyConfig::maintenance`.
    #[serde(alias = "maintKey")]
    pub maintenance_key: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecorationConfig {
    pub id: DecorKind,
    #[serde(default = "unit_footprint")]
    pub size: Footprint,
    pub destruction_cost: Decimal,
}

/// Optional modifiers granted by an active policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    pub id: PolicyId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub tax_multiplier: Option<f64>,
    #[serde(default)]
    pub happiness_delta: Option<f64>,
    #[serde(default)]
    pub crime_delta: Option<f64>,
    #[serde(default)]
    pub maintenance_multiplier: Option<f64>,
    #[serde(default)]
    pub maintenance_police_multiplier: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomyConfig {
    pub base_tax_per_citizen: f64,
    /// Real seconds between two monthly recompute passes.
    pub month_duration_seconds: f64,
    #[serde(default)]
    pub maintenance: BTreeMap<String, f64>,
    #[serde(default)]
    pub happiness_income_bonus: f64,
    pub tax_min: f64,
    pub tax_max: f64,
}

impl EconomyConfig {
    pub fn clamp_tax(&self, rate: f64) -> f64 {
        if rate.is_nan() {
            return self.tax_min;
        }
        rate.clamp(self.tax_min, self.tax_max)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanConfig {
    pub id: LoanId,
    pub amount: Decimal,
    pub duration_months: u32,
    /// Base interest in percent of the principal.
    pub interest_rate: f64,
    #[serde(default)]
    pub label: String,
}

/// How many decorative objects of each kind a new game scatters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecorationCounts {
    pub tree_count: u32,
    pub rock_count: u32,
}

impl Default for DecorationCounts {
    fn default() -> Self {
        Self {
            tree_count: 40,
            rock_count: 10,
        }
    }
}

impl DecorationCounts {
    pub fn count(&self, kind: DecorKind) -> u32 {
        match kind {
            DecorKind::Tree => self.tree_count,
            DecorKind::Rock => self.rock_count,
        }
    }
}

fn default_start_date() -> NaiveDate {
    crate::DEFAULT_START_DATE
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub grid_size: u32,
    pub start_money: Decimal,
    #[serde(default)]
    pub start_citizens: u32,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default)]
    pub admin_code: String,
    /// When set, buildings flagged `requiresRoad` need a road next to their footprint.
    #[serde(default)]
    pub enforce_road_access: bool,
    #[serde(default)]
    pub decorations: DecorationCounts,
}

/// All configuration tables, resolved once and shared read-only by every engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub game: GameConfig,
    pub economy: EconomyConfig,
    pub buildings: BTreeMap<BuildingKind, BuildingConfig>,
    pub policies: Vec<PolicyConfig>,
    pub loans: Vec<LoanConfig>,
    pub decorations: Vec<DecorationConfig>,
}

fn parse<T: DeserializeOwned>(file: &str, text: &str) -> Result<T, ConfigError> {
    serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
        file: file.to_string(),
        message: e.to_string(),
    })
}

fn read(dir: &Path, file: &str) -> Result<String, ConfigError> {
    let path = dir.join(file);
    fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
}

impl Catalog {
    /// Build a catalog from the six YAML documents and validate it.
    pub fn from_yaml_tables(
        game: &str,
        economy: &str,
        buildings: &str,
        policies: &str,
        loans: &str,
        decorations: &str,
    ) -> Result<Self, ConfigError> {
        let catalog = Catalog {
            game: parse(GAME_FILE, game)?,
            economy: parse(ECONOMY_FILE, economy)?,
            buildings: parse(BUILDINGS_FILE, buildings)?,
            policies: parse(POLICIES_FILE, policies)?,
            loans: parse(LOANS_FILE, loans)?,
            decorations: parse(DECORATIONS_FILE, decorations)?,
        };
        validate_catalog(&catalog)?;
        debug!(
            buildings = catalog.buildings.len(),
            policies = catalog.policies.len(),
            loans = catalog.loans.len(),
            "catalog parsed"
        );
        Ok(catalog)
    }

    /// Load every table from a configuration directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let catalog = Self::from_yaml_tables(
            &read(dir, GAME_FILE)?,
            &read(dir, ECONOMY_FILE)?,
            &read(dir, BUILDINGS_FILE)?,
            &read(dir, POLICIES_FILE)?,
            &read(dir, LOANS_FILE)?,
            &read(dir, DECORATIONS_FILE)?,
        )?;
        info!(dir = %dir.display(), "configuration loaded");
        Ok(catalog)
    }

    /// The default tables shipped under `assets/config`.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_tables(
            include_str!("../../../assets/config/game.yaml"),
            include_str!("../../../assets/config/economy.yaml"),
            include_str!("../../../assets/config/buildings.yaml"),
            include_str!("../../../assets/config/policies.yaml"),
            include_str!("../../../assets/config/loans.yaml"),
            include_str!("../../../assets/config/decorations.yaml"),
        )
    }

    pub fn building(&self, kind: BuildingKind) -> Result<&BuildingConfig, ConfigError> {
        self.buildings
            .get(&kind)
            .ok_or(ConfigError::MissingBuilding(kind))
    }

    pub fn decoration(&self, kind: DecorKind) -> Result<&DecorationConfig, ConfigError> {
        self.decorations
            .iter()
            .find(|d| d.id == kind)
            .ok_or(ConfigError::MissingDecoration(kind))
    }

    pub fn policy(&self, id: &PolicyId) -> Result<&PolicyConfig, ConfigError> {
        self.policies
            .iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| ConfigError::MissingPolicy(id.clone()))
    }

    pub fn loan(&self, id: &LoanId) -> Result<&LoanConfig, ConfigError> {
        self.loans
            .iter()
            .find(|l| &l.id == id)
            .ok_or_else(|| ConfigError::MissingLoan(id.clone()))
    }

    /// Monthly upkeep of one instance of `kind`; unknown kinds or keys cost nothing.
    pub fn maintenance_for(&self, kind: BuildingKind) -> f64 {
        self.buildings
            .get(&kind)
            .and_then(|b| self.economy.maintenance.get(&b.maintenance_key))
            .copied()
            .unwrap_or(0.0)
    }
}
