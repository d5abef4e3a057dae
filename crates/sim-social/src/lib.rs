#![deny(warnings)]

//! Social simulation: population, service coverage, crime and happiness.
//!
//! Both engines are pure functions of the grid, the catalog and the resolved
//! policy effects. Buildings are counted per instance, so a 2x2 apartment
//! houses its citizens once and is tested for coverage once, from its anchor.

use serde::{Deserialize, Serialize};
use sim_core::{round_half_up, BuildingKind, Catalog, PolicyEffects};
use sim_world::{BuildingInstance, Grid};
use std::fmt;
use tracing::debug;

pub mod happiness;

pub use happiness::{happiness, HappinessBreakdown};

const BASE_CRIME: f64 = 20.0;
/// Crime removed when every home is within reach of a police station.
const POLICE_CRIME_REDUCTION: f64 = 30.0;
const HOSPITAL_BEDS_PER_CITIZEN: f64 = 0.8;
const SCHOOL_SEATS_PER_CITIZEN: f64 = 0.7;
const MIN_SERVICE_COVERAGE: f64 = 80.0;
const CRIME_ALERT_LEVEL: f64 = 30.0;

/// Advisory raised when a service falls short. Purely informational.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Demand {
    Hospitals,
    Schools,
    PoliceCoverage,
    FireCoverage,
    Crime,
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Demand::Hospitals => "not enough hospitals",
            Demand::Schools => "not enough schools",
            Demand::PoliceCoverage => "police coverage too low",
            Demand::FireCoverage => "fire coverage too low",
            Demand::Crime => "crime is high",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCapacity {
    pub hospital: u32,
    pub school: u32,
}

/// Share of homes reached by each emergency service, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub police: u8,
    pub fire: u8,
}

/// City-wide statistics derived from the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityStats {
    pub total_citizens: u32,
    pub total_capacity: ServiceCapacity,
    pub coverage: Coverage,
    /// Index in [0, 100].
    pub crime: u8,
    pub demands: Vec<Demand>,
}

/// Instances of `kinds` whose own coverage radius reaches `target`.
///
/// Distance is Manhattan, anchor to anchor.
pub fn covering<'a>(
    grid: &'a Grid,
    catalog: &'a Catalog,
    target: &'a BuildingInstance,
    kinds: &'a [BuildingKind],
) -> impl Iterator<Item = &'a BuildingInstance> + 'a {
    grid.instances()
        .filter(move |s| kinds.contains(&s.kind))
        .filter(move |s| {
            let radius = catalog
                .buildings
                .get(&s.kind)
                .map_or(0, |b| b.coverage_radius);
            s.anchor.manhattan(target.anchor) <= radius
        })
}

fn is_covered(grid: &Grid, catalog: &Catalog, home: &BuildingInstance, kind: BuildingKind) -> bool {
    covering(grid, catalog, home, &[kind]).next().is_some()
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Citizens, capacities, coverage, crime and demands for the current grid.
pub fn city_stats(grid: &Grid, catalog: &Catalog, effects: &PolicyEffects) -> CityStats {
    let mut citizens = 0u32;
    let mut capacity = ServiceCapacity::default();
    for inst in grid.instances() {
        let Some(cfg) = catalog.buildings.get(&inst.kind) else {
            continue;
        };
        match inst.kind {
            k if k.is_residential() => citizens = citizens.saturating_add(cfg.citizens),
            BuildingKind::Hospital => capacity.hospital = capacity.hospital.saturating_add(cfg.capacity),
            BuildingKind::School => capacity.school = capacity.school.saturating_add(cfg.capacity),
            _ => {}
        }
    }

    let homes: Vec<&BuildingInstance> = grid.residential().collect();
    let police_covered = homes
        .iter()
        .filter(|h| is_covered(grid, catalog, h, BuildingKind::Police))
        .count();
    let fire_covered = homes
        .iter()
        .filter(|h| is_covered(grid, catalog, h, BuildingKind::Fire))
        .count();
    let police = percent(police_covered, homes.len());
    let fire = percent(fire_covered, homes.len());

    let crime = (BASE_CRIME - police / 100.0 * POLICE_CRIME_REDUCTION + effects.crime_delta)
        .clamp(0.0, 100.0);

    let mut demands = Vec::new();
    if f64::from(capacity.hospital) < f64::from(citizens) * HOSPITAL_BEDS_PER_CITIZEN {
        demands.push(Demand::Hospitals);
    }
    if f64::from(capacity.school) < f64::from(citizens) * SCHOOL_SEATS_PER_CITIZEN {
        demands.push(Demand::Schools);
    }
    if police < MIN_SERVICE_COVERAGE {
        demands.push(Demand::PoliceCoverage);
    }
    if fire < MIN_SERVICE_COVERAGE {
        demands.push(Demand::FireCoverage);
    }
    if crime > CRIME_ALERT_LEVEL {
        demands.push(Demand::Crime);
    }

    let stats = CityStats {
        total_citizens: citizens,
        total_capacity: capacity,
        coverage: Coverage {
            police: round_half_up(police) as u8,
            fire: round_half_up(fire) as u8,
        },
        crime: round_half_up(crime) as u8,
        demands,
    };
    debug!(
        citizens = stats.total_citizens,
        police = stats.coverage.police,
        fire = stats.coverage.fire,
        crime = stats.crime,
        demands = stats.demands.len(),
        "city stats computed"
    );
    stats
}
