//! Happiness score from amenities near homes, policies and crime.

use crate::covering;
use serde::{Deserialize, Serialize};
use sim_core::{round_half_up, BuildingKind, Catalog, PolicyEffects};
use sim_world::{BuildingInstance, Grid};
use tracing::debug;

const BASE_HAPPINESS: f64 = 50.0;
const CRIME_WEIGHT: f64 = 0.5;

/// Leisure amenities. Each group grants its bonus at most once per home.
const LEISURE: [&[BuildingKind]; 2] = [
    &[BuildingKind::Park, BuildingKind::ParkLarge],
    &[BuildingKind::Monument],
];
const SERVICES: [&[BuildingKind]; 2] = [&[BuildingKind::Hospital], &[BuildingKind::School]];

/// Components of the happiness score, rounded for display.
///
/// Only `total` feeds the economy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HappinessBreakdown {
    pub base: i32,
    /// Average park and monument bonus per home.
    pub parks: i32,
    /// Average hospital and school bonus per home.
    pub services: i32,
    /// Average effect of the homes themselves; apartments are negative.
    pub density: i32,
    pub policies: f64,
    /// Always zero or negative.
    pub crime: i32,
    pub total: u8,
}

/// Best bonus any covering instance of `group` grants to `home`.
fn group_bonus(grid: &Grid, catalog: &Catalog, home: &BuildingInstance, group: &[BuildingKind]) -> f64 {
    covering(grid, catalog, home, group)
        .filter_map(|s| catalog.buildings.get(&s.kind))
        .map(|b| b.happiness_delta)
        .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.max(d))))
        .unwrap_or(0.0)
}

/// Happiness of the city given the current crime index.
pub fn happiness(grid: &Grid, catalog: &Catalog, effects: &PolicyEffects, crime: u8) -> HappinessBreakdown {
    let mut homes = 0usize;
    let mut leisure = 0.0;
    let mut services = 0.0;
    let mut density = 0.0;
    for home in grid.residential() {
        homes += 1;
        leisure += LEISURE
            .iter()
            .map(|g| group_bonus(grid, catalog, home, g))
            .sum::<f64>();
        services += SERVICES
            .iter()
            .map(|g| group_bonus(grid, catalog, home, g))
            .sum::<f64>();
        density += catalog
            .buildings
            .get(&home.kind)
            .map_or(0.0, |b| b.happiness_delta);
    }
    let avg = |sum: f64| if homes == 0 { 0.0 } else { sum / homes as f64 };
    let (leisure, services, density) = (avg(leisure), avg(services), avg(density));
    let crime_penalty = (f64::from(crime) * CRIME_WEIGHT).max(0.0);

    let raw = BASE_HAPPINESS + leisure + services + density + effects.happiness_delta - crime_penalty;
    let total = round_half_up(raw.clamp(0.0, 100.0)) as u8;
    debug!(homes, raw, total, "happiness computed");

    HappinessBreakdown {
        base: BASE_HAPPINESS as i32,
        parks: round_half_up(leisure) as i32,
        services: round_half_up(services) as i32,
        density: round_half_up(density) as i32,
        policies: effects.happiness_delta,
        crime: -(round_half_up(crime_penalty) as i32),
        total,
    }
}
