//! Deterministic scatter of decorative objects at game start.

use crate::grid::Grid;
use crate::Pos;
use sim_core::{Catalog, DecorKind, DecorationCounts};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Cells kept free of scenery along every edge.
const EDGE_MARGIN: u32 = 3;

/// Linear congruential generator used for the scatter.
///
/// Deliberately tiny: the same seed must give the same map on every platform.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const MUL: u64 = 9301;
    const INC: u64 = 49297;
    const MOD: u64 = 233_280;

    pub fn new(seed: u64) -> Self {
        Lcg {
            state: seed % Self::MOD,
        }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.state = (self.state * Self::MUL + Self::INC) % Self::MOD;
        self.state as f64 / Self::MOD as f64
    }

    /// Next integer in `[0, bound)`.
    pub fn next_below(&mut self, bound: u32) -> u32 {
        let v = (self.next_f64() * f64::from(bound)).floor() as u32;
        v.min(bound.saturating_sub(1))
    }
}

/// Positions for the configured number of trees and rocks, trees first.
///
/// Draws come from one stream seeded with `seed`. Each object gets at most
/// `available_width * available_height` attempts to find a free cell inside
/// the margin; an object that runs out of attempts is skipped.
pub fn scatter_positions(seed: u64, counts: &DecorationCounts, grid_size: u32) -> Vec<(Pos, DecorKind)> {
    let available = grid_size.saturating_sub(2 * EDGE_MARGIN);
    if available == 0 {
        return Vec::new();
    }
    let budget = u64::from(available) * u64::from(available);
    let mut rng = Lcg::new(seed);
    let mut taken: BTreeSet<Pos> = BTreeSet::new();
    let mut out = Vec::new();

    for kind in DecorKind::ALL {
        let wanted = counts.count(kind);
        let mut skipped = 0u32;
        for _ in 0..wanted {
            let mut attempts = 0u64;
            let found = loop {
                if attempts >= budget {
                    break None;
                }
                attempts += 1;
                let x = EDGE_MARGIN + rng.next_below(available);
                let y = EDGE_MARGIN + rng.next_below(available);
                let p = Pos::new(x, y);
                if taken.insert(p) {
                    break Some(p);
                }
            };
            match found {
                Some(p) => out.push((p, kind)),
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(%kind, wanted, skipped, "ran out of free cells for scenery");
        }
    }
    out
}

impl Grid {
    /// A fresh grid sized from the catalog with scenery scattered from `seed`.
    pub fn new_game(catalog: &Catalog, seed: u64) -> Self {
        Self::with_scenery(catalog.game.grid_size, seed, &catalog.game.decorations)
    }

    pub fn with_scenery(size: u32, seed: u64, counts: &DecorationCounts) -> Self {
        let mut grid = Grid::new(size);
        let positions = scatter_positions(seed, counts, size);
        for (p, kind) in &positions {
            // Positions are distinct and inside the margin, so this cannot fail.
            if let Err(e) = grid.place_decoration(*p, *kind) {
                warn!(error = %e, "scenery placement rejected");
            }
        }
        debug!(seed, placed = positions.len(), "scenery scattered");
        grid
    }
}
