//! Policy effect accumulation.

use crate::{Catalog, PolicyId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Modifiers of all active policies folded into one value.
///
/// Multipliers compose by product and deltas by sum, so the order in which
/// policies were enabled has no influence on the result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyEffects {
    pub tax_multiplier: f64,
    pub happiness_delta: f64,
    pub crime_delta: f64,
    pub maintenance_multiplier: f64,
    /// Re-prices police upkeep only, on top of `maintenance_multiplier`.
    pub maintenance_police_multiplier: f64,
}

impl Default for PolicyEffects {
    fn default() -> Self {
        Self {
            tax_multiplier: 1.0,
            happiness_delta: 0.0,
            crime_delta: 0.0,
            maintenance_multiplier: 1.0,
            maintenance_police_multiplier: 1.0,
        }
    }
}

impl PolicyEffects {
    /// Resolve the active policy set against the catalog. Unknown ids are skipped.
    pub fn resolve<'a, I>(catalog: &Catalog, active: I) -> Self
    where
        I: IntoIterator<Item = &'a PolicyId>,
    {
        let mut fx = PolicyEffects::default();
        for id in active {
            let Ok(p) = catalog.policy(id) else {
                debug!(policy = %id, "ignoring unknown active policy");
                continue;
            };
            fx.tax_multiplier *= p.tax_multiplier.unwrap_or(1.0);
            fx.happiness_delta += p.happiness_delta.unwrap_or(0.0);
            fx.crime_delta += p.crime_delta.unwrap_or(0.0);
            fx.maintenance_multiplier *= p.maintenance_multiplier.unwrap_or(1.0);
            fx.maintenance_police_multiplier *= p.maintenance_police_multiplier.unwrap_or(1.0);
        }
        fx
    }
}
