#![deny(warnings)]

//! Economic models: monthly budget and loans for the city.
//!
//! This crate provides:
//! - The monthly income statement (tax revenue, upkeep, running costs)
//! - The asset-decay fallback applied when a month brings no revenue
//! - Loan issuance with escalating interest and day-based repayment ([`loans`])
//!
//! Formulas run in `f64` and are rounded half-up to whole currency units
//! before they touch the treasury. Loan amounts keep full decimal precision.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::{round_half_up, BuildingKind, Catalog, PolicyEffects};
use std::collections::BTreeMap;

pub mod loans;

pub use loans::{
    loan_offer, process_loan_payments, take_loan, LoanError, LoanOffer, PaymentReport,
};

/// Share of positive revenue lost every month to running costs.
const RUNNING_COST_SHARE: f64 = 0.2;

/// Income statement of one game month, in whole currency units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyIncome {
    pub revenue: Decimal,
    pub expenses: Decimal,
    /// Running costs, charged only when revenue is positive.
    pub monthly_cost: Decimal,
    pub net: Decimal,
}

impl MonthlyIncome {
    /// Change to the treasury at month end: the net result when there was
    /// revenue, the asset decay of `money` otherwise.
    pub fn month_end_delta(&self, money: Decimal) -> Decimal {
        if self.revenue > Decimal::ZERO {
            self.net
        } else {
            -asset_decay(money)
        }
    }
}

fn whole(x: f64) -> Decimal {
    Decimal::from_f64(round_half_up(x)).unwrap_or_default()
}

/// Upkeep of the given building counts before any policy applies.
pub fn base_maintenance(catalog: &Catalog, counts: &BTreeMap<BuildingKind, u32>) -> f64 {
    counts
        .iter()
        .map(|(kind, n)| catalog.maintenance_for(*kind) * f64::from(*n))
        .sum()
}

/// Compute the monthly income statement.
///
/// Revenue is `citizens * baseTax * (tax / 10) * taxMultiplier`, scaled up by
/// happiness. Upkeep is scaled by the maintenance multiplier; the police part
/// is then re-priced by the police multiplier on top of it.
pub fn monthly_income(
    catalog: &Catalog,
    citizens: u32,
    tax_rate: f64,
    effects: &PolicyEffects,
    happiness: u8,
    counts: &BTreeMap<BuildingKind, u32>,
) -> MonthlyIncome {
    let econ = &catalog.economy;
    let happiness_bonus = 1.0 + f64::from(happiness) / 100.0 * econ.happiness_income_bonus;
    let revenue = f64::from(citizens)
        * econ.base_tax_per_citizen
        * (tax_rate / 10.0)
        * effects.tax_multiplier
        * happiness_bonus;

    let mut expenses = base_maintenance(catalog, counts) * effects.maintenance_multiplier;
    let police_count = counts.get(&BuildingKind::Police).copied().unwrap_or(0);
    if police_count > 0 {
        let police = catalog.maintenance_for(BuildingKind::Police) * f64::from(police_count);
        expenses += police * (effects.maintenance_police_multiplier - 1.0);
    }

    let monthly_cost = if revenue > 0.0 {
        revenue * RUNNING_COST_SHARE
    } else {
        0.0
    };
    let net = revenue - expenses - monthly_cost;

    MonthlyIncome {
        revenue: whole(revenue),
        expenses: whole(expenses),
        monthly_cost: whole(monthly_cost),
        net: whole(net),
    }
}

/// Two percent of the balance, rounded down. A negative balance gives a
/// negative decay, which shrinks the debt when debited.
pub fn asset_decay(money: Decimal) -> Decimal {
    (money * Decimal::new(2, 2)).floor()
}
