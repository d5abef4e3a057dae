//! Persisted game state: treasury, citizens, policies, loans and the virtual date.

use crate::{Catalog, LoanId, PolicyId};
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One game month lasts this many virtual days.
pub const DAYS_PER_MONTH: u32 = 30;

/// Date a new game starts on, also used to backfill snapshots without a date.
pub const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2020, 1, 1) {
    Some(d) => d,
    None => panic!("invalid start date"),
};

/// Add whole days, saturating at the last representable date.
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX)
}

/// Dates are stored as ISO strings; older saves stored epoch milliseconds.
mod flexible_date {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DateRepr {
        Date(NaiveDate),
        Millis(i64),
    }

    fn resolve(repr: DateRepr) -> Option<NaiveDate> {
        match repr {
            DateRepr::Date(d) => Some(d),
            DateRepr::Millis(ms) => {
                DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.date_naive())
            }
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let repr = Option::<DateRepr>::deserialize(d)?;
        Ok(repr.and_then(resolve).unwrap_or(DEFAULT_START_DATE))
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let repr = Option::<DateRepr>::deserialize(d)?;
        Ok(repr.and_then(resolve))
    }
}

/// A live amortizing debt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ActiveLoanRepr")]
pub struct ActiveLoan {
    pub loan_id: LoanId,
    pub amount: Decimal,
    pub total_to_repay: Decimal,
    pub monthly_payment: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub months_remaining: u32,
    pub months_paid: u32,
    pub last_payment_date: NaiveDate,
    /// Interest applied at issuance, in percent. Absent in older saves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActiveLoanRepr {
    loan_id: LoanId,
    amount: Decimal,
    total_to_repay: Decimal,
    monthly_payment: Decimal,
    #[serde(
        default = "default_game_date",
        deserialize_with = "flexible_date::deserialize"
    )]
    start_date: NaiveDate,
    #[serde(default, deserialize_with = "flexible_date::deserialize_opt")]
    end_date: Option<NaiveDate>,
    months_remaining: i64,
    #[serde(default)]
    months_paid: u32,
    #[serde(default, deserialize_with = "flexible_date::deserialize_opt")]
    last_payment_date: Option<NaiveDate>,
    #[serde(default)]
    interest_rate: Option<f64>,
}

impl From<ActiveLoanRepr> for ActiveLoan {
    fn from(r: ActiveLoanRepr) -> Self {
        let months_remaining = u32::try_from(r.months_remaining.max(0)).unwrap_or(u32::MAX);
        let end_date = r.end_date.unwrap_or_else(|| {
            let months = u64::from(r.months_paid) + u64::from(months_remaining);
            add_days(r.start_date, months * u64::from(DAYS_PER_MONTH))
        });
        ActiveLoan {
            loan_id: r.loan_id,
            amount: r.amount,
            total_to_repay: r.total_to_repay,
            monthly_payment: r.monthly_payment,
            start_date: r.start_date,
            end_date,
            months_remaining,
            months_paid: r.months_paid,
            // Loans saved before payment tracking existed restart from their start date.
            last_payment_date: r.last_payment_date.unwrap_or(r.start_date),
            interest_rate: r.interest_rate,
        }
    }
}

impl ActiveLoan {
    /// Days until the scheduled end date, never negative.
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days().max(0)
    }

    /// What is still owed under the schedule.
    pub fn remaining_balance(&self) -> Decimal {
        self.monthly_payment * Decimal::from(self.months_remaining)
    }

    pub fn is_settled(&self) -> bool {
        self.months_remaining == 0
    }
}

/// Terminal record of a fully repaid loan. Never mutated once written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedLoan {
    pub loan_id: LoanId,
    pub amount: Decimal,
    pub total_to_repay: Decimal,
    pub monthly_payment: Decimal,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub end_date: NaiveDate,
    #[serde(deserialize_with = "flexible_date::deserialize")]
    pub completion_date: NaiveDate,
    pub interest_rate: f64,
}

fn default_happiness() -> u8 {
    50
}

fn default_tax() -> f64 {
    10.0
}

/// Everything about a running game except the grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub money: Decimal,
    #[serde(default)]
    pub citizens: u32,
    /// Score in [0, 100].
    #[serde(default = "default_happiness")]
    pub happiness: u8,
    /// Tax rate, kept within the economy's [taxMin, taxMax].
    #[serde(default = "default_tax")]
    pub current_tax: f64,
    #[serde(default)]
    pub active_policies: BTreeSet<PolicyId>,
    #[serde(default)]
    pub active_loans: Vec<ActiveLoan>,
    #[serde(default)]
    pub archived_loans: Vec<ArchivedLoan>,
    /// Draw count per loan product.
    #[serde(default)]
    pub loan_counts_by_type: BTreeMap<LoanId, u32>,
    #[serde(
        default = "default_game_date",
        deserialize_with = "flexible_date::deserialize"
    )]
    pub game_date: NaiveDate,
    /// Seed of the decorative scatter, fixed at game start.
    #[serde(default)]
    pub seed: u64,
}

fn default_game_date() -> NaiveDate {
    DEFAULT_START_DATE
}

impl GameState {
    /// Fresh state for a new game.
    pub fn new(catalog: &Catalog, seed: u64) -> Self {
        GameState {
            money: catalog.game.start_money,
            citizens: catalog.game.start_citizens,
            happiness: default_happiness(),
            current_tax: catalog.economy.clamp_tax(default_tax()),
            active_policies: BTreeSet::new(),
            active_loans: Vec::new(),
            archived_loans: Vec::new(),
            loan_counts_by_type: BTreeMap::new(),
            game_date: catalog.game.start_date,
            seed,
        }
    }

    pub fn draw_count(&self, id: &LoanId) -> u32 {
        self.loan_counts_by_type.get(id).copied().unwrap_or(0)
    }

    pub fn has_active_loan(&self, id: &LoanId) -> bool {
        self.active_loans.iter().any(|l| &l.loan_id == id)
    }

    /// Total still owed across active loans.
    pub fn outstanding_debt(&self) -> Decimal {
        self.active_loans
            .iter()
            .map(ActiveLoan::remaining_balance)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loan() -> ActiveLoan {
        ActiveLoan {
            loan_id: LoanId::from("loan_500"),
            amount: Decimal::new(500, 0),
            total_to_repay: Decimal::new(575, 0),
            monthly_payment: Decimal::new(9583, 2),
            start_date: DEFAULT_START_DATE,
            end_date: add_days(DEFAULT_START_DATE, 180),
            months_remaining: 6,
            months_paid: 0,
            last_payment_date: DEFAULT_START_DATE,
            interest_rate: Some(15.0),
        }
    }

    #[test]
    fn state_roundtrip_is_lossless() {
        let catalog = Catalog::builtin().unwrap();
        let mut state = GameState::new(&catalog, 1234);
        state.active_loans.push(loan());
        state.active_policies.insert(PolicyId::from("austerity"));
        state
            .loan_counts_by_type
            .insert(LoanId::from("loan_500"), 1);
        let s = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&s).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn missing_fields_are_backfilled() {
        let v = json!({ "money": "250", "citizens": 8, "seed": 7 });
        let state: GameState = serde_json::from_value(v).unwrap();
        assert!(state.active_loans.is_empty());
        assert!(state.archived_loans.is_empty());
        assert!(state.loan_counts_by_type.is_empty());
        assert_eq!(state.game_date, DEFAULT_START_DATE);
        assert_eq!(state.happiness, 50);
        assert_eq!(state.money, Decimal::new(250, 0));
    }

    #[test]
    fn legacy_loan_without_last_payment_uses_start() {
        let v = json!({
            "loanId": "loan_100",
            "amount": 100,
            "totalToRepay": 100,
            "monthlyPayment": "33.33",
            "startDate": 1577836800000i64,
            "endDate": 1585612800000i64,
            "monthsRemaining": 3,
            "monthsPaid": 0
        });
        let l: ActiveLoan = serde_json::from_value(v).unwrap();
        assert_eq!(l.last_payment_date, l.start_date);
        assert_eq!(l.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(l.interest_rate, None);
    }

    #[test]
    fn negative_months_remaining_clamped() {
        let v = json!({
            "loanId": "loan_100",
            "amount": 100,
            "totalToRepay": 100,
            "monthlyPayment": 50,
            "startDate": "2020-01-01",
            "monthsRemaining": -1,
            "monthsPaid": 2
        });
        let l: ActiveLoan = serde_json::from_value(v).unwrap();
        assert_eq!(l.months_remaining, 0);
        assert!(l.is_settled());
        assert_eq!(l.end_date, add_days(DEFAULT_START_DATE, 60));
    }

    #[test]
    fn days_remaining_never_negative() {
        let l = loan();
        assert_eq!(l.days_remaining(DEFAULT_START_DATE), 180);
        assert_eq!(l.days_remaining(add_days(DEFAULT_START_DATE, 400)), 0);
        assert_eq!(l.remaining_balance(), Decimal::new(57498, 2));
    }
}
