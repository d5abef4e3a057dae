//! Loan engine: issuance with escalating interest, day-based repayment and archiving.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sim_core::state::add_days;
use sim_core::{
    ActiveLoan, ArchivedLoan, Catalog, ConfigError, GameState, LoanConfig, LoanId, DAYS_PER_MONTH,
};
use thiserror::Error;
use tracing::{debug, info};

/// Starter product whose first draw is interest-free for a player who never borrowed.
pub const STARTER_LOAN: &str = "loan_100";

/// Interest added, in percentage points, per earlier draw of the same product.
const ESCALATION_PER_DRAW: f64 = 20.0;

/// Errors produced by the loan engine.
#[derive(Debug, Error)]
pub enum LoanError {
    #[error("loan {0} is already active")]
    AlreadyActive(LoanId),
    #[error("interest rate {0}% cannot be applied")]
    InvalidRate(f64),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Terms a new draw of a product would get right now.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOffer {
    pub loan_id: LoanId,
    pub amount: Decimal,
    pub duration_months: u32,
    /// Percent; may exceed 100 for repeat draws.
    pub interest_rate: f64,
    pub total_to_repay: Decimal,
    pub monthly_payment: Decimal,
}

/// What one call to [`process_loan_payments`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaymentReport {
    /// Total debited from the treasury.
    pub paid: Decimal,
    pub archived: Vec<LoanId>,
}

fn is_starter(id: &LoanId) -> bool {
    id.0 == STARTER_LOAN
}

/// Interest for a draw of `product` after `earlier_draws` earlier draws.
fn rate_for(product: &LoanConfig, earlier_draws: u32, never_borrowed: bool) -> f64 {
    if is_starter(&product.id) && earlier_draws == 0 && never_borrowed {
        0.0
    } else {
        product.interest_rate + f64::from(earlier_draws) * ESCALATION_PER_DRAW
    }
}

fn never_borrowed(state: &GameState) -> bool {
    state.loan_counts_by_type.values().all(|n| *n == 0) && state.active_loans.is_empty()
}

/// Preview the terms of drawing `id`. Fails only for unknown products.
pub fn loan_offer(catalog: &Catalog, state: &GameState, id: &LoanId) -> Result<LoanOffer, LoanError> {
    let product = catalog.loan(id)?;
    let rate = rate_for(product, state.draw_count(id), never_borrowed(state));
    let factor = Decimal::from_f64(rate / 100.0).ok_or(LoanError::InvalidRate(rate))?;
    let total_to_repay = product.amount * (Decimal::ONE + factor);
    let monthly_payment = total_to_repay / Decimal::from(product.duration_months.max(1));
    Ok(LoanOffer {
        loan_id: product.id.clone(),
        amount: product.amount,
        duration_months: product.duration_months,
        interest_rate: rate,
        total_to_repay,
        monthly_payment,
    })
}

/// Draw a loan: credit the principal and start its repayment schedule today.
///
/// Rejected while a loan of the same product is still active.
pub fn take_loan(catalog: &Catalog, state: &mut GameState, id: &LoanId) -> Result<LoanOffer, LoanError> {
    if state.has_active_loan(id) {
        return Err(LoanError::AlreadyActive(id.clone()));
    }
    let offer = loan_offer(catalog, state, id)?;
    let today = state.game_date;
    let end_date = add_days(
        today,
        u64::from(offer.duration_months) * u64::from(DAYS_PER_MONTH),
    );

    state.money += offer.amount;
    state.active_loans.push(ActiveLoan {
        loan_id: offer.loan_id.clone(),
        amount: offer.amount,
        total_to_repay: offer.total_to_repay,
        monthly_payment: offer.monthly_payment,
        start_date: today,
        end_date,
        months_remaining: offer.duration_months,
        months_paid: 0,
        last_payment_date: today,
        interest_rate: Some(offer.interest_rate),
    });
    *state.loan_counts_by_type.entry(id.clone()).or_insert(0) += 1;
    info!(
        loan = %id,
        amount = %offer.amount,
        rate = offer.interest_rate,
        "loan issued"
    );
    Ok(offer)
}

/// Whole game months between two dates; zero when `to` is not after `from`.
fn elapsed_months(from: NaiveDate, to: NaiveDate) -> u32 {
    let days = (to - from).num_days().max(0);
    u32::try_from(days / i64::from(DAYS_PER_MONTH)).unwrap_or(u32::MAX)
}

/// Rate to record when archiving. Saves written before the applied rate was
/// stored get it rebuilt from the draw count, taking this loan as the latest draw.
fn archived_rate(catalog: &Catalog, state: &GameState, loan: &ActiveLoan) -> f64 {
    if let Some(rate) = loan.interest_rate {
        return rate;
    }
    let earlier = state.draw_count(&loan.loan_id).max(1) - 1;
    if is_starter(&loan.loan_id) && earlier == 0 {
        return 0.0;
    }
    let base = catalog
        .loan(&loan.loan_id)
        .map_or(0.0, |p| p.interest_rate);
    base + f64::from(earlier) * ESCALATION_PER_DRAW
}

fn archive(catalog: &Catalog, state: &mut GameState, loan: ActiveLoan, report: &mut PaymentReport) {
    let interest_rate = archived_rate(catalog, state, &loan);
    info!(loan = %loan.loan_id, months_paid = loan.months_paid, "loan repaid");
    report.archived.push(loan.loan_id.clone());
    state.archived_loans.push(ArchivedLoan {
        loan_id: loan.loan_id,
        amount: loan.amount,
        total_to_repay: loan.total_to_repay,
        monthly_payment: loan.monthly_payment,
        start_date: loan.start_date,
        end_date: loan.end_date,
        completion_date: state.game_date,
        interest_rate,
    });
}

/// Collect every installment that fell due since each loan's last payment.
///
/// Called once per game day. Several overdue months are paid at once, never
/// more than the months remaining. Loans that reach zero months remaining are
/// moved to the archive.
pub fn process_loan_payments(catalog: &Catalog, state: &mut GameState) -> PaymentReport {
    let mut report = PaymentReport::default();
    let today = state.game_date;
    let loans = std::mem::take(&mut state.active_loans);

    for mut loan in loans {
        if loan.is_settled() {
            archive(catalog, state, loan, &mut report);
            continue;
        }
        let due = elapsed_months(loan.last_payment_date, today);
        if due == 0 {
            state.active_loans.push(loan);
            continue;
        }
        let months = due.min(loan.months_remaining);
        let payment = loan.monthly_payment * Decimal::from(months);
        state.money -= payment;
        report.paid += payment;
        loan.months_paid += months;
        loan.months_remaining -= months;
        loan.last_payment_date = add_days(
            loan.last_payment_date,
            u64::from(months) * u64::from(DAYS_PER_MONTH),
        );
        debug!(
            loan = %loan.loan_id,
            months,
            %payment,
            remaining = loan.months_remaining,
            "loan installment paid"
        );
        if loan.is_settled() {
            archive(catalog, state, loan, &mut report);
        } else {
            state.active_loans.push(loan);
        }
    }
    report
}
