#![deny(warnings)]

//! Simulation runtime: the game facade and its clock.
//!
//! [`Game`] owns the persisted state, the grid and the clock. Player commands
//! and clock ticks are methods taking `&mut self`, which serializes every
//! mutation. Each tick advances the date by one day and collects loan
//! installments; once a month of real time has accumulated the monthly pass
//! recomputes statistics, happiness and the budget.

use rust_decimal::Decimal;
use thiserror::Error;

pub mod clock;
pub mod game;

pub use clock::{SimClock, SpeedLevel};
pub use game::{Game, MonthReport, TickReport};

/// Treasury balance at or below which the game ends.
pub const GAME_OVER_BALANCE: Decimal = Decimal::from_parts(1000, 0, 0, true, 0);

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("the game is over")]
    GameOver,
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },
    #[error("invalid admin code")]
    InvalidAdminCode,
    #[error("speed level {0} is out of range [1, 5]")]
    InvalidSpeed(u8),
    #[error(transparent)]
    Placement(#[from] sim_world::PlacementError),
    #[error(transparent)]
    Loan(#[from] sim_econ::LoanError),
    #[error(transparent)]
    Config(#[from] sim_core::ConfigError),
    #[error(transparent)]
    Persistence(#[from] persistence::PersistenceError),
}
