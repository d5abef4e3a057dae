//! The game facade: owns state, grid and clock and exposes every player command.

use crate::clock::{SimClock, SpeedLevel};
use crate::{CommandError, GAME_OVER_BALANCE};
use chrono::NaiveDate;
use persistence::{load_from_path, save_to_path, Snapshot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;
use sim_core::state::add_days;
use sim_core::{BuildingKind, Catalog, GameState, LoanId, Orientation, PolicyEffects, PolicyId};
use sim_econ::{
    asset_decay, loan_offer, monthly_income, process_loan_payments, take_loan, LoanOffer,
    MonthlyIncome, PaymentReport,
};
use sim_social::{city_stats, happiness, CityStats, HappinessBreakdown};
use sim_world::{Grid, InstanceId, PlacementError, Pos};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Seeds drawn for new games fall in `[0, MAX_RANDOM_SEED)`.
const MAX_RANDOM_SEED: u64 = 1_000_000;

/// Result of the monthly recompute pass.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthReport {
    pub stats: CityStats,
    pub happiness: HappinessBreakdown,
    pub income: MonthlyIncome,
    /// Change applied to the treasury.
    pub money_delta: Decimal,
}

/// What one clock tick did.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub date: NaiveDate,
    pub loans: PaymentReport,
    pub month: Option<MonthReport>,
}

/// A running game. All mutation goes through `&mut self`, so a placement can
/// never interleave with a recompute pass.
#[derive(Clone, Debug)]
pub struct Game {
    catalog: Arc<Catalog>,
    state: GameState,
    grid: Grid,
    clock: SimClock,
    selected: Option<Pos>,
    game_over: bool,
    stats: CityStats,
    happiness: HappinessBreakdown,
    last_income: Option<MonthlyIncome>,
}

fn random_seed() -> u64 {
    ChaCha8Rng::from_entropy().gen_range(0..MAX_RANDOM_SEED)
}

impl Game {
    /// Start a new game. Without a seed one is drawn at random.
    pub fn new_game(catalog: Arc<Catalog>, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(random_seed);
        let state = GameState::new(&catalog, seed);
        let grid = Grid::new_game(&catalog, seed);
        info!(seed, grid_size = grid.size(), money = %state.money, "new game");
        Self::assemble(catalog, state, grid)
    }

    fn assemble(catalog: Arc<Catalog>, state: GameState, grid: Grid) -> Self {
        let effects = PolicyEffects::resolve(&catalog, &state.active_policies);
        let stats = city_stats(&grid, &catalog, &effects);
        let mood = happiness(&grid, &catalog, &effects, stats.crime);
        let mut game = Game {
            catalog,
            state,
            grid,
            clock: SimClock::default(),
            selected: None,
            game_over: false,
            stats,
            happiness: mood,
            last_income: None,
        };
        game.check_game_over();
        game
    }

    /// Throw the current game away and start over.
    pub fn reset(&mut self, seed: Option<u64>) {
        *self = Game::new_game(Arc::clone(&self.catalog), seed);
    }

    pub fn from_snapshot(catalog: Arc<Catalog>, snapshot: Snapshot) -> Result<Self, CommandError> {
        let (state, grid) = snapshot.restore(&catalog)?;
        info!(date = %state.game_date, money = %state.money, "game restored");
        Ok(Self::assemble(catalog, state, grid))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state, &self.grid)
    }

    pub fn load(catalog: Arc<Catalog>, path: &Path) -> Result<Self, CommandError> {
        Self::from_snapshot(catalog, load_from_path(path)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), CommandError> {
        Ok(save_to_path(path, &self.snapshot())?)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn money(&self) -> Decimal {
        self.state.money
    }

    pub fn date(&self) -> NaiveDate {
        self.state.game_date
    }

    /// Anchor of the selected building, if any.
    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Statistics as of the last monthly pass (or game start).
    pub fn stats(&self) -> &CityStats {
        &self.stats
    }

    pub fn happiness(&self) -> &HappinessBreakdown {
        &self.happiness
    }

    pub fn last_income(&self) -> Option<&MonthlyIncome> {
        self.last_income.as_ref()
    }

    pub fn effects(&self) -> PolicyEffects {
        PolicyEffects::resolve(&self.catalog, &self.state.active_policies)
    }

    fn ensure_running(&self) -> Result<(), CommandError> {
        if self.game_over {
            Err(CommandError::GameOver)
        } else {
            Ok(())
        }
    }

    fn ensure_funds(&self, needed: Decimal) -> Result<(), CommandError> {
        if self.state.money < needed {
            return Err(CommandError::InsufficientFunds {
                needed,
                available: self.state.money,
            });
        }
        Ok(())
    }

    fn check_game_over(&mut self) {
        if !self.game_over && self.state.money <= GAME_OVER_BALANCE {
            self.game_over = true;
            self.clock.pause();
            warn!(money = %self.state.money, date = %self.state.game_date, "game over");
        }
    }

    /// Buy and place a building with its anchor at (x, y).
    pub fn place(
        &mut self,
        x: u32,
        y: u32,
        kind: BuildingKind,
        orientation: Orientation,
    ) -> Result<InstanceId, CommandError> {
        self.ensure_running()?;
        let cost = self.catalog.building(kind)?.cost;
        self.ensure_funds(cost)?;
        let id = self
            .grid
            .place(&self.catalog, Pos::new(x, y), kind, orientation)?;
        self.state.money -= cost;
        self.check_game_over();
        Ok(id)
    }

    /// Demolish the building covering (x, y) and credit the refund.
    ///
    /// Returns the refund, or `None` when the cell holds no building.
    pub fn remove(&mut self, x: u32, y: u32) -> Result<Option<Decimal>, CommandError> {
        self.ensure_running()?;
        let Some(removed) = self.grid.remove(&self.catalog, Pos::new(x, y))? else {
            return Ok(None);
        };
        self.state.money += removed.refund;
        if self.selected == Some(removed.instance.anchor) {
            self.selected = None;
        }
        Ok(Some(removed.refund))
    }

    /// Move the building covering `from` so its anchor lands on `to`, and select it there.
    pub fn move_building(&mut self, from: (u32, u32), to: (u32, u32)) -> Result<Pos, CommandError> {
        self.ensure_running()?;
        let anchor = self.grid.move_building(
            &self.catalog,
            Pos::new(from.0, from.1),
            Pos::new(to.0, to.1),
        )?;
        self.selected = Some(anchor);
        Ok(anchor)
    }

    /// Select the building covering (x, y); selecting an empty cell clears the selection.
    pub fn select(&mut self, x: u32, y: u32) -> Option<Pos> {
        self.selected = self.grid.anchor_of(Pos::new(x, y));
        self.selected
    }

    /// Pay to clear a tree or rock. Returns what it cost.
    pub fn remove_decoration(&mut self, x: u32, y: u32) -> Result<Decimal, CommandError> {
        self.ensure_running()?;
        let at = Pos::new(x, y);
        let kind = self
            .grid
            .decoration_at(at)
            .ok_or(PlacementError::NoDecoration(at))?;
        let cost = self.catalog.decoration(kind)?.destruction_cost;
        self.ensure_funds(cost)?;
        self.grid.remove_decoration(at)?;
        self.state.money -= cost;
        self.check_game_over();
        Ok(cost)
    }

    /// Set the tax rate, clamped to the configured bounds. Returns the rate applied.
    pub fn set_tax(&mut self, rate: f64) -> Result<f64, CommandError> {
        self.ensure_running()?;
        self.state.current_tax = self.catalog.economy.clamp_tax(rate);
        debug!(tax = self.state.current_tax, "tax rate set");
        Ok(self.state.current_tax)
    }

    /// Enable or disable a policy. Returns whether it is now active.
    pub fn toggle_policy(&mut self, id: &PolicyId) -> Result<bool, CommandError> {
        self.ensure_running()?;
        self.catalog.policy(id)?;
        let active = if self.state.active_policies.remove(id) {
            false
        } else {
            self.state.active_policies.insert(id.clone());
            true
        };
        info!(policy = %id, active, "policy toggled");
        Ok(active)
    }

    pub fn loan_offer(&self, id: &LoanId) -> Result<LoanOffer, CommandError> {
        Ok(loan_offer(&self.catalog, &self.state, id)?)
    }

    pub fn take_loan(&mut self, id: &LoanId) -> Result<LoanOffer, CommandError> {
        self.ensure_running()?;
        Ok(take_loan(&self.catalog, &mut self.state, id)?)
    }

    fn check_admin_code(&self, code: &str) -> Result<(), CommandError> {
        self.ensure_running()?;
        let expected = &self.catalog.game.admin_code;
        if expected.is_empty() || code != expected {
            return Err(CommandError::InvalidAdminCode);
        }
        Ok(())
    }

    /// Apply a money adjustment when `code` matches the configured admin code.
    pub fn admin_adjust_money(&mut self, code: &str, delta: Decimal) -> Result<Decimal, CommandError> {
        self.check_admin_code(code)?;
        self.state.money += delta;
        info!(%delta, money = %self.state.money, "admin money adjustment");
        self.check_game_over();
        Ok(self.state.money)
    }

    /// Add (or with a negative count, remove) citizens; the population never
    /// drops below zero. The next monthly pass recomputes it from the grid.
    pub fn admin_add_citizens(&mut self, code: &str, count: i64) -> Result<u32, CommandError> {
        self.check_admin_code(code)?;
        let citizens = i64::from(self.state.citizens)
            .saturating_add(count)
            .clamp(0, i64::from(u32::MAX));
        self.state.citizens = u32::try_from(citizens).unwrap_or(u32::MAX);
        info!(count, citizens = self.state.citizens, "admin citizen adjustment");
        Ok(self.state.citizens)
    }

    /// Overwrite happiness, clamped to [0, 100], until the next monthly pass.
    pub fn admin_set_happiness(&mut self, code: &str, value: i32) -> Result<u8, CommandError> {
        self.check_admin_code(code)?;
        self.state.happiness = u8::try_from(value.clamp(0, 100)).unwrap_or(100);
        info!(happiness = self.state.happiness, "admin happiness override");
        Ok(self.state.happiness)
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    /// Resume the clock. A finished game stays paused.
    pub fn resume(&mut self) -> Result<(), CommandError> {
        self.ensure_running()?;
        self.clock.resume();
        Ok(())
    }

    pub fn set_speed(&mut self, level: u8) -> Result<SpeedLevel, CommandError> {
        let speed = SpeedLevel::new(level).ok_or(CommandError::InvalidSpeed(level))?;
        self.clock.set_speed(speed);
        Ok(speed)
    }

    /// Income statement the next monthly pass would produce with the current
    /// population, mood and buildings. Nothing is applied.
    pub fn projected_income(&self) -> MonthlyIncome {
        monthly_income(
            &self.catalog,
            self.state.citizens,
            self.state.current_tax,
            &self.effects(),
            self.state.happiness,
            &self.grid.instance_counts(),
        )
    }

    /// What a month without revenue would take from the treasury.
    pub fn asset_decay_preview(&self) -> Decimal {
        asset_decay(self.state.money)
    }

    /// Feed elapsed real time; runs every tick that became due. Returns the
    /// number of ticks run.
    pub fn advance(&mut self, real: Duration) -> u32 {
        let due = self.clock.advance(real);
        let mut ran = 0;
        for _ in 0..due {
            if self.tick().is_none() {
                break;
            }
            ran += 1;
        }
        ran
    }

    /// One game day: move the date, collect loan installments and run the
    /// monthly pass when the month timer fills up. Does nothing while paused
    /// or after game over.
    pub fn tick(&mut self) -> Option<TickReport> {
        if self.game_over || self.clock.is_paused() {
            return None;
        }
        self.state.game_date = add_days(self.state.game_date, 1);
        let loans = process_loan_payments(&self.catalog, &mut self.state);
        self.check_game_over();

        let month_due = self
            .clock
            .on_tick(self.catalog.economy.month_duration_seconds);
        let month = if month_due && !self.game_over {
            Some(self.run_monthly_pass())
        } else {
            None
        };
        Some(TickReport {
            date: self.state.game_date,
            loans,
            month,
        })
    }

    /// Recompute population, mood and the budget, then settle the month.
    pub fn run_monthly_pass(&mut self) -> MonthReport {
        let effects = self.effects();
        let stats = city_stats(&self.grid, &self.catalog, &effects);
        let mood = happiness(&self.grid, &self.catalog, &effects, stats.crime);
        self.state.citizens = stats.total_citizens;
        self.state.happiness = mood.total;

        let income = monthly_income(
            &self.catalog,
            self.state.citizens,
            self.state.current_tax,
            &effects,
            self.state.happiness,
            &self.grid.instance_counts(),
        );
        let money_delta = income.month_end_delta(self.state.money);
        self.state.money += money_delta;
        info!(
            date = %self.state.game_date,
            citizens = stats.total_citizens,
            happiness = mood.total,
            revenue = %income.revenue,
            net = %income.net,
            money = %self.state.money,
            "month closed"
        );

        self.stats = stats.clone();
        self.happiness = mood;
        self.last_income = Some(income);
        self.check_game_over();
        MonthReport {
            stats,
            happiness: mood,
            income,
            money_delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new_game(Arc::new(Catalog::builtin().unwrap()), Some(42))
    }

    #[test]
    fn new_game_uses_configured_start() {
        let g = game();
        assert_eq!(g.money(), Decimal::new(1000, 0));
        assert_eq!(g.date(), sim_core::DEFAULT_START_DATE);
        assert_eq!(g.state().seed, 42);
        assert!(g.grid().decoration_count() > 0);
        assert!(!g.is_game_over());
    }

    #[test]
    fn random_seed_in_range() {
        let g = Game::new_game(Arc::new(Catalog::builtin().unwrap()), None);
        assert!(g.state().seed < MAX_RANDOM_SEED);
    }

    #[test]
    fn placement_debits_cost() {
        let mut g = game();
        g.place(0, 0, BuildingKind::House, Orientation::NORTH).unwrap();
        assert_eq!(g.money(), Decimal::new(800, 0));
        let err = g
            .place(0, 0, BuildingKind::Road, Orientation::NORTH)
            .unwrap_err();
        assert!(matches!(err, CommandError::Placement(PlacementError::Occupied(_))));
        assert_eq!(g.money(), Decimal::new(800, 0));
    }

    #[test]
    fn placement_needs_funds() {
        let mut g = game();
        let err = g
            .place(0, 0, BuildingKind::Monument, Orientation::NORTH)
            .unwrap_err();
        assert!(matches!(err, CommandError::InsufficientFunds { .. }));
        assert_eq!(g.grid().instance_count(), 0);
    }

    #[test]
    fn selection_follows_moves_and_removal() {
        let mut g = game();
        g.place(0, 0, BuildingKind::Apartment, Orientation::NORTH).unwrap();
        assert_eq!(g.select(1, 1), Some(Pos::new(0, 0)));
        g.move_building((1, 0), (0, 1)).unwrap();
        assert_eq!(g.selected(), Some(Pos::new(0, 1)));
        g.remove(0, 2).unwrap();
        assert_eq!(g.selected(), None);
        assert_eq!(g.select(5, 49), None);
    }

    #[test]
    fn toggling_unknown_policy_fails() {
        let mut g = game();
        assert!(g.toggle_policy(&PolicyId::from("martial_law")).is_err());
        assert!(g.toggle_policy(&PolicyId::from("austerity")).unwrap());
        assert!(!g.toggle_policy(&PolicyId::from("austerity")).unwrap());
    }

    #[test]
    fn admin_code_checked() {
        let mut g = game();
        assert!(matches!(
            g.admin_adjust_money("guess", Decimal::new(5, 0)),
            Err(CommandError::InvalidAdminCode)
        ));
        let money = g.admin_adjust_money("citybuilder", Decimal::new(250, 0)).unwrap();
        assert_eq!(money, Decimal::new(1250, 0));
    }

    #[test]
    fn admin_population_and_mood_overrides() {
        let mut g = game();
        assert!(matches!(
            g.admin_add_citizens("guess", 10),
            Err(CommandError::InvalidAdminCode)
        ));
        assert_eq!(g.admin_add_citizens("citybuilder", 25).unwrap(), 25);
        assert_eq!(g.admin_add_citizens("citybuilder", -100).unwrap(), 0);
        assert_eq!(g.admin_set_happiness("citybuilder", 140).unwrap(), 100);
        assert_eq!(g.admin_set_happiness("citybuilder", -3).unwrap(), 0);
        assert_eq!(g.state().happiness, 0);
        assert!(matches!(
            g.admin_set_happiness("nope", 50),
            Err(CommandError::InvalidAdminCode)
        ));
    }

    #[test]
    fn tax_clamped() {
        let mut g = game();
        assert_eq!(g.set_tax(99.0).unwrap(), 20.0);
        assert_eq!(g.set_tax(-1.0).unwrap(), 0.0);
    }

    #[test]
    fn invalid_speed_rejected() {
        let mut g = game();
        assert!(matches!(g.set_speed(0), Err(CommandError::InvalidSpeed(0))));
        assert_eq!(g.set_speed(5).unwrap(), SpeedLevel::FASTEST);
    }

    #[test]
    fn double_speed_half_second_is_one_day() {
        let mut g = game();
        g.set_speed(4).unwrap();
        assert_eq!(g.advance(Duration::from_millis(500)), 1);
        assert_eq!(g.date(), add_days(sim_core::DEFAULT_START_DATE, 1));
    }

    #[test]
    fn paused_game_does_not_tick() {
        let mut g = game();
        g.pause();
        assert!(g.tick().is_none());
        assert_eq!(g.advance(Duration::from_secs(5)), 0);
        assert_eq!(g.date(), sim_core::DEFAULT_START_DATE);
        g.resume().unwrap();
        assert!(g.tick().is_some());
    }

    #[test]
    fn removal_refunds_half_the_cost() {
        let mut g = game();
        g.place(0, 0, BuildingKind::House, Orientation::NORTH).unwrap();
        g.admin_adjust_money("citybuilder", Decimal::new(-700, 0)).unwrap();
        assert_eq!(g.money(), Decimal::new(100, 0));
        assert_eq!(g.remove(0, 0).unwrap(), Some(Decimal::new(100, 0)));
        assert_eq!(g.money(), Decimal::new(200, 0));
        assert_eq!(g.remove(0, 0).unwrap(), None);
    }

    #[test]
    fn monthly_pass_updates_population_and_treasury() {
        let mut g = game();
        g.place(0, 0, BuildingKind::House, Orientation::NORTH).unwrap();
        let before = g.money();
        let report = g.run_monthly_pass();
        assert_eq!(g.state().citizens, 4);
        assert_eq!(report.stats.total_citizens, 4);
        assert_eq!(g.state().happiness, report.happiness.total);
        assert!(report.income.revenue > Decimal::ZERO);
        assert_eq!(report.money_delta, report.income.net);
        assert_eq!(g.money(), before + report.income.net);
        assert_eq!(g.last_income(), Some(&report.income));
    }

    #[test]
    fn month_closes_after_thirty_days_at_normal_speed() {
        let mut g = game();
        let months: Vec<bool> = (0..30)
            .map(|_| g.tick().unwrap().month.is_some())
            .collect();
        assert!(months[..29].iter().all(|m| !m));
        assert!(months[29]);
    }

    #[test]
    fn projection_matches_the_next_month() {
        let mut g = game();
        g.place(0, 0, BuildingKind::House, Orientation::NORTH).unwrap();
        g.run_monthly_pass();
        let money = g.money();
        let projected = g.projected_income();
        assert_eq!(g.money(), money);
        assert_eq!(g.run_monthly_pass().income, projected);
    }

    #[test]
    fn empty_city_decays() {
        let mut g = game();
        assert_eq!(g.asset_decay_preview(), Decimal::new(20, 0));
        let report = g.run_monthly_pass();
        assert_eq!(report.money_delta, Decimal::new(-20, 0));
        assert_eq!(g.money(), Decimal::new(980, 0));
    }

    #[test]
    fn empty_city_in_debt_recovers_two_percent() {
        let mut g = game();
        g.admin_adjust_money("citybuilder", Decimal::new(-1500, 0)).unwrap();
        assert_eq!(g.asset_decay_preview(), Decimal::new(-10, 0));
        let report = g.run_monthly_pass();
        assert_eq!(report.income.revenue, Decimal::ZERO);
        assert_eq!(report.money_delta, Decimal::new(10, 0));
        assert_eq!(g.money(), Decimal::new(-490, 0));
    }

    #[test]
    fn game_over_blocks_commands_and_ticks() {
        let mut g = game();
        g.admin_adjust_money("citybuilder", Decimal::new(-2000, 0)).unwrap();
        assert!(g.is_game_over());
        assert!(g.clock().is_paused());
        assert!(matches!(
            g.place(0, 0, BuildingKind::Road, Orientation::NORTH),
            Err(CommandError::GameOver)
        ));
        assert!(matches!(g.resume(), Err(CommandError::GameOver)));
        assert!(g.tick().is_none());
        g.reset(Some(1));
        assert!(!g.is_game_over());
    }

    #[test]
    fn loan_repaid_through_daily_ticks() {
        let mut catalog = Catalog::builtin().unwrap();
        // Keep month-end decay out of the balance.
        catalog.economy.month_duration_seconds = 1e9;
        let mut g = Game::new_game(Arc::new(catalog), Some(42));
        let offer = g.take_loan(&LoanId::from("loan_100")).unwrap();
        assert_eq!(offer.interest_rate, 0.0);
        assert_eq!(offer.total_to_repay, Decimal::new(100, 0));
        assert_eq!(g.money(), Decimal::new(1100, 0));

        let mut paid = Decimal::ZERO;
        for day in 1..=90 {
            let report = g.tick().unwrap();
            paid += report.loans.paid;
            if day == 30 {
                assert_eq!(g.state().active_loans[0].months_paid, 1);
            }
        }
        let tolerance = Decimal::new(1, 6);
        assert!((paid - offer.total_to_repay).abs() < tolerance);
        assert!((g.money() - Decimal::new(1000, 0)).abs() < tolerance);
        assert!(g.state().active_loans.is_empty());
        assert_eq!(g.state().archived_loans.len(), 1);
    }

    #[test]
    fn clearing_scenery_costs_money() {
        let mut g = game();
        let at = g
            .grid()
            .cells()
            .find(|c| c.decorative_object == Some(sim_core::DecorKind::Rock))
            .map(|c| c.pos())
            .unwrap();
        assert_eq!(g.remove_decoration(at.x, at.y).unwrap(), Decimal::new(50, 0));
        assert_eq!(g.money(), Decimal::new(950, 0));
        assert!(g.grid().decoration_at(at).is_none());
        assert!(matches!(
            g.remove_decoration(at.x, at.y),
            Err(CommandError::Placement(PlacementError::NoDecoration(_)))
        ));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("city_sim_runtime_save");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("slot.json");
        let mut g = game();
        g.place(0, 0, BuildingKind::Apartment, Orientation::NORTH).unwrap();
        g.take_loan(&LoanId::from("loan_500")).unwrap();
        g.save(&path).unwrap();
        let loaded = Game::load(Arc::new(Catalog::builtin().unwrap()), &path).unwrap();
        assert_eq!(loaded.state(), g.state());
        assert_eq!(loaded.grid(), g.grid());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn loading_a_bankrupt_save_ends_the_game() {
        let g = game();
        let mut snap = g.snapshot();
        snap.game_state.money = Decimal::new(-1500, 0);
        let loaded = Game::from_snapshot(Arc::new(Catalog::builtin().unwrap()), snap).unwrap();
        assert!(loaded.is_game_over());
    }
}
