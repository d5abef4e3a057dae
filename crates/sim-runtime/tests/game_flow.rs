use rust_decimal::Decimal;
use sim_core::{BuildingKind, Catalog, LoanId, Orientation, PolicyId};
use sim_runtime::{CommandError, Game};
use sim_social::Demand;
use std::sync::Arc;
use std::time::Duration;

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::builtin().unwrap())
}

/// Road along row 1 with houses above it.
fn small_town(g: &mut Game) {
    for x in 0..6 {
        g.place(x, 1, BuildingKind::Road, Orientation::NORTH).unwrap();
    }
    for x in 0..4 {
        g.place(x, 0, BuildingKind::House, Orientation::NORTH).unwrap();
    }
}

#[test]
fn a_year_of_play() {
    let mut g = Game::new_game(catalog(), Some(2024));
    small_town(&mut g);
    assert_eq!(g.money(), Decimal::new(1000 - 60 - 800, 0));
    g.take_loan(&LoanId::from("loan_500")).unwrap();
    g.place(4, 2, BuildingKind::Police, Orientation::NORTH).unwrap();
    g.toggle_policy(&PolicyId::from("neighborhood_watch")).unwrap();

    let mut months = 0;
    for _ in 0..360 {
        if g.tick().unwrap().month.is_some() {
            months += 1;
        }
    }
    assert_eq!(months, 12);
    assert_eq!(g.state().citizens, 16);
    assert_eq!(g.stats().coverage.police, 100);
    assert!(!g.stats().demands.contains(&Demand::PoliceCoverage));
    assert!(g.stats().demands.contains(&Demand::FireCoverage));
    assert!(g.state().active_loans.is_empty());
    assert_eq!(g.state().archived_loans.len(), 1);
    assert!(g.state().happiness <= 100);
}

#[test]
fn lone_house_has_no_coverage() {
    let mut g = Game::new_game(catalog(), Some(1));
    g.place(0, 0, BuildingKind::House, Orientation::NORTH).unwrap();
    g.run_monthly_pass();
    let stats = g.stats();
    assert_eq!(stats.total_citizens, 4);
    assert_eq!(stats.coverage.police, 0);
    assert_eq!(stats.coverage.fire, 0);
    assert!(stats.demands.contains(&Demand::PoliceCoverage));
}

#[test]
fn real_time_drives_the_calendar() {
    let mut g = Game::new_game(catalog(), Some(3));
    let start = g.date();
    g.set_speed(5).unwrap();
    assert_eq!(g.advance(Duration::from_secs(2)), 8);
    assert_eq!((g.date() - start).num_days(), 8);
    g.pause();
    assert_eq!(g.advance(Duration::from_secs(60)), 0);
    assert_eq!((g.date() - start).num_days(), 8);
}

#[test]
fn debt_spiral_ends_the_game() {
    let mut g = Game::new_game(catalog(), Some(9));
    g.admin_adjust_money("citybuilder", Decimal::new(-1990, 0)).unwrap();
    assert!(!g.is_game_over());
    assert!(matches!(
        g.place(0, 0, BuildingKind::Road, Orientation::NORTH),
        Err(CommandError::InsufficientFunds { .. })
    ));
    g.take_loan(&LoanId::from("loan_2000")).unwrap();
    g.admin_adjust_money("citybuilder", Decimal::new(-1900, 0)).unwrap();
    assert_eq!(g.money(), Decimal::new(-890, 0));

    let start = g.date();
    let mut days = 0;
    while g.tick().is_some() {
        days += 1;
        assert!(days <= 30);
    }
    // The first installment of 200 pushes the balance past the limit.
    assert_eq!(days, 30);
    assert_eq!((g.date() - start).num_days(), 30);
    assert!(g.is_game_over());
    assert!(g.clock().is_paused());
    assert!(g.tick().is_none());
    assert!(matches!(g.set_tax(5.0), Err(CommandError::GameOver)));
}

#[test]
fn saved_game_resumes_identically() {
    let dir = std::env::temp_dir().join("city_sim_game_flow_save");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join("slot.json");

    let mut g = Game::new_game(catalog(), Some(77));
    small_town(&mut g);
    g.take_loan(&LoanId::from("loan_100")).unwrap();
    for _ in 0..45 {
        g.tick().unwrap();
    }
    g.save(&path).unwrap();

    let mut resumed = Game::load(catalog(), &path).unwrap();
    assert_eq!(resumed.state(), g.state());
    assert_eq!(resumed.grid(), g.grid());

    // Loan installments follow the stored payment date, not the clock.
    for _ in 0..15 {
        g.tick().unwrap();
        resumed.tick().unwrap();
    }
    assert_eq!(resumed.state().active_loans, g.state().active_loans);
    let _ = std::fs::remove_dir_all(&dir);
}
