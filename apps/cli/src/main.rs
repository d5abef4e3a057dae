#![deny(warnings)]

//! Headless CLI: start or load a city, apply scripted commands, run days and
//! print the resulting KPIs.

use anyhow::{anyhow, bail, Context, Result};
use sim_core::{BuildingKind, Catalog, LoanId, Orientation, PolicyId};
use sim_runtime::Game;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// `kind:x:y[:rotation]`
struct Placement {
    kind: BuildingKind,
    x: u32,
    y: u32,
    orientation: Orientation,
}

#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    days: u32,
    speed: Option<u8>,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
    tax: Option<f64>,
    policies: Vec<PolicyId>,
    loans: Vec<LoanId>,
    placements: Vec<Placement>,
}

fn parse_kind(s: &str) -> Result<BuildingKind> {
    BuildingKind::ALL
        .into_iter()
        .find(|k| k.as_str() == s)
        .ok_or_else(|| anyhow!("unknown building kind {s:?}"))
}

fn parse_placement(spec: &str) -> Result<Placement> {
    let parts: Vec<&str> = spec.split(':').collect();
    if !(3..=4).contains(&parts.len()) {
        bail!("placement {spec:?} is not kind:x:y[:rotation]");
    }
    let rotation = match parts.get(3) {
        Some(r) => r.parse().with_context(|| format!("rotation in {spec:?}"))?,
        None => 0,
    };
    Ok(Placement {
        kind: parse_kind(parts[0])?,
        x: parts[1].parse().with_context(|| format!("x in {spec:?}"))?,
        y: parts[2].parse().with_context(|| format!("y in {spec:?}"))?,
        orientation: Orientation::new(rotation)
            .ok_or_else(|| anyhow!("rotation {rotation} is not 0..=3"))?,
    })
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().ok_or_else(|| anyhow!("{arg} needs a value"));
        match arg.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--seed" => args.seed = Some(value()?.parse().context("--seed")?),
            "--days" => args.days = value()?.parse().context("--days")?,
            "--speed" => args.speed = Some(value()?.parse().context("--speed")?),
            "--load" => args.load = Some(PathBuf::from(value()?)),
            "--save" => args.save = Some(PathBuf::from(value()?)),
            "--tax" => args.tax = Some(value()?.parse().context("--tax")?),
            "--policy" => args.policies.push(PolicyId(value()?)),
            "--loan" => args.loans.push(LoanId(value()?)),
            "--place" => args.placements.push(parse_placement(&value()?)?),
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args()?;
    let catalog = Arc::new(match &args.config {
        Some(dir) => Catalog::load_dir(dir)?,
        None => Catalog::builtin()?,
    });

    let mut game = match &args.load {
        Some(path) => Game::load(catalog, path)?,
        None => Game::new_game(catalog, args.seed),
    };
    info!(seed = game.state().seed, days = args.days, "starting CLI");

    if let Some(level) = args.speed {
        game.set_speed(level)?;
    }
    if let Some(rate) = args.tax {
        game.set_tax(rate)?;
    }
    for id in &args.policies {
        game.toggle_policy(id)?;
    }
    for id in &args.loans {
        game.take_loan(id)?;
    }
    for p in &args.placements {
        if let Err(e) = game.place(p.x, p.y, p.kind, p.orientation) {
            warn!(kind = %p.kind, x = p.x, y = p.y, error = %e, "placement rejected");
        }
    }

    let mut months = 0;
    for _ in 0..args.days {
        match game.tick() {
            Some(report) => months += u32::from(report.month.is_some()),
            None => break,
        }
    }

    if let Some(path) = &args.save {
        game.save(path)?;
    }

    let stats = game.stats();
    let demands: Vec<String> = stats.demands.iter().map(ToString::to_string).collect();
    println!(
        "City OK | date: {} | buildings: {} | scenery: {}",
        game.date(),
        game.grid().instance_count(),
        game.grid().decoration_count()
    );
    println!(
        "KPI | months: {} | money: ${} | citizens: {} | happiness: {} | crime: {} | police: {}% | fire: {}% | debt: ${}{}",
        months,
        game.money(),
        game.state().citizens,
        game.state().happiness,
        stats.crime,
        stats.coverage.police,
        stats.coverage.fire,
        game.state().outstanding_debt(),
        if game.is_game_over() { " | GAME OVER" } else { "" }
    );
    if !demands.is_empty() {
        println!("Demands | {}", demands.join(", "));
    }
    Ok(())
}
