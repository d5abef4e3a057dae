#![deny(warnings)]

//! Upgrade a save file to the current snapshot format.
//!
//! Usage: `migrate <in> [out] [--config DIR]`. Without `out` the file is
//! rewritten in place.

use anyhow::{bail, Context, Result};
use persistence::{load_from_path, save_to_path, Snapshot, FORMAT_VERSION};
use sim_core::Catalog;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct Args {
    input: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => config = it.next().map(PathBuf::from),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let mut positional = positional.into_iter();
    let Some(input) = positional.next() else {
        bail!("usage: migrate <in> [out] [--config DIR]");
    };
    Ok(Args {
        input,
        output: positional.next(),
        config,
    })
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args()?;
    let catalog = match &args.config {
        Some(dir) => Catalog::load_dir(dir)?,
        None => Catalog::builtin()?,
    };

    let snapshot = load_from_path(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let from_version = snapshot.version;
    // Restoring assigns instance ids to legacy cells; capturing writes them out.
    let (state, grid) = snapshot.restore(&catalog)?;
    let upgraded = Snapshot::capture(&state, &grid);

    let out = args.output.unwrap_or_else(|| args.input.clone());
    save_to_path(&out, &upgraded).with_context(|| format!("writing {}", out.display()))?;
    info!(
        from = from_version,
        to = FORMAT_VERSION,
        buildings = grid.instance_count(),
        path = %out.display(),
        "save migrated"
    );
    println!("Migrated {} -> {} (format {})", args.input.display(), out.display(), FORMAT_VERSION);
    Ok(())
}
