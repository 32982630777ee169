//! Headless tracing driver.
//!
//! Replays a recorded pointer log against an exercise template and prints
//! the outcome, standing in for the host UI during development:
//!
//! ```text
//! trace <asset-root> <unit> <sub-unit> <pointer-log.json> [group]
//! ```
//!
//! The pointer log is a JSON array of input events; `group` picks the
//! stroke profile from the style catalog (default "thin").

use std::{env, fs, path::PathBuf, process};

use anyhow::{bail, Context, Result};

use tracekit::{
    Database, ExerciseKey, InputEvent, RasterSurface, StyleCatalog, TemplateResolver, TraceEngine,
};

const GRID_WIDTH: u32 = 2000;
const GRID_HEIGHT: u32 = 1600;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 4 {
        bail!("usage: trace <asset-root> <unit> <sub-unit> <pointer-log.json> [group]");
    }

    let asset_root = PathBuf::from(&args[0]);
    let unit: u32 = args[1].parse().context("unit must be a number")?;
    let sub_unit: u32 = args[2].parse().context("sub-unit must be a number")?;
    let log_path = &args[3];
    let group = args.get(4).map(String::as_str).unwrap_or("thin");

    let events: Vec<InputEvent> = serde_json::from_str(
        &fs::read_to_string(log_path).with_context(|| format!("failed to read {log_path}"))?,
    )
    .context("pointer log must be a JSON array of input events")?;

    let catalog = StyleCatalog::from_file(&asset_root.join("styles.json"))?;
    let db = Database::new(asset_root.join("progress.sqlite"))?;
    let resolver = TemplateResolver::new(asset_root.clone());
    let mut engine = TraceEngine::new(
        db,
        resolver,
        RasterSurface::new(GRID_WIDTH, GRID_HEIGHT),
    );

    let key = ExerciseKey::new(unit, sub_unit);
    engine.enter(key, catalog.profile(group));
    for event in events {
        engine.handle_input(event);
    }

    let Some(snapshot) = engine.snapshot() else {
        bail!("no active session after replay");
    };
    println!(
        "{}: {} [{:.1}%, {}]",
        snapshot.key,
        snapshot.message,
        snapshot.percentage,
        if snapshot.passed { "pass" } else { "fail" }
    );

    let capture = format!("capture_{unit}_{sub_unit}.png");
    fs::write(&capture, engine.export_png()?)
        .with_context(|| format!("failed to write {capture}"))?;
    println!("saved {capture}");

    Ok(())
}
