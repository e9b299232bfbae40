//! save-runner: headless save/load driver for Keepsake.
//!
//! Usage:
//!   save-runner --mode demo    --seed 12345 --data-dir ./data
//!   save-runner --mode save    --seed 12345 --save ./saves/slot1.json
//!   save-runner --mode load    --save ./saves/slot1.json
//!   save-runner --mode inspect --save ./saves/slot1.json

use anyhow::{bail, Result};
use keepsake_core::{
    config::{SaveConfig, WorldLayout},
    content::ItemCatalog,
    engine::{LoadReport, SaveEngine},
    error::SaveError,
    loot::LootTables,
    types::Vec3,
    world::{GameWorld, WorldSummary},
};
use std::env;

#[derive(serde::Serialize)]
struct RunOutput<'a> {
    mode:    &'a str,
    seed:    u64,
    summary: WorldSummary,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json = args.iter().any(|a| a == "--json");
    let mode = string_arg(&args, "--mode").unwrap_or("demo");
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");

    let mut config = SaveConfig::load(data_dir)?;
    if let Some(path) = string_arg(&args, "--save") {
        config = config.with_path(path);
    }
    let layout = WorldLayout::load(data_dir)?;
    let loot = LootTables::load(data_dir)?;
    let catalog = ItemCatalog::load(data_dir)?;

    if !json {
        println!("Keepsake save-runner");
        println!("  mode:      {mode}");
        println!("  seed:      {seed}");
        println!("  data_dir:  {data_dir}");
        println!("  save:      {}", config.save_path);
        println!("  items:     {}", catalog.len());
        println!();
    }

    let mut engine = SaveEngine::new(config, catalog);
    let mut world = GameWorld::build(&layout, &loot, seed);

    match mode {
        "demo" => {
            play_a_little(&mut world);
            let receipt = engine.save(&world.targets())?;
            log::info!("demo: wrote {} bytes", receipt.bytes);
            print_summary("before save", &world, json, mode, seed)?;

            let mut reloaded = GameWorld::build(&layout, &loot, seed);
            let report = engine.load(&mut reloaded.targets())?;
            print_report(&report, json);
            print_summary("after load", &reloaded, json, mode, seed)?;

            if reloaded.summary() != world.summary() {
                bail!("reloaded world differs from the saved one");
            }
        }
        "save" => {
            play_a_little(&mut world);
            let receipt = engine.save(&world.targets())?;
            if !json {
                println!("saved {} bytes to {} at {}", receipt.bytes, receipt.path, receipt.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            print_summary("saved", &world, json, mode, seed)?;
        }
        "load" => {
            let result = engine.load(&mut world.targets());
            match result {
                Ok(report) => {
                    print_report(&report, json);
                    print_summary("loaded", &world, json, mode, seed)?;
                }
                Err(SaveError::NotFound { path }) => {
                    println!("no save at {path}; starting a new game");
                    print_summary("new game", &world, json, mode, seed)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        "inspect" => {
            let header = engine.peek()?;
            if json {
                println!("{}", serde_json::to_string(&header)?);
            } else {
                println!("=== SAVE HEADER ===");
                println!("  schema:    v{}", header.schema_version);
                println!("  build:     {}", header.build_version);
                println!("  saved_at:  {}", header.saved_at.to_rfc3339());
                let age = chrono::Utc::now().signed_duration_since(header.saved_at);
                println!("  age:       {}m", age.num_minutes());
                println!("  day:       {}", header.current_day);
            }
        }
        other => bail!("unknown mode '{other}' (expected demo | save | load | inspect)"),
    }

    Ok(())
}

/// Deterministic stand-in for a play session.
fn play_a_little(world: &mut GameWorld) {
    world.clock.advance(world.clock.day_length_secs * 2.6);
    world.player.controller.velocity = Vec3::new(1.5, 0.0, -0.5);
    for _ in 0..60 {
        world.player.step(0.5);
    }
    world.stats.take_damage(22.0);
    world.stats.gain_experience(180);
    world.quests.start("lost_ring");
    world.quests.record_objective("lost_ring", "search_well", 1);
    world.quests.advance_stage("lost_ring");

    let looted = match world.containers.ids().first().cloned() {
        Some(first) => world.container_mut(&first).map(|c| c.take_all()).unwrap_or_default(),
        None => Vec::new(),
    };
    for stack in looted {
        world.inventory.add(&stack.item_id, stack.quantity);
    }
    if let Some(spawner) = world.spawner.as_mut() {
        spawner.spawn();
        spawner.defeat();
        spawner.tick(120.0);
    }
}

fn print_report(report: &LoadReport, json: bool) {
    if json {
        return;
    }
    println!("=== LOAD REPORT ===");
    println!("  schema:      v{} ({:?})", report.schema_version, report.schema);
    println!("  filled:      {:?}", report.filled_sections);
    println!(
        "  containers:  {} restored, {} untouched, {} discarded",
        report.containers.restored, report.containers.untouched, report.containers.discarded
    );
    for w in &report.warnings {
        println!("  warning:     {w}");
    }
    println!();
}

fn print_summary(label: &str, world: &GameWorld, json: bool, mode: &str, seed: u64) -> Result<()> {
    let summary = world.summary();
    if json {
        println!("{}", serde_json::to_string(&RunOutput { mode, seed, summary })?);
        return Ok(());
    }
    println!("=== WORLD ({label}) ===");
    println!("  day:        {} @ {:.3}", summary.current_day, summary.normalized_time);
    println!(
        "  position:   ({:.2}, {:.2}, {:.2})",
        summary.position.x, summary.position.y, summary.position.z
    );
    println!("  health:     {:.1}  level: {}", summary.health, summary.level);
    println!("  inventory:  {} slots used", summary.occupied_slots);
    println!("  quests:     {} active, {} completed", summary.active_quests, summary.completed_quests);
    println!("  boss:       {}", if summary.boss_defeated { "defeated" } else { "alive" });
    for c in &summary.containers {
        println!(
            "  container:  {:<14} {:<7} {} items",
            c.container_id,
            if c.opened { "opened" } else { "closed" },
            c.items
        );
    }
    println!();
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].as_str())
}
