#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the arcade-defence simulation.
//!
//! Builds a small demonstration defence, runs waves at the requested speed,
//! prints a digest per wave and persists the inheritance save slot on game
//! over, driving the same external surface the portal's canvas front end uses.

mod save;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use arcade_defence_core::{
    CellCoord, Command, DiceOutcome, Event, SimulationConfig, TowerArchetype, TowerId,
};
use arcade_defence_world::{self as world, query, World};

/// Ticks simulated per wave before the run is declared stuck.
const TICK_BUDGET_PER_WAVE: u64 = 60_000;

#[derive(Debug, Parser)]
#[command(name = "arcade-defence", about = "Headless tower-defence runner")]
struct Args {
    /// Number of waves to simulate before stopping.
    #[arg(long, default_value_t = 5)]
    waves: u32,

    /// Seed for the deterministic random stream.
    #[arg(long)]
    seed: Option<u64>,

    /// Tick multiplier to run at (1, 2 or 4).
    #[arg(long, default_value_t = 1)]
    speed: u32,

    /// Path of the save slot carrying the inheritance bonus.
    #[arg(long, default_value = "arcade-defence-save.json")]
    save: PathBuf,

    /// Skip reading and writing the save slot.
    #[arg(long)]
    ephemeral: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let inherited = if args.ephemeral {
        None
    } else {
        save::take_inheritance(&args.save)
            .with_context(|| format!("loading save slot {}", args.save.display()))?
    };
    if let Some(bonus) = inherited {
        println!("inheritance consumed: +${bonus}");
    }

    let mut config = SimulationConfig {
        inherited_bonus: inherited.map(|bonus| bonus as f64).unwrap_or(0.0),
        ..SimulationConfig::default()
    };
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    let mut game = World::with_config(config);
    set_speed(&mut game, args.speed);
    build_defence(&mut game);

    let outcome = run(&mut game, args.waves);
    report(&game, &outcome);

    if !args.ephemeral {
        if let RunOutcome::GameOver { inheritance, .. } = outcome {
            save::store_inheritance(&args.save, inheritance)
                .with_context(|| format!("writing save slot {}", args.save.display()))?;
            match inheritance {
                Some(value) => println!("inheritance stored: +${value}"),
                None => println!("no inheritance this run"),
            }
        }
    }

    Ok(())
}

/// How a simulation run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunOutcome {
    /// The requested number of waves was cleared.
    Completed,
    /// Lives ran out first.
    GameOver {
        /// Wave reached when the session ended.
        wave: u32,
        /// Inheritance owed to the next session.
        inheritance: Option<u64>,
    },
    /// The tick budget elapsed before either of the above.
    Stalled,
}

fn set_speed(game: &mut World, speed: u32) {
    let mut sink = Vec::new();
    while query::speed_multiplier(game) != speed {
        world::apply(game, Command::CycleSpeed, &mut sink);
        if query::speed_multiplier(game) == 1 {
            // The multiplier cycles 1/2/4; anything else is unreachable.
            break;
        }
    }
}

/// Places the demonstration defence: two walls funneling the lane, two
/// cannons behind them, and a sniper overseeing the approach.
fn build_defence(game: &mut World) {
    let plan = [
        (CellCoord::new(6, 6), TowerArchetype::Wall),
        (CellCoord::new(6, 8), TowerArchetype::Wall),
        (CellCoord::new(5, 6), TowerArchetype::Cannon),
        (CellCoord::new(5, 8), TowerArchetype::Cannon),
        (CellCoord::new(3, 6), TowerArchetype::Sniper),
    ];

    let mut events = Vec::new();
    for (cell, archetype) in plan {
        events.clear();
        world::apply(game, Command::Build { cell, archetype }, &mut events);
        for event in &events {
            if let Event::BuildRejected { reason, .. } = event {
                println!(
                    "build of {} at {},{} rejected: {reason:?}",
                    archetype.stats().name,
                    cell.column(),
                    cell.row(),
                );
            }
        }
    }
}

/// Drives the world until the wave goal, game over or the tick budget.
///
/// Each frame submits one tick per speed multiplier, the same batching the
/// canvas loop uses; per-tick semantics are unaffected.
fn run(game: &mut World, waves: u32) -> RunOutcome {
    let mut events = Vec::new();
    world::apply(game, Command::SetAutoWave { enabled: true }, &mut events);
    let mut digest_state = Digest::default();
    digest(game, &events, &mut digest_state);

    let mut cleared = 0;
    let budget = TICK_BUDGET_PER_WAVE.saturating_mul(u64::from(waves.max(1)));
    let mut ticks: u64 = 0;

    while ticks < budget {
        for _ in 0..query::speed_multiplier(game) {
            ticks += 1;
            events.clear();
            world::apply(game, Command::Tick, &mut events);

            for event in &events {
                match event {
                    Event::WaveCleared { .. } => cleared += 1,
                    Event::GameOver { wave, inheritance } => {
                        return RunOutcome::GameOver {
                            wave: *wave,
                            inheritance: *inheritance,
                        };
                    }
                    _ => {}
                }
            }
            digest(game, &events, &mut digest_state);
        }

        if cleared == 1 && !digest_state.invested {
            invest(game, &mut digest_state);
        }
        if cleared >= waves {
            return RunOutcome::Completed;
        }
    }

    RunOutcome::Stalled
}

/// After the first cleared wave, spend the winnings: upgrade the sniper and
/// roll a ball down the lane.
fn invest(game: &mut World, digest_state: &mut Digest) {
    digest_state.invested = true;
    let sniper: Option<TowerId> = query::tower_view(game)
        .into_iter()
        .find(|snapshot| snapshot.archetype == TowerArchetype::Sniper)
        .map(|snapshot| snapshot.id);

    let mut events = Vec::new();
    if let Some(tower) = sniper {
        world::apply(game, Command::Upgrade { tower }, &mut events);
    }
    world::apply(game, Command::DeployHazard, &mut events);
    digest(game, &events, digest_state);
}

#[derive(Debug, Default)]
struct Digest {
    kills: u32,
    leaks: u32,
    earned: u64,
    invested: bool,
}

/// Prints notable events and accumulates the per-wave digest.
fn digest(game: &World, events: &[Event], state: &mut Digest) {
    for event in events {
        match event {
            Event::WaveStarted {
                wave,
                spawn_target,
                spawn_delay,
            } => {
                println!("wave {wave}: {spawn_target} enemies, one every {spawn_delay} ticks");
            }
            Event::EnemySlain { reward, .. } => {
                state.kills += 1;
                state.earned += u64::from(*reward);
            }
            Event::EnemyLeaked { lives_left, .. } => {
                state.leaks += 1;
                println!("  leak! {lives_left} lives left");
            }
            Event::WaveCleared { wave } => {
                let economy = query::economy(game);
                println!(
                    "wave {wave} cleared: {} kills, {} leaks, +${} (bank ${}, {} lives)",
                    state.kills, state.leaks, state.earned, economy.display_money, economy.lives,
                );
                state.kills = 0;
                state.leaks = 0;
                state.earned = 0;
            }
            Event::TowerUpgraded { tower, level } => {
                println!("  tower #{} upgraded to level {level}", tower.get());
            }
            Event::TowerDestroyed { tower, cause } => {
                println!("  tower #{} destroyed ({cause:?})", tower.get());
            }
            Event::DiceResolved { outcome, .. } => match outcome {
                DiceOutcome::Annihilate => println!("  dice: annihilation!"),
                DiceOutcome::Heal => println!("  dice: the enemies are healed"),
                DiceOutcome::Nothing => {}
            },
            Event::HazardDeployed { .. } => println!("  a ball rolls into the maze"),
            _ => {}
        }
    }
}

/// Prints the end-of-run summary.
fn report(game: &World, outcome: &RunOutcome) {
    let economy = query::economy(game);
    match outcome {
        RunOutcome::Completed => {
            println!(
                "run complete: wave {}, ${} banked, {} lives left",
                economy.wave, economy.display_money, economy.lives,
            );
        }
        RunOutcome::GameOver { wave, inheritance } => {
            println!(
                "game over on wave {wave} with ${} banked ({})",
                economy.display_money,
                match inheritance {
                    Some(value) => format!("inheritance +${value}"),
                    None => "disinherited".to_string(),
                },
            );
        }
        RunOutcome::Stalled => {
            println!("tick budget exhausted on wave {}", economy.wave);
        }
    }
}
