use arcade_defence_core::{
    CellCoord, Command, Event, SimulationConfig, TowerArchetype, TowerId,
};
use arcade_defence_world::{self as world, query, World};

#[test]
fn corridor_blocking_build_is_rejected_and_rolls_back() {
    let mut w = rich_world();

    // Wall off rows 6 and 8 so row 7 becomes a single straight corridor.
    for column in 0..25 {
        build(&mut w, CellCoord::new(column, 6), TowerArchetype::Wall);
        build(&mut w, CellCoord::new(column, 8), TowerArchetype::Wall);
    }

    let spawn = query::spawn_cell(&w);
    let distance_before = query::flow_distance(&w, spawn);
    let money_before = query::economy(&w).money;
    let midpoint = CellCoord::new(12, 7);

    let events = apply(&mut w, Command::Build {
        cell: midpoint,
        archetype: TowerArchetype::Wall,
    });

    assert!(matches!(
        events.as_slice(),
        [Event::BuildRejected {
            reason: arcade_defence_core::BuildError::PathBlocked,
            ..
        }],
    ));
    assert!(!query::is_cell_blocked(&w, midpoint));
    assert_eq!(query::flow_distance(&w, spawn), distance_before);
    assert_eq!(query::economy(&w).money, money_before);
}

#[test]
fn wave_one_runs_to_cleared_with_the_documented_cadence() {
    let mut w = rich_world();
    build(&mut w, CellCoord::new(2, 6), TowerArchetype::Sniper);
    build(&mut w, CellCoord::new(3, 8), TowerArchetype::Sniper);

    let events = apply(&mut w, Command::StartWave);
    assert_eq!(
        events,
        vec![Event::WaveStarted {
            wave: 1,
            spawn_target: 21,
            spawn_delay: 58,
        }],
    );

    let mut spawned = 0;
    let mut cleared_at_tick = None;
    for tick in 0..5_000 {
        let events = apply(&mut w, Command::Tick);
        for event in &events {
            match event {
                Event::EnemySpawned { .. } => spawned += 1,
                Event::WaveCleared { wave } => {
                    assert_eq!(*wave, 1);
                    cleared_at_tick = Some(tick);
                }
                Event::EnemyLeaked { .. } => panic!("snipers should hold the line"),
                _ => {}
            }
        }
        if cleared_at_tick.is_some() {
            break;
        }
    }

    assert_eq!(spawned, 21);
    assert!(cleared_at_tick.is_some(), "wave never cleared");
    assert!(query::enemy_view(&w).is_empty());
    assert!(!query::wave_status(&w).active);
    assert_eq!(query::economy(&w).wave, 2);
}

#[test]
fn idle_turrets_rest_at_zero_cooldown_and_never_fire() {
    let mut w = World::new();
    let tower = build(&mut w, CellCoord::new(5, 5), TowerArchetype::Cannon);

    for _ in 0..200 {
        let events = apply(&mut w, Command::Tick);
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::ProjectileFired { .. })));
    }

    assert!(query::projectile_view(&w).is_empty());
    let snapshot = query::tower_view(&w)
        .into_iter()
        .find(|snapshot| snapshot.id == tower)
        .expect("tower");
    assert_eq!(snapshot.cooldown, 0);
}

#[test]
fn leaking_every_life_ends_the_session_with_an_inheritance() {
    let config = SimulationConfig {
        starting_lives: 1,
        ..SimulationConfig::default()
    };
    let mut w = World::with_config(config);
    let _ = apply(&mut w, Command::StartWave);

    let mut game_over = None;
    for _ in 0..3_000 {
        let events = apply(&mut w, Command::Tick);
        if let Some(event) = events
            .iter()
            .find(|event| matches!(event, Event::GameOver { .. }))
        {
            game_over = Some(event.clone());
            break;
        }
    }

    // Wave 1 with 600 money: 600 * (100 - 1) / 200 = 297.
    assert_eq!(
        game_over,
        Some(Event::GameOver {
            wave: 1,
            inheritance: Some(297),
        }),
    );
    assert!(query::is_game_over(&w));

    // Terminal state: further ticks are inert.
    let enemies_before = query::enemy_view(&w).len();
    for _ in 0..10 {
        assert!(apply(&mut w, Command::Tick).is_empty());
    }
    assert_eq!(query::enemy_view(&w).len(), enemies_before);
}

#[test]
fn dice_rolls_never_overlap_their_pending_window() {
    let mut w = rich_world();
    let dice = build(&mut w, CellCoord::new(3, 6), TowerArchetype::Dice);
    let _ = apply(&mut w, Command::StartWave);

    let mut pending = false;
    let mut schedules = 0;
    let mut resolutions = 0;
    for _ in 0..3_000 {
        for event in apply(&mut w, Command::Tick) {
            match event {
                Event::DiceScheduled { tower } if tower == dice => {
                    assert!(!pending, "roll scheduled while one was pending");
                    pending = true;
                    schedules += 1;
                }
                Event::DiceResolved { tower, .. } if tower == dice => {
                    assert!(pending, "resolution without a schedule");
                    pending = false;
                    resolutions += 1;
                }
                _ => {}
            }
        }
    }

    assert!(schedules > 0, "dice never triggered");
    assert!(resolutions > 0, "dice never resolved");
    assert!(schedules - resolutions <= 1);
}

#[test]
fn auto_wave_starts_the_next_wave_after_the_delay() {
    let mut w = rich_world();
    build(&mut w, CellCoord::new(2, 6), TowerArchetype::Sniper);
    build(&mut w, CellCoord::new(3, 8), TowerArchetype::Sniper);

    let events = apply(&mut w, Command::SetAutoWave { enabled: true });
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::WaveStarted { wave: 1, .. })));

    let mut cleared = false;
    let mut ticks_since_cleared = 0;
    for _ in 0..10_000 {
        let events = apply(&mut w, Command::Tick);
        if events
            .iter()
            .any(|event| matches!(event, Event::WaveCleared { wave: 1 }))
        {
            cleared = true;
            continue;
        }
        if cleared {
            ticks_since_cleared += 1;
            if events
                .iter()
                .any(|event| matches!(event, Event::WaveStarted { wave: 2, .. }))
            {
                assert_eq!(ticks_since_cleared, 120);
                return;
            }
        }
    }

    panic!("auto-wave never started wave 2 (cleared: {cleared})");
}

#[test]
fn restart_cancels_a_pending_auto_wave_timer() {
    let mut w = rich_world();
    build(&mut w, CellCoord::new(2, 6), TowerArchetype::Sniper);
    build(&mut w, CellCoord::new(3, 8), TowerArchetype::Sniper);
    let _ = apply(&mut w, Command::SetAutoWave { enabled: true });

    for _ in 0..10_000 {
        let events = apply(&mut w, Command::Tick);
        if events
            .iter()
            .any(|event| matches!(event, Event::WaveCleared { .. }))
        {
            break;
        }
    }

    let _ = apply(&mut w, Command::Restart);

    // The cancelled timer must never fire into the fresh session.
    for _ in 0..1_000 {
        let events = apply(&mut w, Command::Tick);
        assert!(events
            .iter()
            .all(|event| !matches!(event, Event::WaveStarted { .. })));
    }
    assert!(!query::wave_status(&w).active);
}

fn rich_world() -> World {
    World::with_config(SimulationConfig {
        starting_money: 100_000.0,
        ..SimulationConfig::default()
    })
}

fn apply(w: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(w, command, &mut events);
    events
}

fn build(w: &mut World, cell: CellCoord, archetype: TowerArchetype) -> TowerId {
    let events = apply(w, Command::Build { cell, archetype });
    match events.as_slice() {
        [Event::TowerBuilt { tower, .. }] => *tower,
        other => panic!("build at {cell:?} failed: {other:?}"),
    }
}
