#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the arcade-defence core.
//!
//! The world owns every mutable piece of the game: grid, flow field, towers,
//! enemies, projectiles, hazards, economy, wave controller, deferred-effect
//! scheduler and the random stream. Adapters drive it exclusively through
//! [`apply`] and read it back through [`query`]; one [`Command::Tick`] equals
//! one logical simulation step, and the speed multiplier only tells adapters
//! how many ticks to submit per frame.

use arcade_defence_core::{
    BuildError, CellCoord, Command, DiceOutcome, EnemyClass, EnemyId, Event, HazardId,
    ProjectileId, SimulationConfig, TowerArchetype, TowerId, UpgradeError, HAZARD_COST,
    LETHAL_DAMAGE,
};
use arcade_defence_system_targeting::Targeting;

mod economy;
mod enemies;
mod hazards;
mod navigation;
mod projectiles;
mod rng;
mod scheduler;
mod towers;
mod waves;

use economy::Economy;
use enemies::{apply_hit, DamageSource, EnemyState};
use hazards::HazardState;
use navigation::{FlowField, Grid};
use projectiles::ProjectileState;
use rng::SplitMix64;
use scheduler::{PendingEffect, Scheduler};
use towers::TowerRegistry;
use waves::WaveController;

/// Cell enemies and hazards enter the maze from.
const SPAWN_CELL: CellCoord = CellCoord::new(0, 7);

/// Cell every enemy is trying to reach.
const EXIT_CELL: CellCoord = CellCoord::new(24, 7);

/// Authoritative simulation state; see the crate docs for the contract.
#[derive(Debug)]
pub struct World {
    pub(crate) config: SimulationConfig,
    pub(crate) spawn: CellCoord,
    pub(crate) exit: CellCoord,
    pub(crate) grid: Grid,
    pub(crate) flow_field: FlowField,
    pub(crate) towers: TowerRegistry,
    pub(crate) enemies: Vec<EnemyState>,
    pub(crate) projectiles: Vec<ProjectileState>,
    pub(crate) hazards: Vec<HazardState>,
    pub(crate) economy: Economy,
    pub(crate) waves: WaveController,
    pub(crate) scheduler: Scheduler,
    pub(crate) targeting: Targeting,
    pub(crate) rng: SplitMix64,
    pub(crate) auto_wave: bool,
    pub(crate) paused: bool,
    pub(crate) game_over: bool,
    pub(crate) speed: u32,
    next_enemy_id: u32,
    next_projectile_id: u32,
    next_hazard_id: u32,
}

impl World {
    /// Creates a fresh session with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    /// Creates a fresh session with the provided configuration.
    #[must_use]
    pub fn with_config(config: SimulationConfig) -> Self {
        let grid = Grid::new();
        let mut flow_field = FlowField::new();
        flow_field.rebuild(EXIT_CELL, &grid);

        Self {
            config,
            spawn: SPAWN_CELL,
            exit: EXIT_CELL,
            grid,
            flow_field,
            towers: TowerRegistry::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            hazards: Vec::new(),
            economy: Economy::new(&config),
            waves: WaveController::new(),
            scheduler: Scheduler::new(),
            targeting: Targeting::new(),
            rng: SplitMix64::new(config.rng_seed),
            auto_wave: false,
            paused: false,
            game_over: false,
            speed: 1,
            next_enemy_id: 0,
            next_projectile_id: 0,
            next_hazard_id: 0,
        }
    }

    pub(crate) fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    fn allocate_hazard_id(&mut self) -> HazardId {
        let id = HazardId::new(self.next_hazard_id);
        self.next_hazard_id = self.next_hazard_id.wrapping_add(1);
        id
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => tick(world, out_events),
        Command::StartWave => {
            if !world.paused {
                start_wave(world, out_events);
            }
        }
        Command::Build { cell, archetype } => {
            if !world.paused && !world.game_over {
                build(world, cell, archetype, out_events);
            }
        }
        Command::Sell { tower } => {
            if !world.paused && !world.game_over {
                sell(world, tower, out_events);
            }
        }
        Command::Upgrade { tower } => {
            if !world.paused && !world.game_over {
                upgrade(world, tower, out_events);
            }
        }
        Command::DeployHazard => {
            if !world.paused && !world.game_over {
                deploy_hazard(world, out_events);
            }
        }
        Command::SetAutoWave { enabled } => {
            world.auto_wave = enabled;
            if enabled {
                start_wave(world, out_events);
            }
        }
        Command::CycleSpeed => {
            world.speed = match world.speed {
                1 => 2,
                2 => 4,
                _ => 1,
            };
            out_events.push(Event::SpeedChanged {
                multiplier: world.speed,
            });
        }
        Command::TogglePause => {
            world.paused = !world.paused;
        }
        Command::Restart => {
            *world = World::with_config(world.config);
        }
    }
}

/// One logical simulation step; see spec ordering in the crate docs.
fn tick(world: &mut World, out_events: &mut Vec<Event>) {
    if world.paused || world.game_over {
        return;
    }

    if world.waves.tick_spawn() {
        spawn_enemy(world, out_events);
    }

    towers::tick_towers(world, out_events);
    enemies::tick_enemies(world, out_events);
    projectiles::tick_projectiles(world, out_events);
    hazards::tick_hazards(world, out_events);

    for effect in world.scheduler.collect_due() {
        match effect {
            PendingEffect::AutoWaveStart => start_wave(world, out_events),
            PendingEffect::DiceResolution { tower } => resolve_dice(world, tower, out_events),
        }
    }

    world.enemies.retain(|enemy| !enemy.dead);

    if world.waves.cleared(world.enemies.len()) {
        world.waves.finish();
        out_events.push(Event::WaveCleared {
            wave: world.economy.wave(),
        });
        world.economy.advance_wave();
        towers::wave_end_effects(world, out_events);
        if world.auto_wave && !world.game_over {
            world
                .scheduler
                .schedule(world.config.auto_wave_delay, PendingEffect::AutoWaveStart);
        }
    }
}

fn spawn_enemy(world: &mut World, out_events: &mut Vec<Event>) {
    let wave = world.economy.wave();
    let class = if waves::rolls_flying(wave, &mut world.rng) {
        EnemyClass::Flying
    } else {
        EnemyClass::Ground
    };
    let id = world.allocate_enemy_id();
    world
        .enemies
        .push(EnemyState::spawn(id, wave, class, world.spawn));
    out_events.push(Event::EnemySpawned { enemy: id, class });
}

/// Arms the wave controller unless a wave is already running.
fn start_wave(world: &mut World, out_events: &mut Vec<Event>) {
    if world.waves.is_active() || world.waves.is_spawning() || world.game_over {
        return;
    }

    let wave = world.economy.wave();
    let (spawn_target, spawn_delay) = world.waves.start(wave);
    out_events.push(Event::WaveStarted {
        wave,
        spawn_target,
        spawn_delay,
    });
}

/// Build protocol: validate funds and placement, then tentatively block the
/// cell and reject if the maze would be severed for the spawn or any live
/// ground enemy.
fn build(
    world: &mut World,
    cell: CellCoord,
    archetype: TowerArchetype,
    out_events: &mut Vec<Event>,
) {
    let stats = archetype.stats();
    let reject = |reason: BuildError, out_events: &mut Vec<Event>| {
        out_events.push(Event::BuildRejected {
            archetype,
            cell,
            reason,
        });
    };

    if !cell.in_bounds() {
        reject(BuildError::OutOfBounds, out_events);
        return;
    }

    if archetype == TowerArchetype::Promoted {
        let host = match world.towers.host_candidate_at(cell) {
            None => {
                reject(BuildError::MissingHost, out_events);
                return;
            }
            Some(host) if host.archetype == TowerArchetype::Wall => {
                reject(BuildError::IneligibleHost, out_events);
                return;
            }
            Some(host) => host.id,
        };
        if !world.economy.try_spend(f64::from(stats.cost)) {
            reject(BuildError::InsufficientFunds, out_events);
            return;
        }
        let tower = world.towers.insert(archetype, cell, Some(host));
        out_events.push(Event::TowerBuilt {
            tower,
            archetype,
            cell,
        });
        return;
    }

    if world.grid.is_blocked(cell) {
        reject(BuildError::Occupied, out_events);
        return;
    }
    if cell == world.spawn || cell == world.exit {
        reject(BuildError::ReservedCell, out_events);
        return;
    }
    if !world.economy.can_afford(f64::from(stats.cost)) {
        reject(BuildError::InsufficientFunds, out_events);
        return;
    }

    if stats.blocks_cell {
        world.grid.set_blocked(cell, true);
        world.flow_field.rebuild(world.exit, &world.grid);

        let spawn_severed = !world.flow_field.is_reachable(world.spawn);
        let enemy_stranded = world.enemies.iter().any(|enemy| {
            !enemy.dead
                && enemy.class == EnemyClass::Ground
                && !world.flow_field.is_reachable(enemy.position.cell())
        });

        if spawn_severed || enemy_stranded {
            world.grid.set_blocked(cell, false);
            world.flow_field.rebuild(world.exit, &world.grid);
            reject(BuildError::PathBlocked, out_events);
            return;
        }
    }

    let spent = world.economy.try_spend(f64::from(stats.cost));
    debug_assert!(spent, "affordability was checked above");
    let tower = world.towers.insert(archetype, cell, None);
    out_events.push(Event::TowerBuilt {
        tower,
        archetype,
        cell,
    });
}

/// Refunds a level-scaled fraction of spend and frees the cell.
fn sell(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    let Some(state) = world.towers.remove(tower) else {
        return;
    };

    let refund = state.archetype.sell_value(state.level);
    world.economy.credit(f64::from(refund));
    if state.archetype.stats().blocks_cell {
        world.grid.set_blocked(state.cell, false);
        world.flow_field.rebuild(world.exit, &world.grid);
    }
    out_events.push(Event::TowerSold { tower, refund });
}

fn upgrade(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    let reject = |reason: UpgradeError, out_events: &mut Vec<Event>| {
        out_events.push(Event::UpgradeRejected { tower, reason });
    };

    let Some((archetype, level)) = world
        .towers
        .get(tower)
        .map(|state| (state.archetype, state.level))
    else {
        reject(UpgradeError::MissingTower, out_events);
        return;
    };

    if !archetype.upgradeable() {
        reject(UpgradeError::NotUpgradeable, out_events);
        return;
    }

    let cost = archetype.upgrade_cost(level);
    if !world.economy.try_spend(f64::from(cost)) {
        reject(UpgradeError::InsufficientFunds, out_events);
        return;
    }

    if let Some(state) = world.towers.get_mut(tower) {
        state.upgrade();
        out_events.push(Event::TowerUpgraded {
            tower,
            level: state.level,
        });
    }
}

fn deploy_hazard(world: &mut World, out_events: &mut Vec<Event>) {
    if !world.economy.try_spend(f64::from(HAZARD_COST)) {
        return;
    }

    let id = world.allocate_hazard_id();
    world.hazards.push(HazardState::new(id, world.spawn));
    out_events.push(Event::HazardDeployed { hazard: id });
}

/// Resolves a pending dice roll; a vanished tower cancels the outcome.
fn resolve_dice(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    let Some(position) = world.towers.get(tower).map(towers::TowerState::position) else {
        return;
    };
    if let Some(state) = world.towers.get_mut(tower) {
        state.pending_roll = false;
    }

    let outcome = match world.rng.roll_d6() {
        6 => DiceOutcome::Annihilate,
        1 => DiceOutcome::Heal,
        _ => DiceOutcome::Nothing,
    };

    match outcome {
        DiceOutcome::Annihilate => {
            for enemy in world.enemies.iter_mut() {
                apply_hit(
                    enemy,
                    LETHAL_DAMAGE,
                    DamageSource::Tower(TowerArchetype::Dice),
                    &mut world.economy,
                    out_events,
                );
            }
        }
        DiceOutcome::Heal => {
            for enemy in world.enemies.iter_mut() {
                enemy.heal_full();
            }
        }
        DiceOutcome::Nothing => {}
    }

    out_events.push(Event::Explosion {
        at: position,
        radius: 0.5,
    });
    out_events.push(Event::DiceResolved { tower, outcome });
}

/// Marks the session terminal and reports the inheritance for the next one.
pub(crate) fn trigger_game_over(world: &mut World, out_events: &mut Vec<Event>) {
    if world.game_over {
        return;
    }

    world.game_over = true;
    world.waves.finish();
    world.scheduler.clear();
    out_events.push(Event::GameOver {
        wave: world.economy.wave(),
        inheritance: world.economy.inheritance(),
    });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use arcade_defence_core::{
        CellCoord, EnemyClass, EnemyId, GridPoint, HazardId, ProjectileId, TowerArchetype, TowerId,
    };

    use super::World;

    /// Economy figures as shown to the player.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EconomySnapshot {
        /// Exact fractional balance.
        pub money: f64,
        /// Balance floored for display.
        pub display_money: u64,
        /// Lives remaining.
        pub lives: u32,
        /// Current wave number.
        pub wave: u32,
    }

    /// Captures the current economy figures.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        EconomySnapshot {
            money: world.economy.money(),
            display_money: world.economy.display_money(),
            lives: world.economy.lives(),
            wave: world.economy.wave(),
        }
    }

    /// Progress of the wave controller.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WaveStatus {
        /// A wave is running (spawning or draining).
        pub active: bool,
        /// Enemies are still being spawned.
        pub spawning: bool,
        /// Enemies spawned so far this wave.
        pub spawned: u32,
        /// Enemies the wave will spawn in total.
        pub spawn_target: u32,
    }

    /// Captures the wave controller's progress.
    #[must_use]
    pub fn wave_status(world: &World) -> WaveStatus {
        let (spawned, spawn_target) = world.waves.spawn_progress();
        WaveStatus {
            active: world.waves.is_active(),
            spawning: world.waves.is_spawning(),
            spawned,
            spawn_target,
        }
    }

    /// Current tick multiplier.
    #[must_use]
    pub fn speed_multiplier(world: &World) -> u32 {
        world.speed
    }

    /// Whether tick advancement is frozen.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Whether the session reached its terminal state.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Whether cleared waves start the next one automatically.
    #[must_use]
    pub fn auto_wave_enabled(world: &World) -> bool {
        world.auto_wave
    }

    /// Immutable representation of a single tower's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct TowerSnapshot {
        /// Identifier allocated by the world.
        pub id: TowerId,
        /// Archetype that was built.
        pub archetype: TowerArchetype,
        /// Cell the tower occupies.
        pub cell: CellCoord,
        /// Current level (or remaining charges for traps).
        pub level: u32,
        /// Current per-shot damage including upgrades.
        pub damage: f64,
        /// Ticks until the tower may fire again.
        pub cooldown: u32,
        /// Facing angle in radians toward the last target.
        pub facing: f32,
        /// Host tower for overlays.
        pub host: Option<TowerId>,
    }

    /// Captures every tower, ordered by identifier.
    #[must_use]
    pub fn tower_view(world: &World) -> Vec<TowerSnapshot> {
        let mut snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                archetype: tower.archetype,
                cell: tower.cell,
                level: tower.level,
                damage: tower.damage,
                cooldown: tower.cooldown,
                facing: tower.facing,
                host: tower.host,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// First tower found on the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world
            .towers
            .iter()
            .find(|tower| tower.cell == cell)
            .map(|tower| tower.id)
    }

    /// Immutable representation of a single enemy's state.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Identifier allocated by the world.
        pub id: EnemyId,
        /// Movement class.
        pub class: EnemyClass,
        /// Position in grid units.
        pub position: GridPoint,
        /// Remaining health.
        pub health: f64,
        /// Health at spawn time.
        pub max_health: f64,
        /// Whether a slow effect is currently active.
        pub slowed: bool,
    }

    /// Captures every live enemy, ordered by identifier.
    #[must_use]
    pub fn enemy_view(world: &World) -> Vec<EnemySnapshot> {
        let mut snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter()
            .filter(|enemy| !enemy.dead)
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                class: enemy.class,
                position: enemy.position,
                health: enemy.health,
                max_health: enemy.max_health,
                slowed: enemy.slow_remaining > 0,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Immutable representation of a projectile in flight.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier allocated by the world.
        pub id: ProjectileId,
        /// Position in grid units.
        pub position: GridPoint,
        /// Enemy the projectile pursues.
        pub target: EnemyId,
    }

    /// Captures every projectile currently in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id,
                position: projectile.position,
                target: projectile.target,
            })
            .collect()
    }

    /// Immutable representation of a rolling hazard.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct HazardSnapshot {
        /// Identifier allocated by the world.
        pub id: HazardId,
        /// Position in grid units.
        pub position: GridPoint,
        /// Cell the ball is gliding toward.
        pub heading: Option<CellCoord>,
    }

    /// Captures every hazard ball on the field.
    #[must_use]
    pub fn hazard_view(world: &World) -> Vec<HazardSnapshot> {
        world
            .hazards
            .iter()
            .map(|hazard| HazardSnapshot {
                id: hazard.id,
                position: hazard.position,
                heading: hazard.heading,
            })
            .collect()
    }

    /// Flow-field distance from the cell to the exit; `999` is unreachable.
    #[must_use]
    pub fn flow_distance(world: &World, cell: CellCoord) -> u16 {
        world.flow_field.distance(cell)
    }

    /// Whether a blocking tower occupies the cell.
    #[must_use]
    pub fn is_cell_blocked(world: &World, cell: CellCoord) -> bool {
        world.grid.is_blocked(cell)
    }

    /// Cell enemies enter from.
    #[must_use]
    pub fn spawn_cell(world: &World) -> CellCoord {
        world.spawn
    }

    /// Cell enemies are trying to reach.
    #[must_use]
    pub fn exit_cell(world: &World) -> CellCoord {
        world.exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump(world: &mut World, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, command, &mut events);
        events
    }

    #[test]
    fn fresh_worlds_start_with_an_open_maze() {
        let world = World::new();
        assert_eq!(query::flow_distance(&world, EXIT_CELL), 0);
        assert_eq!(query::flow_distance(&world, SPAWN_CELL), 24);
        assert_eq!(query::economy(&world).display_money, 600);
        assert_eq!(query::economy(&world).lives, 20);
        assert_eq!(query::economy(&world).wave, 1);
    }

    #[test]
    fn building_charges_money_and_blocks_the_cell() {
        let mut world = World::new();
        let cell = CellCoord::new(5, 5);

        let events = pump(
            &mut world,
            Command::Build {
                cell,
                archetype: TowerArchetype::Wall,
            },
        );

        assert!(matches!(events.as_slice(), [Event::TowerBuilt { .. }]));
        assert!(query::is_cell_blocked(&world, cell));
        assert_eq!(query::economy(&world).display_money, 550);
    }

    #[test]
    fn builds_on_reserved_cells_are_rejected() {
        let mut world = World::new();

        for cell in [SPAWN_CELL, EXIT_CELL] {
            let events = pump(
                &mut world,
                Command::Build {
                    cell,
                    archetype: TowerArchetype::Wall,
                },
            );
            assert!(matches!(
                events.as_slice(),
                [Event::BuildRejected {
                    reason: BuildError::ReservedCell,
                    ..
                }],
            ));
        }
        assert_eq!(query::economy(&world).display_money, 600);
    }

    #[test]
    fn unaffordable_builds_are_rejected_without_charge() {
        let mut world = World::new();

        let events = pump(
            &mut world,
            Command::Build {
                cell: CellCoord::new(5, 5),
                archetype: TowerArchetype::Heart,
            },
        );

        assert!(matches!(
            events.as_slice(),
            [Event::BuildRejected {
                reason: BuildError::InsufficientFunds,
                ..
            }],
        ));
        assert_eq!(query::economy(&world).display_money, 600);
    }

    #[test]
    fn selling_refunds_and_unblocks() {
        let mut world = World::new();
        let cell = CellCoord::new(5, 5);
        let events = pump(
            &mut world,
            Command::Build {
                cell,
                archetype: TowerArchetype::Wall,
            },
        );
        let tower = match events.as_slice() {
            [Event::TowerBuilt { tower, .. }] => *tower,
            other => panic!("expected TowerBuilt, got {other:?}"),
        };

        let events = pump(&mut world, Command::Sell { tower });

        assert_eq!(
            events,
            vec![Event::TowerSold { tower, refund: 25 }],
        );
        assert!(!query::is_cell_blocked(&world, cell));
        assert_eq!(query::economy(&world).display_money, 575);
    }

    #[test]
    fn upgrades_charge_the_level_scaled_cost() {
        let mut world = World::new();
        let events = pump(
            &mut world,
            Command::Build {
                cell: CellCoord::new(5, 5),
                archetype: TowerArchetype::Cannon,
            },
        );
        let tower = match events.as_slice() {
            [Event::TowerBuilt { tower, .. }] => *tower,
            other => panic!("expected TowerBuilt, got {other:?}"),
        };

        let events = pump(&mut world, Command::Upgrade { tower });
        assert_eq!(events, vec![Event::TowerUpgraded { tower, level: 2 }]);
        // 600 - 50 build - 50 upgrade at level 1.
        assert_eq!(query::economy(&world).display_money, 500);

        let snapshot = query::tower_view(&world)
            .into_iter()
            .find(|snapshot| snapshot.id == tower)
            .expect("tower");
        assert!((snapshot.damage - 12.5).abs() < 1e-9);
    }

    #[test]
    fn mines_cannot_be_upgraded() {
        let mut world = World::new();
        let events = pump(
            &mut world,
            Command::Build {
                cell: CellCoord::new(5, 5),
                archetype: TowerArchetype::Mine,
            },
        );
        let tower = match events.as_slice() {
            [Event::TowerBuilt { tower, .. }] => *tower,
            other => panic!("expected TowerBuilt, got {other:?}"),
        };

        let events = pump(&mut world, Command::Upgrade { tower });
        assert_eq!(
            events,
            vec![Event::UpgradeRejected {
                tower,
                reason: UpgradeError::NotUpgradeable,
            }],
        );
    }

    #[test]
    fn promoted_requires_an_eligible_host() {
        let mut world = World::new();
        let cell = CellCoord::new(5, 5);

        let events = pump(
            &mut world,
            Command::Build {
                cell,
                archetype: TowerArchetype::Promoted,
            },
        );
        assert!(matches!(
            events.as_slice(),
            [Event::BuildRejected {
                reason: BuildError::MissingHost,
                ..
            }],
        ));

        let _ = pump(
            &mut world,
            Command::Build {
                cell,
                archetype: TowerArchetype::Wall,
            },
        );
        let events = pump(
            &mut world,
            Command::Build {
                cell,
                archetype: TowerArchetype::Promoted,
            },
        );
        assert!(matches!(
            events.as_slice(),
            [Event::BuildRejected {
                reason: BuildError::IneligibleHost,
                ..
            }],
        ));
    }

    #[test]
    fn speed_cycles_through_the_three_multipliers() {
        let mut world = World::new();
        assert_eq!(query::speed_multiplier(&world), 1);

        for expected in [2, 4, 1, 2] {
            let events = pump(&mut world, Command::CycleSpeed);
            assert_eq!(
                events,
                vec![Event::SpeedChanged {
                    multiplier: expected,
                }],
            );
            assert_eq!(query::speed_multiplier(&world), expected);
        }
    }

    #[test]
    fn paused_worlds_ignore_ticks_and_builds() {
        let mut world = World::new();
        let _ = pump(&mut world, Command::TogglePause);
        assert!(query::is_paused(&world));

        let _ = pump(&mut world, Command::StartWave);
        let events = pump(&mut world, Command::Tick);
        assert!(events.is_empty());

        let events = pump(
            &mut world,
            Command::Build {
                cell: CellCoord::new(5, 5),
                archetype: TowerArchetype::Wall,
            },
        );
        assert!(events.is_empty());

        let _ = pump(&mut world, Command::TogglePause);
        assert!(!query::is_paused(&world));
    }

    #[test]
    fn start_wave_is_a_no_op_while_a_wave_runs() {
        let mut world = World::new();
        let events = pump(&mut world, Command::StartWave);
        assert_eq!(
            events,
            vec![Event::WaveStarted {
                wave: 1,
                spawn_target: 21,
                spawn_delay: 58,
            }],
        );

        let events = pump(&mut world, Command::StartWave);
        assert!(events.is_empty());
    }

    #[test]
    fn deploying_a_hazard_costs_ten() {
        let mut world = World::new();
        let events = pump(&mut world, Command::DeployHazard);
        assert!(matches!(events.as_slice(), [Event::HazardDeployed { .. }]));
        assert_eq!(query::economy(&world).display_money, 590);
        assert_eq!(query::hazard_view(&world).len(), 1);
    }

    #[test]
    fn restart_reinitializes_every_structure() {
        let mut world = World::new();
        let _ = pump(&mut world, Command::StartWave);
        let _ = pump(
            &mut world,
            Command::Build {
                cell: CellCoord::new(5, 5),
                archetype: TowerArchetype::Wall,
            },
        );
        for _ in 0..120 {
            let _ = pump(&mut world, Command::Tick);
        }

        let _ = pump(&mut world, Command::Restart);

        assert_eq!(query::economy(&world).display_money, 600);
        assert_eq!(query::economy(&world).wave, 1);
        assert!(query::tower_view(&world).is_empty());
        assert!(query::enemy_view(&world).is_empty());
        assert!(!query::wave_status(&world).active);
        assert!(!query::is_cell_blocked(&world, CellCoord::new(5, 5)));
    }
}
