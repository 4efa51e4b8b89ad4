#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the arcade-defence simulation.
//!
//! This crate defines the message surface that connects adapters and the
//! authoritative world. Adapters submit [`Command`] values describing desired
//! mutations, the world executes those commands via its `apply` entry point,
//! and then broadcasts [`Event`] values describing what actually happened.
//! Every rejected request degrades to a rejection event or a silent no-op;
//! nothing in this surface panics or raises.

use serde::{Deserialize, Serialize};

/// Number of tile columns in the defence grid.
pub const GRID_COLUMNS: u32 = 25;

/// Number of tile rows in the defence grid.
pub const GRID_ROWS: u32 = 15;

/// Damage value treated as unconditionally lethal by every archetype.
pub const LETHAL_DAMAGE: f64 = 99_999.0;

/// Money required to roll a hazard ball into the maze.
pub const HAZARD_COST: u32 = 10;

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a rolling hazard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HazardId(u32);

impl HazardId {
    /// Creates a new hazard identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the cell lies inside the fixed defence grid.
    #[must_use]
    pub const fn in_bounds(&self) -> bool {
        self.column < GRID_COLUMNS && self.row < GRID_ROWS
    }
}

/// Fractional position measured in grid units, cell centers at integers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    x: f32,
    y: f32,
}

impl GridPoint {
    /// Creates a point from explicit grid-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Places a point on the center of the provided cell.
    #[must_use]
    pub fn from_cell(cell: CellCoord) -> Self {
        Self {
            x: cell.column() as f32,
            y: cell.row() as f32,
        }
    }

    /// Horizontal coordinate in grid units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in grid units.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Grid cell containing the point, truncating fractional coordinates.
    #[must_use]
    pub fn cell(&self) -> CellCoord {
        CellCoord::new(self.x.max(0.0) as u32, self.y.max(0.0) as u32)
    }

    /// Euclidean distance to another point in grid units.
    #[must_use]
    pub fn distance_to(&self, other: GridPoint) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Advances the point toward a destination by at most `speed` units.
    ///
    /// Returns `true` when the destination was reached this step, in which
    /// case the point snaps exactly onto it.
    pub fn step_toward(&mut self, destination: GridPoint, speed: f32) -> bool {
        let dx = destination.x - self.x;
        let dy = destination.y - self.y;
        let distance = dx.hypot(dy);
        if distance < speed {
            *self = destination;
            return true;
        }
        self.x += dx / distance * speed;
        self.y += dy / distance * speed;
        false
    }
}

/// Movement class that decides how an enemy traverses the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyClass {
    /// Follows the flow field along the ground.
    Ground,
    /// Flies in a straight line toward the exit.
    Flying,
}

/// Targeting class deciding which enemy movement classes a source can affect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    /// Affects ground enemies only.
    Ground,
    /// Affects flying enemies only.
    Air,
    /// Affects every enemy.
    All,
    /// Affects nothing; the archetype acts through passive effects.
    None,
}

impl TargetClass {
    /// Reports whether an enemy of the given movement class is a valid target.
    #[must_use]
    pub const fn accepts(self, class: EnemyClass) -> bool {
        match self {
            Self::Ground => matches!(class, EnemyClass::Ground),
            Self::Air => matches!(class, EnemyClass::Flying),
            Self::All => true,
            Self::None => false,
        }
    }
}

/// Fixed tower type defining base stats and behavior class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerArchetype {
    /// Inert blocker used to shape the maze.
    Wall,
    /// Cheap ground turret.
    Cannon,
    /// Rapid-fire ground turret.
    MachineGun,
    /// Long-range lethal turret able to hit anything.
    Sniper,
    /// Slowing aura that strengthens with level.
    PoisonAura,
    /// Turret that exclusively engages flying enemies.
    AntiAir,
    /// Single-use contact trap with an area blast.
    Mine,
    /// Turret firing area-of-effect rockets.
    Bazooka,
    /// Chance turret rolling for an all-or-nothing outcome.
    Dice,
    /// Wave-end economy tower trading lives for money.
    Heart,
    /// Weak fixed-strength slowing aura.
    Lollipop,
    /// Charge-limited trap that eats ground enemies.
    Pacman,
    /// Passive global damage buff for cannons.
    Powerup,
    /// Overlay tower that auto-upgrades its host every wave.
    Promoted,
}

/// Base stat record attached to a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArchetypeStats {
    /// Display name of the archetype.
    pub name: &'static str,
    /// Money required to build the tower.
    pub cost: u32,
    /// Targeting or effect radius measured in grid units.
    pub range: f32,
    /// Base damage applied per shot or trigger.
    pub damage: f64,
    /// Cooldown between shots measured in ticks; zero means the archetype
    /// never fires projectiles.
    pub fire_rate: u32,
    /// Enemy movement classes the archetype can affect.
    pub target_class: TargetClass,
    /// Damage multiplier applied per upgrade level.
    pub upgrade_factor: f64,
    /// Level assigned at construction time.
    pub start_level: u32,
    /// Blast radius applied around projectile impacts; zero for single-target.
    pub aoe_radius: f32,
    /// Flight speed of fired projectiles in grid units per tick.
    pub projectile_speed: f32,
    /// Speed multiplier applied by slowing auras; zero for non-auras.
    pub slow_factor: f32,
    /// Whether the tower occupies its cell on the pathing grid.
    pub blocks_cell: bool,
}

const fn stats(
    name: &'static str,
    cost: u32,
    range: f32,
    damage: f64,
    fire_rate: u32,
    target_class: TargetClass,
    blocks_cell: bool,
) -> ArchetypeStats {
    ArchetypeStats {
        name,
        cost,
        range,
        damage,
        fire_rate,
        target_class,
        upgrade_factor: 1.25,
        start_level: 1,
        aoe_radius: 0.0,
        projectile_speed: 0.4,
        slow_factor: 0.0,
        blocks_cell,
    }
}

impl TowerArchetype {
    /// Every archetype in roster order.
    pub const ALL: [TowerArchetype; 14] = [
        Self::Wall,
        Self::Cannon,
        Self::MachineGun,
        Self::Sniper,
        Self::PoisonAura,
        Self::AntiAir,
        Self::Mine,
        Self::Bazooka,
        Self::Dice,
        Self::Heart,
        Self::Lollipop,
        Self::Pacman,
        Self::Powerup,
        Self::Promoted,
    ];

    /// Base stat record for the archetype.
    #[must_use]
    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Self::Wall => stats("Wall", 50, 0.0, 0.0, 0, TargetClass::Ground, true),
            Self::Cannon => stats("Cannon", 50, 2.0, 10.0, 60, TargetClass::Ground, true),
            Self::MachineGun => {
                stats("Machine Gun", 150, 3.0, 100.0, 6, TargetClass::Ground, true)
            }
            Self::Sniper => {
                let mut record =
                    stats("Sniper", 250, 10.0, LETHAL_DAMAGE, 60, TargetClass::All, true);
                record.projectile_speed = 1.0;
                record
            }
            Self::PoisonAura => {
                let mut record = stats("Poison", 150, 3.0, 0.0, 0, TargetClass::All, true);
                record.slow_factor = 0.3;
                record
            }
            Self::AntiAir => stats("Anti-Air", 300, 5.0, 100.0, 12, TargetClass::Air, true),
            Self::Mine => stats("Mine", 500, 1.5, LETHAL_DAMAGE, 0, TargetClass::Ground, false),
            Self::Bazooka => {
                let mut record = stats("Bazooka", 500, 4.0, 100.0, 60, TargetClass::All, true);
                record.aoe_radius = 1.5;
                record
            }
            Self::Dice => stats("Dice", 400, 5.0, 0.0, 300, TargetClass::All, true),
            Self::Heart => stats("Heart", 1_500, 0.0, 0.0, 0, TargetClass::None, true),
            Self::Lollipop => {
                let mut record = stats("Lollipop", 400, 2.5, 0.0, 0, TargetClass::All, true);
                record.slow_factor = 0.9;
                record
            }
            Self::Pacman => {
                let mut record =
                    stats("Pacman", 300, 0.5, LETHAL_DAMAGE, 0, TargetClass::Ground, false);
                record.start_level = 10;
                record
            }
            Self::Powerup => stats("Powerup", 1_000, 99.0, 0.0, 0, TargetClass::None, true),
            Self::Promoted => {
                let mut record = stats("Promoted", 600, 1.5, 0.0, 0, TargetClass::None, true);
                record.blocks_cell = false;
                record
            }
        }
    }

    /// Behavior class the simulation dispatches on each tick.
    #[must_use]
    pub const fn behavior(self) -> BehaviorClass {
        match self {
            Self::Wall => BehaviorClass::Blocker,
            Self::Cannon | Self::MachineGun | Self::Sniper | Self::AntiAir | Self::Bazooka => {
                BehaviorClass::DirectFire
            }
            Self::PoisonAura | Self::Lollipop => BehaviorClass::Aura,
            Self::Mine | Self::Pacman => BehaviorClass::ContactTrap,
            Self::Dice => BehaviorClass::Randomized,
            Self::Heart | Self::Powerup | Self::Promoted => BehaviorClass::Passive,
        }
    }

    /// Reports whether damage attributed to this archetype affects flying
    /// enemies. Every other source is shrugged off mid-air.
    #[must_use]
    pub const fn damages_flying(self) -> bool {
        matches!(
            self,
            Self::AntiAir | Self::Sniper | Self::Bazooka | Self::PoisonAura
        )
    }

    /// Reports whether the archetype participates in the upgrade economy.
    #[must_use]
    pub const fn upgradeable(self) -> bool {
        !matches!(self, Self::Mine)
    }

    /// Money required to raise a tower of this archetype past `level`.
    #[must_use]
    pub const fn upgrade_cost(self, level: u32) -> u32 {
        self.stats().cost.saturating_mul(level)
    }

    /// Refund granted when selling a tower of this archetype at `level`.
    #[must_use]
    pub const fn sell_value(self, level: u32) -> u32 {
        self.stats().cost.saturating_mul(level) / 2
    }
}

/// Behavior classes an archetype resolves to during the tower update pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BehaviorClass {
    /// Occupies a cell and does nothing else.
    Blocker,
    /// Cooldown-gated projectile turret.
    DirectFire,
    /// Continuous slow applied to enemies in range every tick.
    Aura,
    /// Triggered by enemy contact; single-use or charge-limited.
    ContactTrap,
    /// Cooldown-gated random outcome roll.
    Randomized,
    /// No per-tick action; effect read elsewhere.
    Passive,
}

/// Outcome of a dice tower roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceOutcome {
    /// Lethal damage dealt to every enemy on the field.
    Annihilate,
    /// Every enemy restored to full health.
    Heal,
    /// The roll fizzled.
    Nothing,
}

/// Reasons a build request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildError {
    /// The player cannot afford the archetype's cost.
    InsufficientFunds,
    /// The requested cell lies outside the grid.
    OutOfBounds,
    /// The requested cell already hosts a blocking tower.
    Occupied,
    /// The spawn and exit cells can never be built on.
    ReservedCell,
    /// Placement would sever the only route from spawn to exit, or strand a
    /// ground enemy already in flight.
    PathBlocked,
    /// The overlay archetype requires a host tower beneath it.
    MissingHost,
    /// The tower at the requested cell cannot host an overlay.
    IneligibleHost,
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower with the provided identifier exists.
    MissingTower,
    /// The archetype never upgrades.
    NotUpgradeable,
    /// The player cannot afford the level-scaled cost.
    InsufficientFunds,
}

/// Cause recorded when a tower leaves the field outside of a sale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestructionCause {
    /// A mine consumed itself in its blast.
    Detonated,
    /// A charge-limited trap ran out of charges.
    Exhausted,
    /// A buff tower could not pay its wave-end upkeep.
    UpkeepUnpaid,
    /// The overlay's host tower no longer exists.
    HostLost,
    /// A rolling hazard flattened the tower.
    Rolled,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one logical tick.
    Tick,
    /// Begins spawning the current wave; a no-op while a wave is active.
    StartWave,
    /// Requests construction of a tower on the provided cell.
    Build {
        /// Cell the tower should occupy.
        cell: CellCoord,
        /// Archetype to construct.
        archetype: TowerArchetype,
    },
    /// Requests demolition of an existing tower for a refund.
    Sell {
        /// Identifier of the tower to sell.
        tower: TowerId,
    },
    /// Requests a level upgrade for an existing tower.
    Upgrade {
        /// Identifier of the tower to upgrade.
        tower: TowerId,
    },
    /// Rolls a hazard ball into the maze from the spawn cell.
    DeployHazard,
    /// Enables or disables automatic wave starts.
    SetAutoWave {
        /// Whether cleared waves should auto-start the next one.
        enabled: bool,
    },
    /// Cycles the tick multiplier through 1×, 2× and 4×.
    CycleSpeed,
    /// Toggles the pause flag; paused worlds ignore ticks.
    TogglePause,
    /// Discards all state and starts a fresh session.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A wave began spawning.
    WaveStarted {
        /// Wave number that started.
        wave: u32,
        /// Total enemies the wave will spawn.
        spawn_target: u32,
        /// Ticks between consecutive spawns.
        spawn_delay: u32,
    },
    /// The wave controller instantiated a new enemy.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Movement class the enemy was given.
        class: EnemyClass,
    },
    /// An enemy's health reached zero and its reward was credited.
    EnemySlain {
        /// Identifier of the slain enemy.
        enemy: EnemyId,
        /// Money credited for the kill.
        reward: u32,
    },
    /// An enemy reached the exit and burned a life.
    EnemyLeaked {
        /// Identifier of the leaked enemy.
        enemy: EnemyId,
        /// Lives remaining after the leak.
        lives_left: u32,
    },
    /// A tower was constructed.
    TowerBuilt {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Archetype that was built.
        archetype: TowerArchetype,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// A build request was rejected.
    BuildRejected {
        /// Archetype requested for construction.
        archetype: TowerArchetype,
        /// Cell provided in the request.
        cell: CellCoord,
        /// Specific reason the build failed.
        reason: BuildError,
    },
    /// A tower was sold and its cell freed.
    TowerSold {
        /// Identifier of the sold tower.
        tower: TowerId,
        /// Money refunded by the sale.
        refund: u32,
    },
    /// A tower gained a level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u32,
    },
    /// An upgrade request was rejected.
    UpgradeRejected {
        /// Identifier of the tower targeted by the request.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// A tower left the field outside of a sale.
    TowerDestroyed {
        /// Identifier of the destroyed tower.
        tower: TowerId,
        /// What removed the tower.
        cause: DestructionCause,
    },
    /// A turret fired a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Enemy the projectile pursues.
        target: EnemyId,
    },
    /// A hazard ball entered the maze.
    HazardDeployed {
        /// Identifier assigned to the hazard.
        hazard: HazardId,
    },
    /// A hazard ball left the maze.
    HazardRemoved {
        /// Identifier of the removed hazard.
        hazard: HazardId,
    },
    /// A dice tower locked in a roll pending resolution.
    DiceScheduled {
        /// Tower whose roll is pending.
        tower: TowerId,
    },
    /// A pending dice roll resolved.
    DiceResolved {
        /// Tower whose roll resolved.
        tower: TowerId,
        /// Outcome that was applied.
        outcome: DiceOutcome,
    },
    /// Every spawned enemy of the active wave has been removed.
    WaveCleared {
        /// Wave number that was cleared.
        wave: u32,
    },
    /// Lives reached zero; the session is over.
    GameOver {
        /// Wave reached when the session ended.
        wave: u32,
        /// Inheritance value for the next session, when positive.
        inheritance: Option<u64>,
    },
    /// A visual explosion effect for renderers to animate.
    Explosion {
        /// Center of the effect in grid units.
        at: GridPoint,
        /// Radius of the effect in grid units.
        radius: f32,
    },
    /// The tick multiplier changed.
    SpeedChanged {
        /// New tick multiplier.
        multiplier: u32,
    },
}

/// Tunable parameters of a simulation session.
///
/// Constants the original source documents inconsistently live here so
/// deployments can pin their own values.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationConfig {
    /// Money available at session start, before any inherited bonus.
    pub starting_money: f64,
    /// Lives available at session start.
    pub starting_lives: u32,
    /// Bonus credited from the previous session's inheritance.
    pub inherited_bonus: f64,
    /// Cannon damage bonus contributed per Powerup tower level.
    pub powerup_bonus_per_level: f64,
    /// Ticks between a cleared wave and an automatic start of the next.
    pub auto_wave_delay: u32,
    /// Ticks between a dice trigger and its outcome application.
    pub dice_resolve_delay: u32,
    /// Seed for the world's deterministic random stream.
    pub rng_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            starting_money: 600.0,
            starting_lives: 20,
            inherited_bonus: 0.0,
            powerup_bonus_per_level: 0.10,
            auto_wave_delay: 120,
            dice_resolve_delay: 30,
            rng_seed: 0x6ad5_3c21_42f0_e1eb,
        }
    }
}
