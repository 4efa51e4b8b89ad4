//! Enemy state, movement and damage application.

use arcade_defence_core::{CellCoord, EnemyClass, EnemyId, Event, GridPoint, TowerArchetype};

use crate::economy::Economy;
use crate::navigation::{cardinal_neighbors, FlowField};
use crate::World;

/// Per-wave exponential health multiplier base.
const HEALTH_GROWTH_RATE: f64 = 1.15;

/// Ticks a slow effect lasts after each aura application.
pub(crate) const SLOW_DURATION: u32 = 2;

/// Origin of a damage application, used for the flying allow-list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageSource {
    /// Damage attributed to a tower archetype.
    Tower(TowerArchetype),
    /// Contact with a rolling hazard.
    Hazard,
}

impl DamageSource {
    fn damages_flying(self) -> bool {
        match self {
            Self::Tower(archetype) => archetype.damages_flying(),
            Self::Hazard => false,
        }
    }
}

/// Result of a single damage application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HitOutcome {
    /// The source type cannot touch this enemy, or it is already down.
    Ignored,
    /// Damage landed; the enemy survives.
    Wounded,
    /// Health crossed zero on this hit; the reward is due exactly once.
    Slain {
        /// Money to credit for the kill.
        reward: u32,
    },
}

/// Mutable state of a single live enemy.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    pub(crate) class: EnemyClass,
    pub(crate) position: GridPoint,
    pub(crate) health: f64,
    pub(crate) max_health: f64,
    pub(crate) base_speed: f32,
    pub(crate) reward: u32,
    pub(crate) slow_factor: f32,
    pub(crate) slow_remaining: u32,
    pub(crate) dead: bool,
}

impl EnemyState {
    /// Creates a wave-scaled enemy on the spawn cell.
    pub(crate) fn spawn(id: EnemyId, wave: u32, class: EnemyClass, spawn: CellCoord) -> Self {
        let multiplier = HEALTH_GROWTH_RATE.powi(wave as i32);
        let (health, base_speed, reward) = match class {
            EnemyClass::Flying => (
                60.0 * multiplier,
                0.104,
                100 + (f64::from(wave) * 1.1) as u32,
            ),
            EnemyClass::Ground => (
                30.0 * multiplier,
                0.052 + wave as f32 * 0.001,
                10 + (f64::from(wave) * 1.15) as u32,
            ),
        };

        Self {
            id,
            class,
            position: GridPoint::from_cell(spawn),
            health,
            max_health: health,
            base_speed,
            reward,
            slow_factor: 1.0,
            slow_remaining: 0,
            dead: false,
        }
    }

    /// Merges a new slow: strongest factor wins, longest duration wins.
    pub(crate) fn apply_slow(&mut self, factor: f32, duration: u32) {
        self.slow_factor = self.slow_factor.min(factor);
        self.slow_remaining = self.slow_remaining.max(duration);
    }

    /// Burns one tick of slow time and returns this tick's speed.
    fn tick_speed(&mut self) -> f32 {
        if self.slow_remaining > 0 {
            self.slow_remaining -= 1;
            self.base_speed * self.slow_factor
        } else {
            self.slow_factor = 1.0;
            self.base_speed
        }
    }

    /// Applies damage, honoring the flying allow-list and the death latch.
    pub(crate) fn hit(&mut self, damage: f64, source: DamageSource) -> HitOutcome {
        if self.dead {
            return HitOutcome::Ignored;
        }
        if self.class == EnemyClass::Flying && !source.damages_flying() {
            return HitOutcome::Ignored;
        }

        self.health -= damage;
        if self.health <= 0.0 {
            self.dead = true;
            HitOutcome::Slain {
                reward: self.reward,
            }
        } else {
            HitOutcome::Wounded
        }
    }

    /// Restores full health; corpses awaiting cleanup stay down.
    pub(crate) fn heal_full(&mut self) {
        if !self.dead {
            self.health = self.max_health;
        }
    }
}

/// Applies a hit and performs the kill bookkeeping when it lands.
pub(crate) fn apply_hit(
    enemy: &mut EnemyState,
    damage: f64,
    source: DamageSource,
    economy: &mut Economy,
    out_events: &mut Vec<Event>,
) {
    if let HitOutcome::Slain { reward } = enemy.hit(damage, source) {
        economy.credit(f64::from(reward));
        out_events.push(Event::EnemySlain {
            enemy: enemy.id,
            reward,
        });
        out_events.push(Event::Explosion {
            at: enemy.position,
            radius: 0.5,
        });
    }
}

/// Moves every live enemy and books exit leaks.
pub(crate) fn tick_enemies(world: &mut World, out_events: &mut Vec<Event>) {
    let exit = world.exit;
    let exit_point = GridPoint::from_cell(exit);
    let mut leaked = Vec::new();

    for enemy in world.enemies.iter_mut() {
        if enemy.dead {
            continue;
        }

        let speed = enemy.tick_speed();
        let arrived = match enemy.class {
            EnemyClass::Flying => enemy.position.step_toward(exit_point, speed),
            EnemyClass::Ground => ground_step(&mut enemy.position, speed, &world.flow_field, exit),
        };

        if arrived {
            enemy.dead = true;
            leaked.push(enemy.id);
        }
    }

    for enemy in leaked {
        if world.game_over {
            break;
        }
        let lives_left = world.economy.burn_life();
        out_events.push(Event::EnemyLeaked { enemy, lives_left });
        if lives_left == 0 {
            crate::trigger_game_over(world, out_events);
        }
    }
}

/// Descends the flow-field gradient one tick; `true` means the exit was
/// reached.
///
/// From the enemy's current cell, the neighbor with the strictly lowest
/// distance wins, ties breaking by probe order. A cell that is already the
/// local minimum but not the exit is a dead end: the enemy holds position
/// until a grid change rebuilds the field.
fn ground_step(position: &mut GridPoint, speed: f32, field: &FlowField, exit: CellCoord) -> bool {
    let cell = position.cell();
    let mut best_cell = cell;
    let mut best_distance = field.distance(cell);

    for neighbor in cardinal_neighbors(cell) {
        let distance = field.distance(neighbor);
        if distance < best_distance {
            best_distance = distance;
            best_cell = neighbor;
        }
    }

    if best_cell == cell {
        if cell == exit {
            return position.step_toward(GridPoint::from_cell(exit), speed);
        }
        return false;
    }

    let _ = position.step_toward(GridPoint::from_cell(best_cell), speed);
    false
}
