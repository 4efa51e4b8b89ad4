//! Authoritative tower state and the per-tick archetype behavior pass.

use arcade_defence_core::{
    BehaviorClass, CellCoord, DestructionCause, Event, GridPoint, TowerArchetype, TowerId,
};
use arcade_defence_system_targeting::{Assignment, EnemyProbe, TurretProbe};

use crate::enemies::{apply_hit, DamageSource, SLOW_DURATION};
use crate::projectiles::ProjectileState;
use crate::scheduler::PendingEffect;
use crate::World;

/// Distance at which a mine notices a ground enemy and detonates.
const MINE_TRIGGER_RADIUS: f32 = 0.8;

/// Per-level slow gained by the poison aura.
const POISON_SLOW_PER_LEVEL: f32 = 0.03;

/// Hardest slow the poison aura may reach; speed never hits zero.
const POISON_SLOW_FLOOR: f32 = 0.1;

/// Mutable state of a single placed tower.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) archetype: TowerArchetype,
    pub(crate) cell: CellCoord,
    pub(crate) level: u32,
    pub(crate) damage: f64,
    pub(crate) cooldown: u32,
    pub(crate) facing: f32,
    pub(crate) host: Option<TowerId>,
    pub(crate) pending_roll: bool,
}

impl TowerState {
    fn new(id: TowerId, archetype: TowerArchetype, cell: CellCoord, host: Option<TowerId>) -> Self {
        let stats = archetype.stats();
        Self {
            id,
            archetype,
            cell,
            level: stats.start_level,
            damage: stats.damage,
            cooldown: 0,
            facing: 0.0,
            host,
            pending_roll: false,
        }
    }

    /// Raises the level and scales damage by the archetype growth factor.
    pub(crate) fn upgrade(&mut self) {
        self.level = self.level.saturating_add(1);
        self.damage *= self.archetype.stats().upgrade_factor;
    }

    pub(crate) fn position(&self) -> GridPoint {
        GridPoint::from_cell(self.cell)
    }
}

/// Registry that stores towers in build order and allocates identifiers.
#[derive(Clone, Debug)]
pub(crate) struct TowerRegistry {
    entries: Vec<TowerState>,
    next_id: u32,
}

impl TowerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn insert(
        &mut self,
        archetype: TowerArchetype,
        cell: CellCoord,
        host: Option<TowerId>,
    ) -> TowerId {
        let id = TowerId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(TowerState::new(id, archetype, cell, host));
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        let index = self.entries.iter().position(|tower| tower.id == id)?;
        Some(self.entries.remove(index))
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.iter().find(|tower| tower.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.iter_mut().find(|tower| tower.id == id)
    }

    pub(crate) fn state_at(&self, index: usize) -> &TowerState {
        &self.entries[index]
    }

    pub(crate) fn state_at_mut(&mut self, index: usize) -> &mut TowerState {
        &mut self.entries[index]
    }

    /// Iterates towers in build order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.iter()
    }

    /// Tower eligible to host an overlay on the provided cell.
    pub(crate) fn host_candidate_at(&self, cell: CellCoord) -> Option<&TowerState> {
        self.entries.iter().find(|tower| {
            tower.cell == cell
                && !matches!(
                    tower.archetype,
                    TowerArchetype::Promoted | TowerArchetype::Mine
                )
        })
    }

    /// Tower a rolling hazard would collide with on the provided cell.
    pub(crate) fn collidable_at(&self, cell: CellCoord) -> Option<&TowerState> {
        self.entries
            .iter()
            .find(|tower| tower.cell == cell && tower.archetype != TowerArchetype::Promoted)
    }
}

/// Speed multiplier applied by an aura archetype at the provided level.
fn aura_factor(archetype: TowerArchetype, level: u32) -> f32 {
    match archetype {
        TowerArchetype::PoisonAura => {
            let deepened = level.saturating_sub(1) as f32 * POISON_SLOW_PER_LEVEL;
            (archetype.stats().slow_factor - deepened).max(POISON_SLOW_FLOOR)
        }
        _ => archetype.stats().slow_factor,
    }
}

/// Cannon damage multiplier contributed by every Powerup tower on the field.
fn powerup_multiplier(world: &World) -> f64 {
    world
        .towers
        .iter()
        .filter(|tower| tower.archetype == TowerArchetype::Powerup)
        .fold(1.0, |acc, tower| {
            acc * (1.0 + f64::from(tower.level) * world.config.powerup_bonus_per_level)
        })
}

/// Runs one behavior tick for every tower.
///
/// Auras and traps act first, in build order, mutating enemies directly.
/// Turret cooldowns then tick down, ready turrets are handed to the
/// targeting system as one batch, and the resulting assignments fire.
/// Towers destroyed mid-pass are collected and removed after the loop so
/// iteration never skips an entry.
pub(crate) fn tick_towers(world: &mut World, out_events: &mut Vec<Event>) {
    let mut destroyed: Vec<(TowerId, DestructionCause)> = Vec::new();

    contact_pass(world, &mut destroyed, out_events);
    let assignments = acquire_targets(world);
    fire_pass(world, &assignments, out_events);

    remove_destroyed(world, destroyed, out_events);
}

/// Aura slows and contact traps, in build order.
fn contact_pass(
    world: &mut World,
    destroyed: &mut Vec<(TowerId, DestructionCause)>,
    out_events: &mut Vec<Event>,
) {
    for index in 0..world.towers.len() {
        let (id, archetype, level) = {
            let tower = world.towers.state_at(index);
            (tower.id, tower.archetype, tower.level)
        };
        let stats = archetype.stats();
        let position = world.towers.state_at(index).position();

        match archetype.behavior() {
            BehaviorClass::Aura => {
                let factor = aura_factor(archetype, level);
                for enemy in world.enemies.iter_mut() {
                    if enemy.dead || !stats.target_class.accepts(enemy.class) {
                        continue;
                    }
                    if position.distance_to(enemy.position) <= stats.range {
                        enemy.apply_slow(factor, SLOW_DURATION);
                    }
                }
            }
            BehaviorClass::ContactTrap => match archetype {
                TowerArchetype::Mine => {
                    let triggered = world.enemies.iter().any(|enemy| {
                        !enemy.dead
                            && stats.target_class.accepts(enemy.class)
                            && position.distance_to(enemy.position) < MINE_TRIGGER_RADIUS
                    });
                    if triggered {
                        out_events.push(Event::Explosion {
                            at: position,
                            radius: stats.range,
                        });
                        for enemy in world.enemies.iter_mut() {
                            if !stats.target_class.accepts(enemy.class) {
                                continue;
                            }
                            if position.distance_to(enemy.position) <= stats.range {
                                apply_hit(
                                    enemy,
                                    stats.damage,
                                    DamageSource::Tower(archetype),
                                    &mut world.economy,
                                    out_events,
                                );
                            }
                        }
                        destroyed.push((id, DestructionCause::Detonated));
                    }
                }
                TowerArchetype::Pacman => {
                    let mut charges = level;
                    for enemy in world.enemies.iter_mut() {
                        if enemy.dead || !stats.target_class.accepts(enemy.class) {
                            continue;
                        }
                        if position.distance_to(enemy.position) >= stats.range {
                            continue;
                        }

                        apply_hit(
                            enemy,
                            stats.damage,
                            DamageSource::Tower(archetype),
                            &mut world.economy,
                            out_events,
                        );
                        out_events.push(Event::Explosion {
                            at: position,
                            radius: 0.5,
                        });
                        charges = charges.saturating_sub(1);
                        if charges == 0 {
                            destroyed.push((id, DestructionCause::Exhausted));
                            break;
                        }
                    }
                    world.towers.state_at_mut(index).level = charges;
                }
                _ => {}
            },
            BehaviorClass::Blocker
            | BehaviorClass::Passive
            | BehaviorClass::DirectFire
            | BehaviorClass::Randomized => {}
        }
    }
}

/// Ticks turret cooldowns and batches ready turrets through the targeting
/// system.
fn acquire_targets(world: &mut World) -> Vec<Assignment> {
    let mut turrets: Vec<TurretProbe> = Vec::new();

    for index in 0..world.towers.len() {
        let tower = world.towers.state_at_mut(index);
        let behavior = tower.archetype.behavior();
        if !matches!(
            behavior,
            BehaviorClass::DirectFire | BehaviorClass::Randomized
        ) {
            continue;
        }

        if tower.cooldown > 0 {
            tower.cooldown -= 1;
        }
        if tower.cooldown > 0 {
            continue;
        }
        if behavior == BehaviorClass::Randomized && tower.pending_roll {
            continue;
        }

        let stats = tower.archetype.stats();
        turrets.push(TurretProbe {
            id: tower.id,
            position: tower.position(),
            range: stats.range,
            class: stats.target_class,
        });
    }

    let probes: Vec<EnemyProbe> = world
        .enemies
        .iter()
        .filter(|enemy| !enemy.dead)
        .map(|enemy| EnemyProbe {
            id: enemy.id,
            position: enemy.position,
            class: enemy.class,
        })
        .collect();

    let mut assignments = Vec::new();
    world.targeting.handle(&turrets, &probes, &mut assignments);
    assignments
}

/// Fires projectiles and arms dice rolls for the acquired targets.
fn fire_pass(world: &mut World, assignments: &[Assignment], out_events: &mut Vec<Event>) {
    let cannon_multiplier = powerup_multiplier(world);

    for assignment in assignments {
        let Some((archetype, position, leveled_damage)) = world
            .towers
            .get(assignment.tower)
            .map(|tower| (tower.archetype, tower.position(), tower.damage))
        else {
            continue;
        };
        let stats = archetype.stats();

        if archetype.behavior() == BehaviorClass::Randomized {
            if let Some(tower) = world.towers.get_mut(assignment.tower) {
                tower.pending_roll = true;
                tower.cooldown = stats.fire_rate;
            }
            world.scheduler.schedule(
                world.config.dice_resolve_delay,
                PendingEffect::DiceResolution {
                    tower: assignment.tower,
                },
            );
            out_events.push(Event::DiceScheduled {
                tower: assignment.tower,
            });
            continue;
        }

        let mut damage = leveled_damage;
        if archetype == TowerArchetype::Cannon {
            damage *= cannon_multiplier;
        }

        let projectile = world.allocate_projectile_id();
        world.projectiles.push(ProjectileState::new(
            projectile,
            position,
            assignment.enemy,
            assignment.enemy_position,
            damage,
            archetype,
        ));
        out_events.push(Event::ProjectileFired {
            projectile,
            tower: assignment.tower,
            target: assignment.enemy,
        });

        if let Some(tower) = world.towers.get_mut(assignment.tower) {
            tower.facing = (assignment.enemy_position.y() - position.y())
                .atan2(assignment.enemy_position.x() - position.x());
            tower.cooldown = stats.fire_rate;
        }
    }
}

/// Applies wave-end passive effects in build order: hearts burn a life for
/// doubled money, promoted overlays upgrade their hosts and pay upkeep.
pub(crate) fn wave_end_effects(world: &mut World, out_events: &mut Vec<Event>) {
    let ids: Vec<TowerId> = world.towers.iter().map(|tower| tower.id).collect();
    let mut destroyed: Vec<(TowerId, DestructionCause)> = Vec::new();

    for id in ids {
        if world.game_over {
            break;
        }
        let Some((archetype, cell, host)) = world
            .towers
            .get(id)
            .map(|tower| (tower.archetype, tower.cell, tower.host))
        else {
            continue;
        };

        match archetype {
            TowerArchetype::Heart => {
                if world.economy.lives() == 0 {
                    continue;
                }
                let lives_left = world.economy.burn_life();
                world.economy.double_money();
                out_events.push(Event::Explosion {
                    at: GridPoint::from_cell(cell),
                    radius: 1.0,
                });
                if lives_left == 0 {
                    crate::trigger_game_over(world, out_events);
                }
            }
            TowerArchetype::Promoted => {
                let Some(host_id) = host else {
                    destroyed.push((id, DestructionCause::HostLost));
                    continue;
                };

                let upgraded = world.towers.get_mut(host_id).map(|host_tower| {
                    host_tower.upgrade();
                    (
                        host_tower.level,
                        host_tower.archetype.upgrade_cost(host_tower.level),
                    )
                });

                match upgraded {
                    None => destroyed.push((id, DestructionCause::HostLost)),
                    Some((level, upkeep)) => {
                        out_events.push(Event::TowerUpgraded {
                            tower: host_id,
                            level,
                        });
                        out_events.push(Event::Explosion {
                            at: GridPoint::from_cell(cell),
                            radius: 0.5,
                        });
                        // The host keeps the level even when the upkeep bounces.
                        if !world.economy.try_spend(f64::from(upkeep)) {
                            destroyed.push((id, DestructionCause::UpkeepUnpaid));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    remove_destroyed(world, destroyed, out_events);
}

fn remove_destroyed(
    world: &mut World,
    destroyed: Vec<(TowerId, DestructionCause)>,
    out_events: &mut Vec<Event>,
) {
    if destroyed.is_empty() {
        return;
    }

    for (id, cause) in destroyed {
        if let Some(state) = world.towers.remove(id) {
            if state.archetype.stats().blocks_cell {
                world.grid.set_blocked(state.cell, false);
            }
            out_events.push(Event::TowerDestroyed { tower: id, cause });
        }
    }

    world.flow_field.rebuild(world.exit, &world.grid);
}
