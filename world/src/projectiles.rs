//! Projectile flight and impact resolution.

use arcade_defence_core::{EnemyId, Event, GridPoint, ProjectileId, TowerArchetype};

use crate::enemies::{apply_hit, DamageSource};
use crate::World;

/// A projectile in flight toward a weakly-referenced enemy.
#[derive(Clone, Debug)]
pub(crate) struct ProjectileState {
    pub(crate) id: ProjectileId,
    pub(crate) position: GridPoint,
    pub(crate) target: EnemyId,
    pub(crate) last_known: GridPoint,
    pub(crate) damage: f64,
    pub(crate) source: TowerArchetype,
    pub(crate) speed: f32,
    pub(crate) aoe_radius: f32,
    /// Keeps flying to the target's last position after the target dies;
    /// only the bazooka carries this flag.
    pub(crate) pursues_corpse: bool,
    pub(crate) spent: bool,
}

impl ProjectileState {
    pub(crate) fn new(
        id: ProjectileId,
        origin: GridPoint,
        target: EnemyId,
        target_position: GridPoint,
        damage: f64,
        source: TowerArchetype,
    ) -> Self {
        let stats = source.stats();
        Self {
            id,
            position: origin,
            target,
            last_known: target_position,
            damage,
            source,
            speed: stats.projectile_speed,
            aoe_radius: stats.aoe_radius,
            pursues_corpse: source == TowerArchetype::Bazooka,
            spent: false,
        }
    }
}

/// Advances every projectile and resolves arrivals.
///
/// A projectile whose target is gone self-terminates without effect unless
/// it pursues corpses, in which case it detonates on the last known
/// position. Area projectiles damage every enemy around the impact point,
/// not just the original target.
pub(crate) fn tick_projectiles(world: &mut World, out_events: &mut Vec<Event>) {
    for index in 0..world.projectiles.len() {
        if world.projectiles[index].spent {
            continue;
        }

        let target = world.projectiles[index].target;
        let live_position = world
            .enemies
            .iter()
            .find(|enemy| enemy.id == target && !enemy.dead)
            .map(|enemy| enemy.position);

        match live_position {
            Some(position) => world.projectiles[index].last_known = position,
            None if !world.projectiles[index].pursues_corpse => {
                world.projectiles[index].spent = true;
                continue;
            }
            None => {}
        }

        let destination = world.projectiles[index].last_known;
        let speed = world.projectiles[index].speed;
        if !world.projectiles[index]
            .position
            .step_toward(destination, speed)
        {
            continue;
        }

        world.projectiles[index].spent = true;
        let damage = world.projectiles[index].damage;
        let source = world.projectiles[index].source;
        let aoe_radius = world.projectiles[index].aoe_radius;

        if aoe_radius > 0.0 {
            out_events.push(Event::Explosion {
                at: destination,
                radius: aoe_radius,
            });
            for enemy in world.enemies.iter_mut() {
                if destination.distance_to(enemy.position) <= aoe_radius {
                    apply_hit(
                        enemy,
                        damage,
                        DamageSource::Tower(source),
                        &mut world.economy,
                        out_events,
                    );
                }
            }
        } else if let Some(enemy) = world.enemies.iter_mut().find(|enemy| enemy.id == target) {
            apply_hit(
                enemy,
                damage,
                DamageSource::Tower(source),
                &mut world.economy,
                out_events,
            );
        }
    }

    world.projectiles.retain(|projectile| !projectile.spent);
}
