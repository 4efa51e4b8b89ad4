#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure spatial queries that pick deterministic targets from entity snapshots.
//!
//! The world calls into this crate during its tower pass: ready turrets get a
//! nearest-in-range assignment, while auras, blasts and hazards reuse the
//! radius sweep. Nothing here mutates simulation state.

use arcade_defence_core::{EnemyClass, EnemyId, GridPoint, TargetClass, TowerId};

/// Position and movement class of a live enemy, captured for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyProbe {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Current position in grid units.
    pub position: GridPoint,
    /// Movement class used for targeting-class filtering.
    pub class: EnemyClass,
}

/// A turret that finished its cooldown and wants a target this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretProbe {
    /// Identifier of the turret.
    pub id: TowerId,
    /// Center of the turret in grid units.
    pub position: GridPoint,
    /// Targeting radius in grid units.
    pub range: f32,
    /// Enemy movement classes the turret may engage.
    pub class: TargetClass,
}

/// Pairing of a ready turret with the enemy it should engage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Assignment {
    /// Turret that acquired a target.
    pub tower: TowerId,
    /// Enemy selected for engagement.
    pub enemy: EnemyId,
    /// Position of the enemy at selection time.
    pub enemy_position: GridPoint,
}

/// Targeting system that reuses a scratch buffer across ticks.
#[derive(Debug, Default)]
pub struct Targeting {
    scratch: Vec<Assignment>,
}

impl Targeting {
    /// Creates a new targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns each ready turret its nearest compatible in-range enemy.
    ///
    /// Turrets without a compatible enemy in range are simply absent from the
    /// output. The output buffer is cleared before being populated.
    pub fn handle(&mut self, turrets: &[TurretProbe], enemies: &[EnemyProbe], out: &mut Vec<Assignment>) {
        out.clear();
        if turrets.is_empty() || enemies.is_empty() {
            return;
        }

        self.scratch.clear();
        self.scratch.reserve(turrets.len());

        for turret in turrets {
            if let Some(probe) = select_nearest(turret.position, turret.range, turret.class, enemies)
            {
                self.scratch.push(Assignment {
                    tower: turret.id,
                    enemy: probe.id,
                    enemy_position: probe.position,
                });
            }
        }

        out.append(&mut self.scratch);
    }
}

/// Selects the nearest enemy within `range` that the targeting class accepts.
///
/// Ties break toward the first enemy encountered, so callers must present
/// probes in a stable order to keep replays deterministic.
#[must_use]
pub fn select_nearest(
    origin: GridPoint,
    range: f32,
    class: TargetClass,
    enemies: &[EnemyProbe],
) -> Option<&EnemyProbe> {
    let mut best: Option<(&EnemyProbe, f32)> = None;

    for probe in enemies {
        if !class.accepts(probe.class) {
            continue;
        }

        let distance = origin.distance_to(probe.position);
        if distance > range {
            continue;
        }

        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((probe, distance)),
        }
    }

    best.map(|(probe, _)| probe)
}

/// Iterates over enemies within `radius` of `center`, in probe order.
pub fn within_radius<'a>(
    center: GridPoint,
    radius: f32,
    enemies: &'a [EnemyProbe],
) -> impl Iterator<Item = &'a EnemyProbe> {
    enemies
        .iter()
        .filter(move |probe| center.distance_to(probe.position) <= radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(id: u32, x: f32, y: f32, class: EnemyClass) -> EnemyProbe {
        EnemyProbe {
            id: EnemyId::new(id),
            position: GridPoint::new(x, y),
            class,
        }
    }

    fn turret(id: u32, x: f32, y: f32, range: f32, class: TargetClass) -> TurretProbe {
        TurretProbe {
            id: TowerId::new(id),
            position: GridPoint::new(x, y),
            range,
            class,
        }
    }

    #[test]
    fn selects_nearest_compatible_enemy() {
        let enemies = [
            probe(0, 5.0, 0.0, EnemyClass::Ground),
            probe(1, 2.0, 0.0, EnemyClass::Ground),
            probe(2, 1.0, 0.0, EnemyClass::Flying),
        ];

        let chosen = select_nearest(
            GridPoint::new(0.0, 0.0),
            6.0,
            TargetClass::Ground,
            &enemies,
        )
        .expect("target");
        assert_eq!(chosen.id, EnemyId::new(1));
    }

    #[test]
    fn ties_break_toward_first_probe() {
        let enemies = [
            probe(4, 3.0, 0.0, EnemyClass::Ground),
            probe(9, 0.0, 3.0, EnemyClass::Ground),
        ];

        let chosen = select_nearest(GridPoint::new(0.0, 0.0), 5.0, TargetClass::All, &enemies)
            .expect("target");
        assert_eq!(chosen.id, EnemyId::new(4));
    }

    #[test]
    fn out_of_range_enemies_are_ignored() {
        let enemies = [probe(0, 10.0, 0.0, EnemyClass::Ground)];
        assert!(
            select_nearest(GridPoint::new(0.0, 0.0), 2.0, TargetClass::All, &enemies).is_none()
        );
    }

    #[test]
    fn air_turrets_never_acquire_ground_targets() {
        let enemies = [probe(0, 1.0, 0.0, EnemyClass::Ground)];
        assert!(
            select_nearest(GridPoint::new(0.0, 0.0), 5.0, TargetClass::Air, &enemies).is_none()
        );
    }

    #[test]
    fn radius_sweep_includes_boundary_enemies() {
        let enemies = [
            probe(0, 1.5, 0.0, EnemyClass::Ground),
            probe(1, 1.6, 0.0, EnemyClass::Ground),
        ];

        let hits: Vec<_> = within_radius(GridPoint::new(0.0, 0.0), 1.5, &enemies)
            .map(|probe| probe.id)
            .collect();
        assert_eq!(hits, vec![EnemyId::new(0)]);
    }

    #[test]
    fn handle_assigns_each_ready_turret_independently() {
        let mut system = Targeting::new();
        let turrets = [
            turret(0, 0.0, 0.0, 3.0, TargetClass::Ground),
            turret(1, 10.0, 0.0, 3.0, TargetClass::All),
            turret(2, 20.0, 0.0, 1.0, TargetClass::All),
        ];
        let enemies = [
            probe(5, 1.0, 0.0, EnemyClass::Ground),
            probe(6, 9.0, 0.0, EnemyClass::Flying),
        ];
        let mut out = Vec::new();

        system.handle(&turrets, &enemies, &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].tower, TowerId::new(0));
        assert_eq!(out[0].enemy, EnemyId::new(5));
        assert_eq!(out[1].tower, TowerId::new(1));
        assert_eq!(out[1].enemy, EnemyId::new(6));
    }

    #[test]
    fn handle_clears_previous_assignments() {
        let mut system = Targeting::new();
        let mut out = vec![Assignment {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
            enemy_position: GridPoint::new(0.0, 0.0),
        }];

        system.handle(&[], &[], &mut out);

        assert!(out.is_empty());
    }
}
