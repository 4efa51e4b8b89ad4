//! Rolling-ball hazard: an independent actor hostile to both sides.

use arcade_defence_core::{
    CellCoord, DestructionCause, Event, GridPoint, HazardId, TowerArchetype, GRID_COLUMNS,
    GRID_ROWS, LETHAL_DAMAGE,
};

use crate::enemies::{apply_hit, DamageSource};
use crate::navigation::UNREACHABLE;
use crate::World;

/// Glide speed of the ball in grid units per tick.
const HAZARD_SPEED: f32 = 0.15;

/// Radius within which ground enemies are crushed.
const CONTACT_RADIUS: f32 = 0.5;

/// How close to a cell center the ball must be to pick its next move.
const CENTER_SNAP: f32 = 0.1;

/// A ball rolling from the spawn toward the exit on a biased-random path.
#[derive(Clone, Debug)]
pub(crate) struct HazardState {
    pub(crate) id: HazardId,
    pub(crate) position: GridPoint,
    pub(crate) heading: Option<CellCoord>,
    pub(crate) spent: bool,
}

impl HazardState {
    pub(crate) fn new(id: HazardId, spawn: CellCoord) -> Self {
        Self {
            id,
            position: GridPoint::from_cell(spawn),
            heading: None,
            spent: false,
        }
    }
}

/// Advances every hazard ball one tick.
///
/// At each cell center the ball first crushes any non-overlay tower (a wall
/// also stops the ball), then leaves if it reached the exit, then picks its
/// next cell: a coin flip between the flow-field-optimal neighbor and a
/// uniformly random in-bounds one. Ground enemies under the ball die every
/// tick, not just at centers.
pub(crate) fn tick_hazards(world: &mut World, out_events: &mut Vec<Event>) {
    for index in 0..world.hazards.len() {
        if world.hazards[index].spent {
            continue;
        }

        let position = world.hazards[index].position;
        let near_center = (position.x() - position.x().round()).abs() < CENTER_SNAP
            && (position.y() - position.y().round()).abs() < CENTER_SNAP;

        if near_center {
            let cell = CellCoord::new(
                position.x().round().max(0.0) as u32,
                position.y().round().max(0.0) as u32,
            );
            world.hazards[index].position = GridPoint::from_cell(cell);

            crush_tower(world, index, cell, out_events);
            if world.hazards[index].spent {
                continue;
            }

            if cell == world.exit {
                world.hazards[index].spent = true;
                out_events.push(Event::HazardRemoved {
                    hazard: world.hazards[index].id,
                });
                continue;
            }

            let heading = pick_heading(world, cell);
            world.hazards[index].heading = heading;
        }

        if let Some(heading) = world.hazards[index].heading {
            let _ = world.hazards[index]
                .position
                .step_toward(GridPoint::from_cell(heading), HAZARD_SPEED);
        }

        let position = world.hazards[index].position;
        for enemy in world.enemies.iter_mut() {
            if enemy.dead {
                continue;
            }
            if position.distance_to(enemy.position) < CONTACT_RADIUS {
                apply_hit(
                    enemy,
                    LETHAL_DAMAGE,
                    DamageSource::Hazard,
                    &mut world.economy,
                    out_events,
                );
            }
        }
    }

    world.hazards.retain(|hazard| !hazard.spent);
}

/// Destroys the tower under the ball, stopping the ball on walls.
fn crush_tower(world: &mut World, index: usize, cell: CellCoord, out_events: &mut Vec<Event>) {
    let Some((tower_id, archetype)) = world
        .towers
        .collidable_at(cell)
        .map(|tower| (tower.id, tower.archetype))
    else {
        return;
    };

    if archetype == TowerArchetype::Wall {
        world.hazards[index].spent = true;
        out_events.push(Event::HazardRemoved {
            hazard: world.hazards[index].id,
        });
    }

    if let Some(state) = world.towers.remove(tower_id) {
        if state.archetype.stats().blocks_cell {
            world.grid.set_blocked(state.cell, false);
        }
        out_events.push(Event::TowerDestroyed {
            tower: tower_id,
            cause: DestructionCause::Rolled,
        });
        out_events.push(Event::Explosion {
            at: GridPoint::from_cell(cell),
            radius: 0.5,
        });
        world.flow_field.rebuild(world.exit, &world.grid);
    }
}

/// Coin flip between the flow-optimal neighbor and a random legal one.
fn pick_heading(world: &mut World, cell: CellCoord) -> Option<CellCoord> {
    let neighbors = hazard_neighbors(cell);
    if neighbors.is_empty() {
        return None;
    }

    let best = neighbors
        .iter()
        .copied()
        .min_by_key(|neighbor| world.flow_field.distance(*neighbor))
        .filter(|neighbor| world.flow_field.distance(*neighbor) < UNREACHABLE);

    if world.rng.chance(0.5) {
        if best.is_some() {
            return best;
        }
    }

    Some(neighbors[world.rng.pick_index(neighbors.len())])
}

/// In-bounds neighbors probed in the ball's own order: down, up, right,
/// left.
fn hazard_neighbors(cell: CellCoord) -> Vec<CellCoord> {
    let mut neighbors = Vec::with_capacity(4);
    if cell.row() + 1 < GRID_ROWS {
        neighbors.push(CellCoord::new(cell.column(), cell.row() + 1));
    }
    if let Some(row) = cell.row().checked_sub(1) {
        neighbors.push(CellCoord::new(cell.column(), row));
    }
    if cell.column() + 1 < GRID_COLUMNS {
        neighbors.push(CellCoord::new(cell.column() + 1, cell.row()));
    }
    if let Some(column) = cell.column().checked_sub(1) {
        neighbors.push(CellCoord::new(column, cell.row()));
    }
    neighbors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enemies::EnemyState;
    use crate::{apply, World};
    use arcade_defence_core::{Command, EnemyClass, EnemyId, TowerArchetype};

    fn build(world: &mut World, cell: CellCoord, archetype: TowerArchetype) {
        let mut events = Vec::new();
        apply(world, Command::Build { cell, archetype }, &mut events);
        assert!(
            matches!(events.as_slice(), [Event::TowerBuilt { .. }]),
            "build failed: {events:?}",
        );
    }

    fn drop_ball(world: &mut World, cell: CellCoord) -> HazardId {
        let id = HazardId::new(world.hazards.len() as u32);
        world.hazards.push(HazardState {
            id,
            position: GridPoint::from_cell(cell),
            heading: None,
            spent: false,
        });
        id
    }

    #[test]
    fn ball_crushes_a_turret_and_rolls_on() {
        let mut world = World::new();
        let cell = CellCoord::new(5, 7);
        build(&mut world, cell, TowerArchetype::Cannon);
        let _ = drop_ball(&mut world, cell);
        let mut events = Vec::new();

        tick_hazards(&mut world, &mut events);

        assert!(events.iter().any(|event| matches!(
            event,
            Event::TowerDestroyed {
                cause: DestructionCause::Rolled,
                ..
            },
        )));
        assert!(!world.grid.is_blocked(cell));
        assert_eq!(world.hazards.len(), 1);
    }

    #[test]
    fn ball_and_wall_destroy_each_other() {
        let mut world = World::new();
        let cell = CellCoord::new(5, 7);
        build(&mut world, cell, TowerArchetype::Wall);
        let ball = drop_ball(&mut world, cell);
        let mut events = Vec::new();

        tick_hazards(&mut world, &mut events);

        assert!(events.contains(&Event::HazardRemoved { hazard: ball }));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::TowerDestroyed {
                cause: DestructionCause::Rolled,
                ..
            },
        )));
        assert!(world.hazards.is_empty());
        assert!(!world.grid.is_blocked(cell));
    }

    #[test]
    fn ball_flattens_ground_enemies_but_not_flyers() {
        let mut world = World::new();
        let _ = drop_ball(&mut world, CellCoord::new(5, 7));

        let mut grounded = EnemyState::spawn(
            EnemyId::new(0),
            1,
            EnemyClass::Ground,
            CellCoord::new(0, 7),
        );
        grounded.position = GridPoint::new(5.3, 7.0);
        world.enemies.push(grounded);

        let mut flyer = EnemyState::spawn(
            EnemyId::new(1),
            1,
            EnemyClass::Flying,
            CellCoord::new(0, 7),
        );
        flyer.position = GridPoint::new(5.3, 7.0);
        world.enemies.push(flyer);

        let mut events = Vec::new();
        tick_hazards(&mut world, &mut events);

        assert!(world.enemies[0].dead);
        assert!(!world.enemies[1].dead);
    }

    #[test]
    fn ball_leaves_the_maze_on_the_exit_cell() {
        let mut world = World::new();
        let exit = world.exit;
        let ball = drop_ball(&mut world, exit);
        let mut events = Vec::new();

        tick_hazards(&mut world, &mut events);

        assert!(events.contains(&Event::HazardRemoved { hazard: ball }));
        assert!(world.hazards.is_empty());
    }

    #[test]
    fn hazard_neighbors_probe_down_up_right_left() {
        let order = hazard_neighbors(CellCoord::new(5, 5));
        assert_eq!(
            order,
            vec![
                CellCoord::new(5, 6),
                CellCoord::new(5, 4),
                CellCoord::new(6, 5),
                CellCoord::new(4, 5),
            ],
        );
    }

    #[test]
    fn corner_cells_only_offer_legal_neighbors() {
        let order = hazard_neighbors(CellCoord::new(0, 0));
        assert_eq!(order, vec![CellCoord::new(0, 1), CellCoord::new(1, 0)]);
    }
}
