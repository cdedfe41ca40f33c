//! What a sandbox team can see
//!
//! Every unit has a forward cone of its full vision range (±45° around its
//! facing) and an all-round circle of half that range. `TeamView` answers a
//! commander's roster and perception queries; `Battlefield::sightings` builds
//! the per-tick batch for its blackboard.

use std::collections::BTreeSet;
use std::f32::consts::FRAC_PI_4;

use ahash::AHashSet;

use crate::blackboard::{SightingBatch, SightingEvent, UnitSighting};
use crate::core::arena::EntityRegistry;
use crate::core::types::{EntityHandle, GridCoord, TeamId, Vec2};
use crate::sandbox::battlefield::{camp_sighting, relative_owner, wrap_angle, Battlefield};
use crate::sandbox::entity::{SandboxEntity, SandboxUnit};
use crate::team::roster::UnitSnapshot;
use crate::team::view::{PerceivedEntity, PerceivedKind, Sense, WorldView};

/// Half-angle of the forward vision cone
pub const CONE_HALF_ANGLE: f32 = FRAC_PI_4;
/// Awareness circle radius as a fraction of vision range
pub const CIRCLE_FRACTION: f32 = 0.5;

/// Whether `observer` notices `point` with `sense`
pub fn in_sense(observer: &SandboxUnit, point: Vec2, sense: Sense) -> bool {
    let offset = point - observer.position;
    let distance = offset.length();
    match sense {
        Sense::Circle => distance <= observer.vision_range * CIRCLE_FRACTION,
        Sense::Cone => {
            if distance > observer.vision_range {
                return false;
            }
            if distance <= f32::EPSILON {
                return true;
            }
            let bearing = offset.y.atan2(offset.x);
            wrap_angle(bearing - observer.facing).abs() <= CONE_HALF_ANGLE
        }
    }
}

pub fn in_view(observer: &SandboxUnit, point: Vec2) -> bool {
    in_sense(observer, point, Sense::Circle) || in_sense(observer, point, Sense::Cone)
}

fn snapshot(handle: EntityHandle, unit: &SandboxUnit) -> UnitSnapshot {
    UnitSnapshot {
        handle,
        archetype: unit.archetype,
        position: unit.position,
        health: unit.health,
        max_health: unit.max_health,
        motion: unit.motion,
        weapon_reloading: unit.is_reloading(),
        attack_target: unit.attack_target,
    }
}

fn unit_sighting(handle: EntityHandle, unit: &SandboxUnit) -> UnitSighting {
    UnitSighting {
        handle,
        archetype: unit.archetype,
        position: unit.position,
        health: unit.health,
        max_health: unit.max_health,
    }
}

/// One team's window onto the battlefield
#[derive(Debug, Clone, Copy)]
pub struct TeamView<'a> {
    field: &'a Battlefield,
    team: TeamId,
}

impl TeamView<'_> {
    pub fn team(&self) -> TeamId {
        self.team
    }
}

impl EntityRegistry for TeamView<'_> {
    fn is_alive(&self, handle: EntityHandle) -> bool {
        self.field.entities.contains(handle)
    }
}

impl WorldView for TeamView<'_> {
    fn team_units(&self) -> Vec<UnitSnapshot> {
        self.field
            .units_of(self.team)
            .map(|(handle, unit)| snapshot(handle, unit))
            .collect()
    }

    fn is_walkable(&self, cell: GridCoord) -> bool {
        self.field.terrain_at(cell).is_passable()
    }

    fn perceive(&self, unit: EntityHandle, sense: Sense) -> Vec<PerceivedEntity> {
        let Some(observer) = self.field.unit(unit) else {
            return Vec::new();
        };
        if observer.team != self.team {
            return Vec::new();
        }

        self.field
            .entities
            .iter()
            .filter_map(|(handle, entity)| {
                let kind = match entity {
                    SandboxEntity::Unit(other) if other.team != self.team => {
                        PerceivedKind::EnemyUnit(other.archetype)
                    }
                    SandboxEntity::Camp(camp) => {
                        PerceivedKind::Camp(relative_owner(camp.owner, self.team))
                    }
                    _ => return None,
                };
                let position = entity.position();
                in_sense(observer, position, sense).then_some(PerceivedEntity {
                    handle,
                    position,
                    kind,
                })
            })
            .collect()
    }
}

impl Battlefield {
    pub fn view(&self, team: TeamId) -> TeamView<'_> {
        TeamView { field: self, team }
    }

    /// Grid cells whose centres fall inside a unit's cone or circle
    pub fn cells_in_view(&self, observer: &SandboxUnit) -> Vec<GridCoord> {
        let layout = &self.layout;
        let reach = observer.vision_range;
        let low = layout.world_to_cell(observer.position - Vec2::splat(reach));
        let high = layout.world_to_cell(observer.position + Vec2::splat(reach));

        let mut cells = Vec::new();
        for y in low.y..=high.y {
            for x in low.x..=high.x {
                let cell = GridCoord::new(x, y);
                if layout.contains(cell) && in_view(observer, layout.cell_center(cell)) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Everything `team` noticed since its previous batch
    ///
    /// Order: seen cells, newly seen terrain, queued combat and ownership
    /// news, allied positions, own camps, visible enemies/camps/obstacles,
    /// then loss events for whatever dropped out of view.
    pub fn sightings(&mut self, team: TeamId) -> SightingBatch {
        let observers: Vec<(EntityHandle, SandboxUnit)> = self
            .units_of(team)
            .map(|(handle, unit)| (handle, unit.clone()))
            .collect();

        let mut batch = SightingBatch::new();

        let seen: BTreeSet<GridCoord> = observers
            .iter()
            .flat_map(|(_, unit)| self.cells_in_view(unit))
            .collect();
        batch.see_cells(seen.iter().copied());

        let fresh: Vec<GridCoord> = {
            let reported = self.terrain_reported.get(&team);
            seen.iter()
                .filter(|cell| reported.map_or(true, |known| !known.contains(*cell)))
                .copied()
                .collect()
        };
        for cell in fresh {
            batch.push(SightingEvent::Terrain {
                cell,
                kind: self.terrain_at(cell),
            });
            self.terrain_reported.entry(team).or_default().insert(cell);
        }

        batch.extend(self.pending.remove(&team).unwrap_or_default());

        for (handle, unit) in &observers {
            batch.push(SightingEvent::AllyMoved(unit_sighting(*handle, unit)));
        }

        let mut now_visible = AHashSet::new();
        for (handle, entity) in self.entities.iter() {
            let own = match entity {
                SandboxEntity::Unit(unit) if unit.team == team => continue,
                SandboxEntity::Camp(camp) => camp.owner == Some(team),
                _ => false,
            };
            let position = entity.position();
            if !own && !observers.iter().any(|(_, unit)| in_view(unit, position)) {
                continue;
            }
            now_visible.insert(handle);

            batch.push(match entity {
                SandboxEntity::Unit(unit) => SightingEvent::EnemyDetected(unit_sighting(handle, unit)),
                SandboxEntity::Camp(camp) => SightingEvent::CampDetected(camp_sighting(handle, camp, team)),
                SandboxEntity::Obstacle { position } => SightingEvent::ObstacleDetected {
                    handle,
                    position: *position,
                },
            });
        }

        let previous = self.visible.insert(team, now_visible).unwrap_or_default();
        let current = self.visible.get(&team);
        let mut lost: Vec<EntityHandle> = previous
            .into_iter()
            .filter(|handle| current.map_or(true, |now| !now.contains(handle)))
            .collect();
        lost.sort();
        for handle in lost {
            match self.entities.get(handle) {
                Some(SandboxEntity::Unit(_)) => batch.push(SightingEvent::EnemyLost(handle)),
                Some(SandboxEntity::Camp(_)) => batch.push(SightingEvent::CampLost(handle)),
                Some(SandboxEntity::Obstacle { .. }) => batch.push(SightingEvent::ObstacleLost(handle)),
                // dead handles are purged by the blackboard's registry check
                None => {}
            }
        }

        tracing::trace!(team = team.0, events = batch.len(), "Sightings built");
        batch
    }
}
