// p_setup.rs — level construction, the actor pool and the per-map context

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sectormove_common::common::{com_dprintf, com_printf, com_wprintf};
use sectormove_common::shared::*;
use thiserror::Error;

use crate::game_import::GameImport;
use crate::p_config::MoveConfig;
use crate::p_local::*;
use crate::p_world::AreaIndex;

/// Content problems caught while building a level or spawning into it.
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("level has no regions")]
    NoRegions,
    #[error("boundary {0} has zero length")]
    DegenerateBoundary(BoundaryId),
    #[error("boundary {boundary} refers to missing region {region}")]
    UnknownRegion { boundary: BoundaryId, region: RegionId },
    #[error("actor radius must be positive, got {0}")]
    BadRadius(f32),
    #[error("actor radius {0} exceeds the maximum of {}", MAXRADIUS)]
    RadiusTooLarge(f32),
    #[error("unknown archetype {0}")]
    UnknownArchetype(ArchetypeId),
    #[error("reject matrix is {got} entries, expected {expected}")]
    BadReject { got: usize, expected: usize },
}

// ============================================================
// Actor pool
// ============================================================

#[derive(Debug, Clone)]
struct ActorSlot {
    generation: u32,
    actor: Option<Actor>,
}

/// Slot storage with generation-checked handles.
#[derive(Debug, Clone, Default)]
pub struct ActorPool {
    slots: Vec<ActorSlot>,
    free: Vec<u32>,
}

impl ActorPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, actor: Actor) -> ActorId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.actor = Some(actor);
            return ActorId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(ActorSlot {
            generation: 0,
            actor: Some(actor),
        });
        ActorId { index, generation: 0 }
    }

    pub fn remove(&mut self, id: ActorId) -> Option<Actor> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let actor = slot.actor.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(actor)
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.actor.as_ref()
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.actor.as_mut()
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.actor.as_ref().map(|a| {
                (
                    ActorId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    a,
                )
            })
        })
    }
}

// ============================================================
// Reject matrix
// ============================================================

/// Region pairs that can never see each other.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectMatrix {
    num_regions: usize,
    bits: Vec<bool>,
}

impl RejectMatrix {
    pub fn new(num_regions: usize) -> Self {
        Self {
            num_regions,
            bits: vec![false; num_regions * num_regions],
        }
    }

    /// Mark the pair as never visible, both ways.
    pub fn set_blocked(&mut self, a: RegionId, b: RegionId) {
        self.bits[a * self.num_regions + b] = true;
        self.bits[b * self.num_regions + a] = true;
    }

    pub fn is_blocked(&self, a: RegionId, b: RegionId) -> bool {
        self.bits
            .get(a * self.num_regions + b)
            .copied()
            .unwrap_or(false)
    }
}

// ============================================================
// Level
// ============================================================

#[derive(Debug, Clone)]
pub struct Level {
    pub regions: Vec<Region>,
    pub boundaries: Vec<Boundary>,
    pub archetypes: Vec<Archetype>,
    pub actors: ActorPool,
    pub index: AreaIndex,
    pub reject: Option<RejectMatrix>,
}

impl Level {
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn archetype(&self, actor: &Actor) -> &Archetype {
        // spawn_actor checked the index
        &self.archetypes[actor.archetype]
    }

    /// Place a new actor, filling in its region and floor/ceiling heights
    /// from the spot it stands on.
    pub fn spawn_actor(&mut self, mut actor: Actor) -> Result<ActorId, LevelError> {
        if actor.radius <= 0.0 || !actor.radius.is_finite() {
            return Err(LevelError::BadRadius(actor.radius));
        }
        // neighbour searches only reach MAXRADIUS past a footprint
        if actor.radius > MAXRADIUS {
            return Err(LevelError::RadiusTooLarge(actor.radius));
        }
        if actor.archetype >= self.archetypes.len() {
            return Err(LevelError::UnknownArchetype(actor.archetype));
        }

        let region = self.point_region(actor.origin[0], actor.origin[1]);
        let sec = &self.regions[region];
        actor.region = region;
        actor.floorz = sec.floor_height;
        actor.dropoffz = sec.floor_height;
        actor.ceilingz = sec.ceiling_height;
        actor.area_node = None;

        let id = self.actors.insert(actor);
        self.link_actor(id);
        Ok(id)
    }

    /// Unlink and drop an actor. Its handle stops resolving.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        self.unlink_actor(id);
        self.actors.remove(id)
    }

    pub(crate) fn unlink_actor(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(id) else { return };
        if let Some(node) = actor.area_node.take() {
            self.index.unlink_actor(id, node);
        }
    }

    pub(crate) fn link_actor(&mut self, id: ActorId) {
        let Some(actor) = self.actors.get_mut(id) else { return };
        if let Some(node) = actor.area_node.take() {
            self.index.unlink_actor(id, node);
        }
        if actor.flags.contains(ActorFlags::NOBLOCKMAP) {
            return;
        }
        let footprint = actor.bbox();
        actor.area_node = Some(self.index.link_actor(id, &footprint));
    }
}

#[derive(Debug, Default)]
pub struct LevelBuilder {
    regions: Vec<Region>,
    boundaries: Vec<Boundary>,
    archetypes: Vec<Archetype>,
    reject: Option<RejectMatrix>,
}

impl LevelBuilder {
    /// Starts with a plain archetype at index 0.
    pub fn new() -> Self {
        Self {
            archetypes: vec![Archetype::new("default", 0, ArchetypeTraits::empty())],
            ..Default::default()
        }
    }

    pub fn add_region(&mut self, region: Region) -> RegionId {
        self.regions.push(region);
        self.regions.len() - 1
    }

    pub fn add_boundary(&mut self, boundary: Boundary) -> BoundaryId {
        self.boundaries.push(boundary);
        self.boundaries.len() - 1
    }

    pub fn add_archetype(&mut self, archetype: Archetype) -> ArchetypeId {
        self.archetypes.push(archetype);
        self.archetypes.len() - 1
    }

    pub fn reject(&mut self, reject: RejectMatrix) -> &mut Self {
        self.reject = Some(reject);
        self
    }

    pub fn build(self) -> Result<Level, LevelError> {
        let LevelBuilder {
            mut regions,
            boundaries,
            archetypes,
            reject,
        } = self;

        if regions.is_empty() {
            return Err(LevelError::NoRegions);
        }
        if let Some(reject) = &reject {
            let expected = regions.len() * regions.len();
            if reject.num_regions != regions.len() {
                return Err(LevelError::BadReject {
                    got: reject.bits.len(),
                    expected,
                });
            }
        }

        let mut bounds = BBox::cleared();
        for (id, line) in boundaries.iter().enumerate() {
            if line.delta == VEC2_ORIGIN {
                return Err(LevelError::DegenerateBoundary(id));
            }
            for region in std::iter::once(line.front).chain(line.back) {
                if region >= regions.len() {
                    return Err(LevelError::UnknownRegion { boundary: id, region });
                }
                regions[region].bbox.add_box(&line.bbox);
                if !regions[region].boundaries.contains(&id) {
                    regions[region].boundaries.push(id);
                }
            }
            bounds.add_box(&line.bbox);
        }
        if boundaries.is_empty() {
            bounds = BBox::around(0.0, 0.0, 1.0);
        } else {
            for (id, region) in regions.iter().enumerate() {
                if region.boundaries.is_empty() {
                    com_wprintf(&format!("region {} has no boundaries\n", id));
                }
            }
        }

        let mut index = AreaIndex::new(&bounds.expand(MAXRADIUS));
        for (id, line) in boundaries.iter().enumerate() {
            index.link_boundary(id, &line.bbox);
        }

        com_dprintf(&format!(
            "level built: {} regions, {} boundaries\n",
            regions.len(),
            boundaries.len()
        ));

        Ok(Level {
            regions,
            boundaries,
            archetypes,
            actors: ActorPool::new(),
            index,
            reject,
        })
    }
}

// ============================================================
// Map context
// ============================================================

/// Everything one running map owns: geometry, actors, rules, tick counter
/// and the random stream. Every movement operation borrows it mutably.
#[derive(Debug)]
pub struct MapContext {
    pub level: Level,
    pub config: MoveConfig,
    pub tic: u32,
    rng: StdRng,
}

impl MapContext {
    pub fn new(level: Level, config: MoveConfig) -> Self {
        com_printf(&format!(
            "map started: dropoff {:?}, autoaim {}, coop {}\n",
            config.dropoff, config.autoaim, config.coop
        ));
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            level,
            config,
            tic: 0,
            rng,
        }
    }

    /// One byte from the map's random stream.
    pub fn p_random(&mut self) -> u8 {
        self.rng.gen()
    }

    pub fn advance_tic(&mut self) {
        self.tic = self.tic.wrapping_add(1);
    }
}

/// Hand `amount` damage to the host for `target`. Missing actors take none.
pub(crate) fn damage_actor(
    level: &mut Level,
    gi: &mut dyn GameImport,
    target: ActorId,
    inflictor: Option<ActorId>,
    source: Option<ActorId>,
    amount: i32,
    is_radius: bool,
) -> i32 {
    match level.actors.get_mut(target) {
        Some(actor) => gi.apply_damage(target, actor, inflictor, source, amount, is_radius),
        None => 0,
    }
}
