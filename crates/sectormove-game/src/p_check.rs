// p_check.rs — position validation
//
// p_check_position answers "could this actor stand at (x, y, z)?" and gathers
// everything the answer depends on: the tightest floor and ceiling, the drop
// below, the boundaries with specials that were touched and the actors that
// would be hit, picked up or pushed. It never changes anything; the move
// executor decides what to do with the result.

use sectormove_common::shared::*;

use crate::p_local::*;
use crate::p_setup::{Level, MapContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMode {
    Normal,
    /// Teleport arrival: shootable actors in the way get stomped and
    /// boundaries are ignored.
    Teleport,
    /// Floor and ceiling only, used after a region changes height.
    HeightClip,
}

/// Side effect a move would cause when carried out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Pickup(ActorId),
    /// Quarter of the mover's momentum goes to the target.
    Push { target: ActorId, mom: Vec2 },
    SkullSlam(ActorId),
    MissileHit(ActorId),
    /// Telefrag.
    Stomp(ActorId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionCheck {
    pub ok: bool,
    pub floorz: f32,
    pub ceilingz: f32,
    pub dropoffz: f32,
    pub region: RegionId,
    /// Touched boundaries with a special, in contact order.
    pub spechit: Vec<BoundaryId>,
    pub blocking_actor: Option<ActorId>,
    pub blocking_boundary: Option<BoundaryId>,
    /// Boundary that set the ceiling, if any.
    pub ceiling_line: Option<BoundaryId>,
    pub floor_line: Option<BoundaryId>,
    pub wall_hit: bool,
    pub standing_on: Option<ActorId>,
    pub contacts: Vec<Contact>,
}

impl PositionCheck {
    fn new(region: RegionId, floorz: f32, ceilingz: f32) -> Self {
        Self {
            ok: false,
            floorz,
            ceilingz,
            dropoffz: floorz,
            region,
            spechit: Vec::new(),
            blocking_actor: None,
            blocking_boundary: None,
            ceiling_line: None,
            floor_line: None,
            wall_hit: false,
            standing_on: None,
            contacts: Vec::new(),
        }
    }

    fn block_line(&mut self, id: BoundaryId) -> bool {
        self.blocking_boundary = Some(id);
        self.wall_hit = true;
        false
    }

    fn block_actor(&mut self, id: ActorId) -> bool {
        self.blocking_actor = Some(id);
        false
    }
}

/// Candidate position shared by the per-actor and per-boundary checks.
struct Probe<'a> {
    id: ActorId,
    thing: &'a Actor,
    x: f32,
    y: f32,
    z: f32,
    bbox: BBox,
    mode: CheckMode,
}

// ============================================================
// Boundary checks
// ============================================================

/// The actor's current footprint stays clear of the line.
pub(crate) fn untouched(line: &Boundary, actor: &Actor) -> bool {
    !line.touches_box(&actor.bbox())
}

/// A player already wedged against `line` may leave it. One-sided lines
/// also need the move to head towards the front.
pub(crate) fn unstuck_from(line: &Boundary, actor: &Actor, x: f32, y: f32, need_away: bool) -> bool {
    if !actor.is_player() || untouched(line, actor) {
        return false;
    }
    if !need_away {
        return true;
    }
    (x - actor.origin[0]) * line.delta[1] > (y - actor.origin[1]) * line.delta[0]
}

/// Boundary rule set shared with the slide tracer: true when `line` stops
/// this mover outright, whatever the opening.
pub(crate) fn blocks_mover(level: &Level, line: &Boundary, mover: &Actor) -> bool {
    if mover.flags.contains(ActorFlags::MISSILE) {
        return false;
    }
    if line.flags.contains(BoundaryFlags::BLOCKING) {
        return true;
    }
    line.flags.contains(BoundaryFlags::BLOCK_MONSTERS)
        && !mover.is_player()
        && !level
            .archetype(mover)
            .traits
            .contains(ArchetypeTraits::IGNORE_MONSTER_BLOCK)
}

fn pit_check_line(level: &Level, p: &Probe, id: BoundaryId, tm: &mut PositionCheck) -> bool {
    let ld = &level.boundaries[id];

    if !ld.touches_box(&p.bbox) {
        return true;
    }

    // a one-sided line blocks everything, height clips only read the floor
    if ld.back.is_none() {
        if p.mode == CheckMode::HeightClip {
            return true;
        }
        if unstuck_from(ld, p.thing, p.x, p.y, true) {
            return true;
        }
        return tm.block_line(id);
    }

    if p.mode != CheckMode::HeightClip && blocks_mover(level, ld, p.thing) {
        if unstuck_from(ld, p.thing, p.x, p.y, false) {
            return true;
        }
        return tm.block_line(id);
    }

    let open = level.line_opening(id);

    // missiles outside the opening strike the line instead of passing
    if p.mode != CheckMode::HeightClip
        && p.thing.flags.contains(ActorFlags::MISSILE)
        && (p.z < open.bottom || p.z + p.thing.height > open.top)
    {
        if open.top < tm.ceilingz {
            tm.ceilingz = open.top;
            tm.ceiling_line = Some(id);
        }
        return tm.block_line(id);
    }

    // adjust floor / ceiling heights
    if open.top < tm.ceilingz {
        tm.ceilingz = open.top;
        tm.ceiling_line = Some(id);
    }
    if open.bottom > tm.floorz {
        tm.floorz = open.bottom;
        tm.floor_line = Some(id);
    }
    if open.low_floor < tm.dropoffz {
        tm.dropoffz = open.low_floor;
    }

    // if contacted a special line, add it to the list
    if ld.special != 0 && !tm.spechit.contains(&id) {
        tm.spechit.push(id);
    }

    true
}

// ============================================================
// Actor checks
// ============================================================

fn may_telefrag(ctx: &MapContext, mover: &Actor) -> bool {
    mover.is_player()
        || ctx.config.monster_telefrag
        || ctx
            .level
            .archetype(mover)
            .traits
            .contains(ArchetypeTraits::CAN_TELEFRAG)
}

fn pit_check_thing(ctx: &MapContext, p: &Probe, other_id: ActorId, tm: &mut PositionCheck) -> bool {
    let level = &ctx.level;
    let thing = p.thing;

    if other_id == p.id {
        return true; // don't clip against self
    }
    let Some(other) = level.actors.get(other_id) else {
        return true;
    };
    if other.flags.contains(ActorFlags::CAMERA) {
        return true;
    }
    if !other
        .flags
        .intersects(ActorFlags::SOLID | ActorFlags::SPECIAL | ActorFlags::SHOOTABLE)
    {
        return true;
    }

    let blockdist = other.radius + thing.radius;
    if (other.origin[0] - p.x).abs() >= blockdist || (other.origin[1] - p.y).abs() >= blockdist {
        return true; // didn't hit it
    }

    if p.mode == CheckMode::Teleport {
        if !other.flags.contains(ActorFlags::SHOOTABLE) {
            return true;
        }
        if !may_telefrag(ctx, thing) {
            return tm.block_actor(other_id);
        }
        tm.contacts.push(Contact::Stomp(other_id));
        return true;
    }

    // charging actors slam into whatever they reach
    if thing.flags.contains(ActorFlags::SKULLFLY) {
        tm.contacts.push(Contact::SkullSlam(other_id));
        return tm.block_actor(other_id);
    }

    // missiles can hit other things
    if thing.flags.contains(ActorFlags::MISSILE) {
        // see if it went over / under
        if p.z > other.top() {
            return true;
        }
        if p.z + thing.height < other.origin[2] {
            return true;
        }

        if let Some(shooter_id) = thing.target {
            if shooter_id == other_id {
                return true; // don't hit the shooter
            }
            if let Some(shooter) = level.actors.get(shooter_id) {
                let sa = level.archetype(shooter);
                let oa = level.archetype(other);
                if sa.species == oa.species
                    && oa.traits.contains(ArchetypeTraits::SPECIES_FRIENDLY_FIRE_IMMUNE)
                    && !other.is_player()
                {
                    // explode, but do no damage
                    return tm.block_actor(other_id);
                }
            }
        }

        if !other.flags.contains(ActorFlags::SHOOTABLE) {
            if other.flags.contains(ActorFlags::SOLID) {
                return tm.block_actor(other_id);
            }
            return true;
        }

        tm.contacts.push(Contact::MissileHit(other_id));
        return tm.block_actor(other_id);
    }

    // check for special pickup
    if other.flags.contains(ActorFlags::SPECIAL) {
        let solid = other.flags.contains(ActorFlags::SOLID);
        if thing.flags.contains(ActorFlags::PICKUP) {
            tm.contacts.push(Contact::Pickup(other_id));
        }
        if solid {
            return tm.block_actor(other_id);
        }
        return true;
    }

    if !other.flags.contains(ActorFlags::SOLID) {
        return true; // shootable but walk-through
    }

    if other.flags.contains(ActorFlags::PUSHABLE) {
        tm.contacts.push(Contact::Push {
            target: other_id,
            mom: [thing.mom[0] / 4.0, thing.mom[1] / 4.0],
        });
        return tm.block_actor(other_id);
    }

    let top = other.top();

    // over it
    if p.z >= top {
        if top > tm.floorz {
            tm.floorz = top;
            tm.standing_on = Some(other_id);
        }
        return true;
    }

    // under it
    if p.z + thing.height <= other.origin[2] {
        if other.origin[2] < tm.ceilingz {
            tm.ceilingz = other.origin[2];
        }
        return true;
    }

    if !thing.flags.contains(ActorFlags::FLOAT) {
        // step up onto it, unless the pair refuses to stack
        let ta = level.archetype(thing);
        let oa = level.archetype(other);
        let no_stack = ta.species == oa.species
            && (ta.traits | oa.traits).contains(ArchetypeTraits::NO_STACKING);
        if !no_stack && top - p.z <= MAXSTEP {
            if top > tm.floorz {
                tm.floorz = top;
                tm.standing_on = Some(other_id);
            }
            return true;
        }
    } else if p.z + thing.height - other.origin[2] <= MAXSTEP {
        // dive under it
        if other.origin[2] < tm.ceilingz {
            tm.ceilingz = other.origin[2];
        }
        return true;
    }

    tm.block_actor(other_id)
}

// ============================================================
// p_check_position
// ============================================================

/// Check whether actor `id` fits at `(x, y, z)`.
///
/// The returned floor and ceiling are the tightest over the region at
/// `(x, y)`, every opening the footprint straddles and every solid actor the
/// mover would stand on or pass under. `ok` is false when anything rules
/// the spot out; `blocking_actor` / `blocking_boundary` say what.
pub fn p_check_position(ctx: &MapContext, id: ActorId, x: f32, y: f32, z: f32, mode: CheckMode) -> PositionCheck {
    let level = &ctx.level;
    let region = level.point_region(x, y);
    let sec = &level.regions[region];
    let mut tm = PositionCheck::new(region, sec.floor_height, sec.ceiling_height);

    let Some(thing) = level.actors.get(id) else {
        return tm;
    };

    let flags = thing.flags;
    if flags.contains(ActorFlags::NOCLIP) && !flags.contains(ActorFlags::SKULLFLY) {
        tm.ok = true;
        return tm;
    }

    let bbox = BBox::around(x, y, thing.radius);
    let probe = Probe {
        id,
        thing,
        x,
        y,
        z,
        bbox,
        mode,
    };

    // actors are indexed by origin, so look one max radius further out
    if !flags.contains(ActorFlags::NOCLIP) && mode != CheckMode::HeightClip {
        for other in level.index.area_actors(&level.actors, &bbox.expand(MAXRADIUS)) {
            if !pit_check_thing(ctx, &probe, other, &mut tm) {
                return tm;
            }
        }
    }

    if mode == CheckMode::Teleport {
        tm.ok = true;
        return tm;
    }

    for line in level.index.area_boundaries(&level.boundaries, &bbox, false) {
        if !pit_check_line(level, &probe, line, &mut tm) {
            return tm;
        }
    }

    // a boundary may have lifted the floor past the actor we stood on
    if let Some(under) = tm.standing_on.and_then(|s| level.actors.get(s)) {
        if under.top() < tm.floorz {
            tm.standing_on = None;
        }
    }

    tm.ok = true;
    tm
}
