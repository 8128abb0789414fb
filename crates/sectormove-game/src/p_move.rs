// p_move.rs — relocating actors
//
// p_try_move checks the destination, applies the contacts the check found,
// enforces step-up / dropoff / headroom rules, relinks the actor and fires
// cross triggers for every special line whose side it changed, including
// lines the move carried the footprint clean past.

use sectormove_common::common::com_dprintf;
use sectormove_common::shared::{point_on_divline_side, BBox, DivLine, Vec2};

use crate::game_import::{ActivationKind, GameImport};
use crate::p_check::{p_check_position, unstuck_from, CheckMode, Contact, PositionCheck};
use crate::p_config::DropoffPolicy;
use crate::p_local::*;
use crate::p_setup::{damage_actor, MapContext};

/// What stopped a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocker {
    Actor(ActorId),
    Boundary(BoundaryId),
    /// Not enough room between floor and ceiling.
    Clearance,
    /// Floor rises more than a step.
    StepUp,
    /// Would stand over a drop taller than a step.
    Dropoff,
    /// The actor handle did not resolve.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveResult {
    pub succeeded: bool,
    /// Accepted under the permissive dropoff policy with a real fall ahead.
    pub fell_through_dropoff: bool,
    /// The actor would fit at the destination height-wise; floating
    /// actors use this to decide whether to change altitude.
    pub floatok: bool,
    pub blocked: Option<Blocker>,
    /// The limiting line has a sky ceiling, so missiles should vanish
    /// rather than explode.
    pub sky_hit: bool,
    pub standing_on: Option<ActorId>,
}

impl MoveResult {
    fn blocked(by: Blocker) -> Self {
        Self {
            blocked: Some(by),
            ..Default::default()
        }
    }
}

fn cross_kind(actor: &Actor) -> ActivationKind {
    if actor.is_player() {
        ActivationKind::Cross
    } else if actor.flags.contains(ActorFlags::MISSILE) {
        ActivationKind::ProjectileCross
    } else {
        ActivationKind::MonsterCross
    }
}

fn sky_line(ctx: &MapContext, line: Option<BoundaryId>) -> bool {
    let Some(id) = line else { return false };
    let level = &ctx.level;
    let ld = &level.boundaries[id];
    ctx.config.is_sky(level.regions[ld.front].ceiling_pic)
        || ld
            .back
            .is_some_and(|b| ctx.config.is_sky(level.regions[b].ceiling_pic))
}

/// Special boundaries the path `from -> to` crosses that the destination
/// footprint no longer touches.
fn swept_specials(ctx: &MapContext, from: &Vec2, to: &Vec2, radius: f32, touched: &[BoundaryId]) -> Vec<BoundaryId> {
    let level = &ctx.level;
    let mut swept = BBox::around(from[0], from[1], radius);
    swept.add_box(&BBox::around(to[0], to[1], radius));
    let path = DivLine::from_points(from, to);

    level
        .index
        .area_boundaries(&level.boundaries, &swept, true)
        .into_iter()
        .filter(|l| !touched.contains(l))
        .filter(|&l| {
            let ld = &level.boundaries[l];
            ld.special != 0 && point_on_divline_side(&ld.v1, &path) != point_on_divline_side(&ld.v2, &path)
        })
        .collect()
}

/// Carry out the side effects the validator collected.
pub(crate) fn apply_contacts(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId, contacts: &[Contact]) {
    for contact in contacts {
        match *contact {
            Contact::Pickup(item) => {
                if let Some(it) = ctx.level.actors.get_mut(item) {
                    gi.touch_special(item, it, id);
                }
            }
            Contact::Push { target, mom } => {
                if let Some(t) = ctx.level.actors.get_mut(target) {
                    t.mom[0] += mom[0];
                    t.mom[1] += mom[1];
                }
            }
            Contact::SkullSlam(target) => {
                let mult = ctx.level.actor(id).map_or(0, |a| a.damage);
                let amount = (ctx.p_random() % 8 + 1) as i32 * mult;
                damage_actor(&mut ctx.level, gi, target, Some(id), Some(id), amount, false);
                if let Some(a) = ctx.level.actors.get_mut(id) {
                    a.flags.remove(ActorFlags::SKULLFLY);
                    a.mom = [0.0; 3];
                }
            }
            Contact::MissileHit(target) => {
                let (mult, source) = ctx.level.actor(id).map_or((0, None), |a| (a.damage, a.target));
                let amount = (ctx.p_random() % 8 + 1) as i32 * mult;
                damage_actor(&mut ctx.level, gi, target, Some(id), source, amount, false);
            }
            Contact::Stomp(target) => {
                damage_actor(&mut ctx.level, gi, target, Some(id), Some(id), TELEFRAG_DAMAGE, false);
            }
        }
    }
}

/// A floating actor blocked only by an actor it could perch on.
fn can_perch(ctx: &MapContext, mover: &Actor, blocker: ActorId) -> bool {
    if !mover.flags.contains(ActorFlags::FLOAT)
        || mover
            .flags
            .intersects(ActorFlags::MISSILE | ActorFlags::SKULLFLY)
    {
        return false;
    }
    let Some(b) = ctx.level.actor(blocker) else {
        return false;
    };
    let top = b.top();
    top > mover.origin[2] && top - mover.origin[2] <= MAXSTEP && mover.ceilingz - top >= mover.height
}

/// Move actor `id` to `(x, y)` if the rules allow it.
pub(crate) fn try_move_to(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId, x: f32, y: f32) -> MoveResult {
    let Some(thing) = ctx.level.actors.get_mut(id) else {
        return MoveResult::blocked(Blocker::Missing);
    };
    // never carried over from an earlier move
    thing.standing_on = None;
    let thing = thing.clone();

    let tm = p_check_position(ctx, id, x, y, thing.origin[2], CheckMode::Normal);
    apply_contacts(ctx, gi, id, &tm.contacts);

    if !tm.ok {
        return rejected(ctx, gi, id, &thing, &tm);
    }

    let flags = thing.flags;
    let z = thing.origin[2];
    let mut result = MoveResult::default();

    if !flags.contains(ActorFlags::NOCLIP) {
        let fits = tm.ceilingz - tm.floorz >= thing.height
            || tm.ceiling_line.is_some_and(|l| unstuck_from(&ctx.level.boundaries[l], &thing, x, y, false));
        if !fits {
            result.blocked = Some(Blocker::Clearance);
            result.sky_hit = sky_line(ctx, tm.ceiling_line);
            return result; // doesn't fit
        }

        result.floatok = true;

        if !flags.contains(ActorFlags::TELEPORT) && tm.ceilingz - z < thing.height {
            result.blocked = Some(Blocker::Clearance);
            result.sky_hit = sky_line(ctx, tm.ceiling_line);
            return result; // mobj must lower itself to fit
        }

        if !flags.contains(ActorFlags::TELEPORT)
            && !flags.contains(ActorFlags::FLOAT)
            && tm.floorz - z > MAXSTEP
        {
            result.blocked = Some(Blocker::StepUp);
            return result; // too big a step up
        }

        if !flags.intersects(ActorFlags::DROPOFF | ActorFlags::FLOAT) {
            match ctx.config.dropoff {
                DropoffPolicy::Strict => {
                    if tm.floorz - tm.dropoffz > MAXSTEP {
                        result.blocked = Some(Blocker::Dropoff);
                        return result; // don't stand over a dropoff
                    }
                }
                DropoffPolicy::Permissive => {
                    result.fell_through_dropoff =
                        !flags.contains(ActorFlags::NOGRAVITY) && z - tm.floorz > MAXSTEP;
                }
            }
        }
    }

    // the move is ok, so link the thing into its new position
    let old_xy = thing.xy();
    ctx.level.unlink_actor(id);
    if let Some(a) = ctx.level.actors.get_mut(id) {
        a.origin[0] = x;
        a.origin[1] = y;
        a.floorz = tm.floorz;
        a.ceilingz = tm.ceilingz;
        a.dropoffz = tm.dropoffz;
        a.region = tm.region;
        a.standing_on = tm.standing_on;
        if a.flags.contains(ActorFlags::FLOAT) && a.origin[2] < a.floorz {
            a.origin[2] = a.floorz;
        }
    }
    ctx.level.link_actor(id);

    // if any special lines were hit, do the effect
    if !flags.intersects(ActorFlags::TELEPORT | ActorFlags::NOCLIP) {
        let kind = cross_kind(&thing);
        let mut candidates = tm.spechit.clone();
        candidates.extend(swept_specials(ctx, &old_xy, &[x, y], thing.radius, &tm.spechit));

        let mut crossed = Vec::new();
        for &l in &candidates {
            let ld = &ctx.level.boundaries[l];
            let side = ld.point_on_side(&[x, y]);
            let oldside = ld.point_on_side(&old_xy);
            if side != oldside && ld.special != 0 {
                crossed.push((l, oldside));
            }
        }
        for (l, oldside) in crossed {
            gi.activate_boundary(l, &ctx.level.boundaries[l], id, oldside, kind);
        }
    }

    result.succeeded = true;
    result.standing_on = tm.standing_on;
    result
}

fn rejected(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId, thing: &Actor, tm: &PositionCheck) -> MoveResult {
    if let (Some(b), None) = (tm.blocking_actor, tm.blocking_boundary) {
        if can_perch(ctx, thing, b) {
            if let Some(a) = ctx.level.actors.get_mut(id) {
                a.standing_on = Some(b);
            }
            com_dprintf(&format!("{:?} perched on {:?}\n", id, b));
            return MoveResult {
                succeeded: true,
                standing_on: Some(b),
                ..Default::default()
            };
        }
        return MoveResult::blocked(Blocker::Actor(b));
    }

    let Some(l) = tm.blocking_boundary else {
        return MoveResult::blocked(Blocker::Missing);
    };

    let ld = &ctx.level.boundaries[l];
    if thing.flags.contains(ActorFlags::MISSILE) && ld.special != 0 {
        let side = ld.point_on_side(&thing.xy());
        gi.activate_boundary(l, ld, id, side, ActivationKind::Impact);
    }

    let mut result = MoveResult::blocked(Blocker::Boundary(l));
    result.sky_hit = sky_line(ctx, tm.ceiling_line.or(Some(l)));
    result
}

// ============================================================
// Public entry points
// ============================================================

/// Try to move actor `id` by `(dx, dy)`.
pub fn p_try_move(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId, dx: f32, dy: f32) -> MoveResult {
    let Some(thing) = ctx.level.actor(id) else {
        return MoveResult::blocked(Blocker::Missing);
    };
    let [x, y, _] = thing.origin;
    try_move_to(ctx, gi, id, x + dx, y + dy)
}

/// Like `p_try_move` but also shifts z; z goes back if the move fails.
pub fn p_try_move_z(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId, dx: f32, dy: f32, dz: f32) -> MoveResult {
    let Some(thing) = ctx.level.actors.get_mut(id) else {
        return MoveResult::blocked(Blocker::Missing);
    };
    let old_z = thing.origin[2];
    thing.origin[2] += dz;

    let result = p_try_move(ctx, gi, id, dx, dy);
    if !result.succeeded {
        if let Some(thing) = ctx.level.actors.get_mut(id) {
            thing.origin[2] = old_z;
        }
    }
    result
}

/// Put actor `id` at `(x, y)` regardless of boundaries, telefragging any
/// shootable actor in the way. Fails only when the mover may not telefrag.
pub fn p_teleport_move(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId, x: f32, y: f32) -> bool {
    let Some(thing) = ctx.level.actors.get_mut(id) else {
        return false;
    };
    thing.standing_on = None;
    let z = thing.origin[2];

    let tm = p_check_position(ctx, id, x, y, z, CheckMode::Teleport);
    if !tm.ok {
        return false;
    }

    // the move is ok, so kill everything in the way first
    apply_contacts(ctx, gi, id, &tm.contacts);

    ctx.level.unlink_actor(id);
    if let Some(a) = ctx.level.actors.get_mut(id) {
        a.origin[0] = x;
        a.origin[1] = y;
        a.floorz = tm.floorz;
        a.ceilingz = tm.ceilingz;
        a.dropoffz = tm.dropoffz;
        a.region = tm.region;
    }
    ctx.level.link_actor(id);
    true
}
