// p_sector.rs — region height changes
//
// When a floor or ceiling moves, every actor in or touching the region is
// refitted between the new heights. Actors that no longer fit are gibbed,
// removed or crushed.

use sectormove_common::common::com_dprintf;

use crate::game_import::GameImport;
use crate::p_check::{p_check_position, CheckMode};
use crate::p_local::*;
use crate::p_setup::{damage_actor, MapContext};

// ============================================================
// Height clipping
// ============================================================

/// Refit actor `id` between the floor and ceiling at its current spot.
/// Actors resting on the floor follow it; others are pushed down from the
/// ceiling. Returns false if the actor no longer fits.
pub fn p_thing_height_clip(ctx: &mut MapContext, id: ActorId) -> bool {
    let Some(thing) = ctx.level.actor(id) else {
        return true;
    };
    let onfloor = thing.origin[2] == thing.floorz;
    let [x, y, z] = thing.origin;

    let tm = p_check_position(ctx, id, x, y, z, CheckMode::HeightClip);

    let Some(thing) = ctx.level.actors.get_mut(id) else {
        return true;
    };
    thing.floorz = tm.floorz;
    thing.ceilingz = tm.ceilingz;
    thing.dropoffz = tm.dropoffz;

    if onfloor {
        // walking monsters rise and fall with the floor
        thing.origin[2] = thing.floorz;
    } else if thing.origin[2] + thing.height > thing.ceilingz {
        // don't adjust a floating monster unless forced to
        thing.origin[2] = thing.ceilingz - thing.height;
    }

    thing.ceilingz - thing.floorz >= thing.height
}

// ============================================================
// p_change_sector
// ============================================================

fn touches_region(ctx: &MapContext, region: RegionId, actor: &Actor) -> bool {
    if actor.flags.contains(ActorFlags::NOSECTOR) {
        return false; // not part of any region's contents
    }
    if actor.region == region {
        return true;
    }
    let bbox = actor.bbox();
    ctx.level.regions[region]
        .boundaries
        .iter()
        .any(|&l| ctx.level.boundaries[l].touches_box(&bbox))
}

/// Refit everything touching `region` after its heights changed. With
/// `crush_damage > 0` actors that don't fit take damage every fourth tic.
/// Returns true when some shootable actor no longer fits.
pub fn p_change_sector(ctx: &mut MapContext, gi: &mut dyn GameImport, region: RegionId, crush_damage: i32) -> bool {
    let candidates: Vec<ActorId> = ctx
        .level
        .actors
        .iter()
        .filter(|(_, a)| touches_region(ctx, region, a))
        .map(|(id, _)| id)
        .collect();

    let mut nofit = false;
    for id in candidates {
        if p_thing_height_clip(ctx, id) {
            continue;
        }
        let Some(thing) = ctx.level.actors.get_mut(id) else { continue };

        // crunch bodies to giblets
        if thing.flags.contains(ActorFlags::CORPSE) {
            thing.flags.remove(ActorFlags::SOLID);
            thing.height = 0.0;
            thing.radius = 0.0;
            let gibbed = thing.clone();
            ctx.level.link_actor(id);
            gi.spawn_gibs(id, &gibbed);
            continue;
        }

        // crunch dropped items
        if thing.flags.contains(ActorFlags::DROPPED) {
            ctx.level.remove_actor(id);
            continue;
        }

        if !thing.flags.contains(ActorFlags::SHOOTABLE) {
            continue; // assume it is bloody gibs or something
        }

        nofit = true;
        let pos = [thing.origin[0], thing.origin[1], thing.origin[2] + thing.height / 2.0];

        if crush_damage > 0 && ctx.tic & 3 == 0 {
            damage_actor(&mut ctx.level, gi, id, None, None, crush_damage, false);

            // spray blood in a random direction
            let r1 = ctx.p_random() as f32;
            let r2 = ctx.p_random() as f32;
            let r3 = ctx.p_random() as f32;
            let r4 = ctx.p_random() as f32;
            gi.spawn_crush_blood(pos, [(r1 - r2) / 16.0, (r3 - r4) / 16.0]);
        }
    }

    if nofit {
        com_dprintf(&format!("region {} crushing\n", region));
    }
    nofit
}

// ============================================================
// Moving planes
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneKind {
    Floor,
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneDirection {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneMove {
    pub kind: PlaneKind,
    pub direction: PlaneDirection,
    /// Units per tic.
    pub speed: f32,
    pub dest: f32,
    /// Damage per crush; 0 means the plane stops at obstacles instead.
    pub crush_damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneResult {
    Ok,
    Crushed,
    PastDest,
}

fn plane_height(ctx: &mut MapContext, region: RegionId, kind: PlaneKind) -> &mut f32 {
    let sec = &mut ctx.level.regions[region];
    match kind {
        PlaneKind::Floor => &mut sec.floor_height,
        PlaneKind::Ceiling => &mut sec.ceiling_height,
    }
}

fn set_plane(ctx: &mut MapContext, gi: &mut dyn GameImport, region: RegionId, kind: PlaneKind, h: f32, crush: i32) -> bool {
    *plane_height(ctx, region, kind) = h;
    p_change_sector(ctx, gi, region, crush)
}

/// Move one plane of `region` a tic's worth towards `mv.dest`.
pub fn p_move_plane(ctx: &mut MapContext, gi: &mut dyn GameImport, region: RegionId, mv: PlaneMove) -> PlaneResult {
    let lastpos = *plane_height(ctx, region, mv.kind);
    let crush = mv.crush_damage;

    let (next, past) = match mv.direction {
        PlaneDirection::Down => (lastpos - mv.speed, lastpos - mv.speed < mv.dest),
        PlaneDirection::Up => (lastpos + mv.speed, lastpos + mv.speed > mv.dest),
    };

    if past {
        if set_plane(ctx, gi, region, mv.kind, mv.dest, crush) {
            set_plane(ctx, gi, region, mv.kind, lastpos, crush);
        }
        return PlaneResult::PastDest;
    }

    if !set_plane(ctx, gi, region, mv.kind, next, crush) {
        return PlaneResult::Ok;
    }

    // something is in the way
    let closing = matches!(
        (mv.kind, mv.direction),
        (PlaneKind::Floor, PlaneDirection::Up) | (PlaneKind::Ceiling, PlaneDirection::Down)
    );
    if closing && crush > 0 {
        return PlaneResult::Crushed;
    }
    if mv.kind == PlaneKind::Ceiling && mv.direction == PlaneDirection::Up {
        return PlaneResult::Ok;
    }
    set_plane(ctx, gi, region, mv.kind, lastpos, crush);
    PlaneResult::Crushed
}
