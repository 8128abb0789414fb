// p_radius.rs — blast damage

use sectormove_common::common::com_dprintf;
use sectormove_common::shared::BBox;

use crate::game_import::GameImport;
use crate::p_local::*;
use crate::p_setup::{damage_actor, MapContext};
use crate::p_sight::p_check_sight;

/// Damage dealt at `dist` units from the centre of a blast of `damage` that
/// reaches `distance` units. Keeps the classic +1 so the edge still hurts.
pub fn radius_damage_amount(damage: i32, distance: i32, dist: i32) -> i32 {
    if distance <= 0 {
        return 0;
    }
    let amount = i64::from(damage) * (i64::from(distance) - i64::from(dist)) / i64::from(distance) + 1;
    amount.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Blast from actor `spot`. Every shootable actor within `distance` that
/// `spot` can see takes damage falling off with distance, credited to
/// `source`. Returns how many actors were hit.
pub fn p_radius_attack(
    ctx: &mut MapContext,
    gi: &mut dyn GameImport,
    spot: ActorId,
    source: Option<ActorId>,
    damage: i32,
    distance: i32,
) -> usize {
    let Some(bomb) = ctx.level.actor(spot) else {
        return 0;
    };
    if distance <= 0 {
        return 0;
    }
    let [bx, by, bz] = bomb.origin;
    let dist = distance as f32 + MAXRADIUS;
    let search = BBox::around(bx, by, dist);

    let mut hits = Vec::new();
    for id in ctx.level.index.area_actors(&ctx.level.actors, &search) {
        let Some(thing) = ctx.level.actor(id) else { continue };
        if !thing.flags.contains(ActorFlags::SHOOTABLE) {
            continue;
        }
        if ctx
            .level
            .archetype(thing)
            .traits
            .contains(ArchetypeTraits::NO_RADIUS_DAMAGE)
        {
            continue;
        }

        let dx = (thing.origin[0] - bx).abs();
        let dy = (thing.origin[1] - by).abs();
        let mut d = dx.max(dy);
        if ctx.config.blast_uses_z && !thing.flags.contains(ActorFlags::BLAST_IGNORE_Z) {
            let dz = (thing.origin[2] + thing.height / 2.0 - bz).abs();
            d = d.max(dz);
        }
        let d = ((d - thing.radius).floor() as i32).max(0);

        if d >= distance {
            continue; // out of range
        }
        if !p_check_sight(&ctx.level, id, spot) {
            continue;
        }
        hits.push((id, radius_damage_amount(damage, distance, d)));
    }

    for &(id, amount) in &hits {
        damage_actor(&mut ctx.level, gi, id, Some(spot), source, amount, true);
    }
    if !hits.is_empty() {
        com_dprintf(&format!("radius attack from {:?} hit {}\n", spot, hits.len()));
    }
    hits.len()
}
