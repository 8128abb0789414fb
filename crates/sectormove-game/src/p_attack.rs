// p_attack.rs — hit-scan attacks
//
// A bullet travels along a segment from the shooter, checks every boundary and
// actor in order and stops at the first one that catches it.

use sectormove_common::shared::*;

use crate::game_import::{ActivationKind, GameImport};
use crate::p_local::*;
use crate::p_setup::{damage_actor, MapContext};
use crate::p_world::PathFlags;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttackResult {
    pub target: Option<ActorId>,
    /// Boundary the bullet stopped at, if it hit a wall.
    pub boundary: Option<BoundaryId>,
}

impl AttackResult {
    pub fn hit(&self) -> bool {
        self.target.is_some() || self.boundary.is_some()
    }
}

struct Shot {
    shooter: ActorId,
    origin: Vec2,
    shootz: f32,
    slope: f32,
    distance: f32,
    dir: Vec2,
    damage: i32,
}

impl Shot {
    fn point_at(&self, frac: f32) -> Vec3 {
        let d = self.distance * frac;
        [
            self.origin[0] + self.dir[0] * d,
            self.origin[1] + self.dir[1] * d,
            self.shootz + self.slope * d,
        ]
    }

    fn melee(&self) -> bool {
        self.distance <= MELEERANGE
    }
}

enum Traverse {
    Continue,
    Stop(AttackResult),
}

fn shoot_boundary(ctx: &MapContext, gi: &mut dyn GameImport, shot: &Shot, id: BoundaryId, frac: f32) -> Traverse {
    let level = &ctx.level;
    let li = &level.boundaries[id];

    if li.special != 0 {
        let side = li.point_on_side(&shot.origin);
        gi.activate_boundary(id, li, shot.shooter, side, ActivationKind::Impact);
    }

    if let Some(back) = li.back {
        let open = level.line_opening(id);
        let dist = (shot.distance * frac).max(0.001);
        let front = &level.regions[li.front];
        let back = &level.regions[back];

        let below = front.floor_height != back.floor_height && (open.bottom - shot.shootz) / dist > shot.slope;
        let above = front.ceiling_height != back.ceiling_height && (open.top - shot.shootz) / dist < shot.slope;
        if !below && !above {
            return Traverse::Continue; // shot continues
        }
    }

    // hit line: position a bit closer, never behind the shooter
    let frac = (frac - 4.0 / shot.distance).max(0.0);
    let pos = shot.point_at(frac);

    let front = &level.regions[li.front];
    if ctx.config.is_sky(front.ceiling_pic) {
        // don't shoot the sky
        if pos[2] > front.ceiling_height {
            return Traverse::Stop(AttackResult::default());
        }
        // it's a sky hack wall
        if li.back.is_some_and(|b| ctx.config.is_sky(level.regions[b].ceiling_pic)) {
            return Traverse::Stop(AttackResult::default());
        }
    }

    gi.spawn_puff(pos, shot.melee());
    Traverse::Stop(AttackResult {
        target: None,
        boundary: Some(id),
    })
}

fn shoot_actor(ctx: &mut MapContext, gi: &mut dyn GameImport, shot: &Shot, id: ActorId, frac: f32) -> Traverse {
    if id == shot.shooter {
        return Traverse::Continue; // can't shoot self
    }
    let Some(th) = ctx.level.actor(id) else {
        return Traverse::Continue;
    };
    if !th.flags.contains(ActorFlags::SHOOTABLE) {
        return Traverse::Continue; // corpse or something
    }

    // check angles to see if the thing can be aimed at
    let dist = (shot.distance * frac).max(0.001);
    let thingtopslope = (th.top() - shot.shootz) / dist;
    if thingtopslope < shot.slope {
        return Traverse::Continue; // shot over the thing
    }
    let thingbottomslope = (th.origin[2] - shot.shootz) / dist;
    if thingbottomslope > shot.slope {
        return Traverse::Continue; // shot under the thing
    }
    let noblood = th.flags.contains(ActorFlags::NOBLOOD);

    // hit thing: position a bit closer, never behind the shooter
    let frac = (frac - 10.0 / shot.distance).max(0.0);
    let pos = shot.point_at(frac);

    if noblood {
        gi.spawn_puff(pos, shot.melee());
    } else {
        gi.spawn_blood(pos, shot.damage);
    }

    if shot.damage > 0 {
        damage_actor(&mut ctx.level, gi, id, Some(shot.shooter), Some(shot.shooter), shot.damage, false);
    }

    Traverse::Stop(AttackResult {
        target: Some(id),
        boundary: None,
    })
}

/// Fire a bullet from `shooter` along `angle` with vertical `slope`. Hits
/// produce a puff or blood through the host and damage the first shootable
/// actor in the way.
pub fn p_line_attack(
    ctx: &mut MapContext,
    gi: &mut dyn GameImport,
    shooter: ActorId,
    angle: f32,
    distance: f32,
    slope: f32,
    damage: i32,
) -> AttackResult {
    let Some(t1) = ctx.level.actor(shooter) else {
        return AttackResult::default();
    };
    if distance <= 0.0 {
        return AttackResult::default();
    }

    let dir = angle_unit(angle);
    let shot = Shot {
        shooter,
        origin: t1.xy(),
        shootz: t1.origin[2] + t1.height / 2.0 + ATTACK_Z_OFFSET,
        slope,
        distance,
        dir,
        damage,
    };
    let end = [shot.origin[0] + dir[0] * distance, shot.origin[1] + dir[1] * distance];

    let intercepts = ctx
        .level
        .path_intercepts(&shot.origin, &end, PathFlags::ADD_LINES | PathFlags::ADD_THINGS);

    for ic in &intercepts {
        let step = match ic.kind {
            InterceptKind::Boundary(id) => shoot_boundary(ctx, gi, &shot, id, ic.frac),
            InterceptKind::Actor(id) => shoot_actor(ctx, gi, &shot, id, ic.frac),
        };
        if let Traverse::Stop(result) = step {
            return result;
        }
    }
    AttackResult::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p_testutil::*;

    #[test]
    fn test_hits_monster_in_front() {
        let mut gi = RecordingImport::default();
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        let m = spawn_monster(&mut ctx, [100.0, 0.0, 0.0]);
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(r.target, Some(m));
        assert!(r.hit());
        assert_eq!(gi.damage.len(), 1);
        assert_eq!(gi.damage[0].target, m);
        assert_eq!(gi.damage[0].source, Some(p));
        assert_eq!(gi.blood.len(), 1);
        assert!(gi.puffs.is_empty());
        assert_eq!(ctx.level.actor(m).unwrap().health, 90);
    }

    #[test]
    fn test_noblood_gets_puff_and_melee_flag() {
        let mut gi = RecordingImport::default();
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        let m = spawn(
            &mut ctx,
            [40.0, 0.0, 0.0],
            20.0,
            56.0,
            ActorFlags::SOLID | ActorFlags::SHOOTABLE | ActorFlags::NOBLOOD,
        );
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MELEERANGE, 0.0, 5);
        assert_eq!(r.target, Some(m));
        assert_eq!(gi.puffs.len(), 1);
        assert!(gi.puffs[0].1);
        assert!(gi.blood.is_empty());
    }

    #[test]
    fn test_shot_over_short_actor() {
        let mut gi = RecordingImport::default();
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        spawn(&mut ctx, [100.0, 0.0, 0.0], 20.0, 16.0, ActorFlags::SOLID | ActorFlags::SHOOTABLE);
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(r.target, None);
        assert_eq!(r.boundary, Some(2));
        assert!(gi.damage.is_empty());
        // puff lands just short of the wall
        let (puff, melee) = gi.puffs[0];
        assert!(!melee);
        assert!((puff[0] - 252.0).abs() < 0.01);
        assert_eq!(puff[2], 36.0);
    }

    #[test]
    fn test_non_shootable_is_ignored() {
        let mut gi = RecordingImport::default();
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        spawn(&mut ctx, [100.0, 0.0, 0.0], 20.0, 56.0, ActorFlags::SOLID);
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(r.target, None);
        assert_eq!(r.boundary, Some(2));
    }

    #[test]
    fn test_step_catches_level_shot() {
        let mut gi = RecordingImport::default();
        // far room floor sits above the shot height of 36
        let mut ctx = two_room_ctx(0.0, 128.0, 48.0, 128.0);
        let p = spawn_player(&mut ctx, [-100.0, 0.0, 0.0]);
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(r.boundary, Some(SHARED_LINE));
        assert!((gi.puffs[0].0[0] + 4.0).abs() < 0.01);
    }

    #[test]
    fn test_shooter_standing_on_step_line() {
        let mut gi = RecordingImport::default();
        let mut ctx = two_room_ctx(0.0, 128.0, 48.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(r.boundary, Some(SHARED_LINE));
        let (puff, _) = gi.puffs[0];
        assert!(puff.iter().all(|c| c.is_finite()));
        assert_eq!(puff[0], 0.0);
        assert_eq!(puff[2], 36.0);
    }

    #[test]
    fn test_open_two_sided_line_passes() {
        let mut gi = RecordingImport::default();
        let mut ctx = two_room_ctx(0.0, 128.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [-100.0, 0.0, 0.0]);
        let m = spawn_monster(&mut ctx, [100.0, 0.0, 0.0]);
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(r.target, Some(m));
    }

    #[test]
    fn test_special_line_gets_impact() {
        let mut gi = RecordingImport::default();
        let mut level = two_room_builder(0.0, 128.0, 0.0, 128.0).build().unwrap();
        level.boundaries[SHARED_LINE].special = 46;
        let mut ctx = MapContext::new(level, Default::default());
        let p = spawn_player(&mut ctx, [-100.0, 0.0, 0.0]);
        p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 0.0, 10);
        assert_eq!(gi.activations, vec![(SHARED_LINE, p, 1, ActivationKind::Impact)]);
    }

    #[test]
    fn test_sky_swallows_puff() {
        let mut gi = RecordingImport::default();
        let mut level = box_room_builder(-256.0, 256.0, 0.0, 128.0).build().unwrap();
        level.regions[0].ceiling_pic = 7;
        let mut config = crate::p_config::MoveConfig::default();
        config.sky_flat = Some(7);
        let mut ctx = MapContext::new(level, config);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        // steep upward shot ends above the ceiling at the wall
        let r = p_line_attack(&mut ctx, &mut gi, p, 0.0, MISSILERANGE, 1.0, 10);
        assert!(!r.hit());
        assert!(gi.puffs.is_empty());
    }

    #[test]
    fn test_missing_shooter() {
        let mut gi = RecordingImport::default();
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        ctx.level.remove_actor(p);
        assert_eq!(p_line_attack(&mut ctx, &mut gi, p, 0.0, 100.0, 0.0, 10), AttackResult::default());
    }
}
