// p_aim.rs — vertical auto-aim
//
// Sweeps a segment from the shooter and narrows a window of vertical slopes at
// every two-sided opening. The nearest hostile actor that still shows through
// the window decides the slope. Friendly actors are only aimed at when nothing
// hostile is in line.

use sectormove_common::shared::*;

use crate::p_local::*;
use crate::p_setup::MapContext;
use crate::p_world::PathFlags;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimResult {
    pub slope: f32,
    pub target: Option<ActorId>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    slope: f32,
    target: ActorId,
}

struct AimTrace {
    shooter: ActorId,
    shooter_player: bool,
    shooter_friend: bool,
    shootz: f32,
    distance: f32,
    topslope: f32,
    bottomslope: f32,
    friend: Option<Candidate>,
}

enum Step {
    Continue,
    Stop,
    Found(Candidate),
}

impl AimTrace {
    fn boundary(&mut self, ctx: &MapContext, id: BoundaryId, frac: f32) -> Step {
        let level = &ctx.level;
        let li = &level.boundaries[id];
        let Some(back) = li.back else {
            return Step::Stop; // stop
        };

        // crosses a two sided line; the opening may clip the window
        let open = level.line_opening(id);
        if open.bottom >= open.top {
            return Step::Stop;
        }

        let dist = (self.distance * frac).max(0.001);
        let front = &level.regions[li.front];
        let back = &level.regions[back];

        if front.floor_height != back.floor_height {
            self.bottomslope = self.bottomslope.max((open.bottom - self.shootz) / dist);
        }
        if front.ceiling_height != back.ceiling_height {
            self.topslope = self.topslope.min((open.top - self.shootz) / dist);
        }

        if self.topslope <= self.bottomslope {
            return Step::Stop;
        }
        Step::Continue
    }

    fn actor(&mut self, ctx: &MapContext, id: ActorId, frac: f32) -> Step {
        if id == self.shooter {
            return Step::Continue; // can't shoot self
        }
        let Some(th) = ctx.level.actor(id) else {
            return Step::Continue;
        };
        if !th.flags.contains(ActorFlags::SHOOTABLE) {
            return Step::Continue; // corpse or something
        }
        if ctx.config.coop && self.shooter_player && th.is_player() {
            return Step::Continue; // don't aim at teammates
        }

        let is_friend = th.flags.contains(ActorFlags::FRIEND) && (self.shooter_player || self.shooter_friend);
        if is_friend && self.friend.is_some() {
            return Step::Continue;
        }

        // check angles to see if the thing can be aimed at
        let dist = (self.distance * frac).max(0.001);
        let thingtopslope = (th.top() - self.shootz) / dist;
        if thingtopslope < self.bottomslope {
            return Step::Continue; // shot over the thing
        }
        let thingbottomslope = (th.origin[2] - self.shootz) / dist;
        if thingbottomslope > self.topslope {
            return Step::Continue; // shot under the thing
        }

        // this thing can be hit
        let top = thingtopslope.min(self.topslope);
        let bottom = thingbottomslope.max(self.bottomslope);
        let found = Candidate {
            slope: (top + bottom) / 2.0,
            target: id,
        };

        if is_friend {
            self.friend = Some(found);
            return Step::Continue;
        }
        Step::Found(found)
    }
}

fn fallback_slope(shooter: &Actor) -> f32 {
    if shooter.is_player() {
        shooter.pitch.tan()
    } else {
        0.0
    }
}

/// Pick a vertical slope for an attack from `shooter` along `angle`.
pub fn p_aim_line_attack(ctx: &MapContext, shooter: ActorId, angle: f32, distance: f32) -> AimResult {
    let Some(t1) = ctx.level.actor(shooter) else {
        return AimResult {
            slope: 0.0,
            target: None,
        };
    };
    let fallback = fallback_slope(t1);

    if t1.is_player() && !ctx.config.autoaim {
        return AimResult {
            slope: fallback,
            target: None,
        };
    }

    let dir = angle_unit(angle);
    let p0 = t1.xy();
    let p1 = [p0[0] + dir[0] * distance, p0[1] + dir[1] * distance];

    let mut trace = AimTrace {
        shooter,
        shooter_player: t1.is_player(),
        shooter_friend: t1.flags.contains(ActorFlags::FRIEND),
        shootz: t1.origin[2] + t1.height / 2.0 + ATTACK_Z_OFFSET,
        distance,
        topslope: AIM_TOP_SLOPE,
        bottomslope: AIM_BOTTOM_SLOPE,
        friend: None,
    };

    let mut found = None;
    if distance > 0.0 {
        for ic in ctx
            .level
            .path_intercepts(&p0, &p1, PathFlags::ADD_LINES | PathFlags::ADD_THINGS)
        {
            let step = match ic.kind {
                InterceptKind::Boundary(id) => trace.boundary(ctx, id, ic.frac),
                InterceptKind::Actor(id) => trace.actor(ctx, id, ic.frac),
            };
            match step {
                Step::Continue => {}
                Step::Stop => break,
                Step::Found(c) => {
                    found = Some(c);
                    break;
                }
            }
        }
    }

    match found.or(trace.friend) {
        Some(c) => AimResult {
            slope: c.slope,
            target: Some(c.target),
        },
        None => AimResult {
            slope: fallback,
            target: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p_testutil::*;

    #[test]
    fn test_level_target_gives_flat_slope() {
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        let m = spawn_monster(&mut ctx, [100.0, 0.0, 0.0]);
        let r = p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE);
        assert_eq!(r.target, Some(m));
        // shootz 36, monster 0..56 at 100 units: window centred near -0.1
        assert!(r.slope < 0.0 && r.slope > -0.2, "slope {}", r.slope);
    }

    #[test]
    fn test_raised_target_aims_up() {
        let mut ctx = two_room_ctx(0.0, 256.0, 64.0, 256.0);
        let p = spawn_player(&mut ctx, [-100.0, 0.0, 0.0]);
        let m = spawn(&mut ctx, [100.0, 0.0, 64.0], 20.0, 56.0, ActorFlags::SOLID | ActorFlags::SHOOTABLE);
        let r = p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE);
        assert_eq!(r.target, Some(m));
        assert!(r.slope > 0.0);
    }

    #[test]
    fn test_one_sided_wall_ends_trace() {
        let mut lb = box_room_builder(-256.0, 256.0, 0.0, 128.0);
        lb.add_boundary(Boundary::new([50.0, -100.0], [50.0, 100.0], 0, None));
        let mut ctx = ctx_from(lb);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        spawn_monster(&mut ctx, [100.0, 0.0, 0.0]);
        let r = p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE);
        assert_eq!(r.target, None);
        assert_eq!(r.slope, 0.0);
    }

    #[test]
    fn test_fallback_uses_player_pitch() {
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        ctx.level.actors.get_mut(p).unwrap().pitch = 0.25;
        let r = p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE);
        assert_eq!(r.target, None);
        assert!((r.slope - 0.25f32.tan()).abs() < 1e-6);
    }

    #[test]
    fn test_autoaim_off_ignores_targets() {
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        ctx.config.autoaim = false;
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        spawn_monster(&mut ctx, [100.0, 0.0, 0.0]);
        let r = p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE);
        assert_eq!(r, AimResult { slope: 0.0, target: None });

        // monsters still aim
        let m = spawn_monster(&mut ctx, [-100.0, 0.0, 0.0]);
        assert!(p_aim_line_attack(&ctx, m, 0.0, MISSILERANGE).target.is_some());
    }

    #[test]
    fn test_coop_skips_teammates() {
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        ctx.config.coop = true;
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        spawn_player(&mut ctx, [60.0, 0.0, 0.0]);
        let m = spawn_monster(&mut ctx, [150.0, 0.0, 0.0]);
        assert_eq!(p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE).target, Some(m));

        ctx.config.coop = false;
        assert_ne!(p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE).target, Some(m));
    }

    #[test]
    fn test_friend_is_only_a_fallback() {
        let mut ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        let f = spawn(
            &mut ctx,
            [60.0, 0.0, 0.0],
            20.0,
            56.0,
            ActorFlags::SOLID | ActorFlags::SHOOTABLE | ActorFlags::FRIEND,
        );
        let m = spawn_monster(&mut ctx, [150.0, 0.0, 0.0]);
        assert_eq!(p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE).target, Some(m));

        ctx.level.remove_actor(m);
        assert_eq!(p_aim_line_attack(&ctx, p, 0.0, MISSILERANGE).target, Some(f));
    }
}
