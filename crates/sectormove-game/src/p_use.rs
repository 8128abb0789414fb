// p_use.rs — the use key
//
// Traces USERANGE units along the actor's facing and activates the first
// special boundary it reaches from the front.

use sectormove_common::shared::*;

use crate::game_import::{ActivationKind, GameImport, SoundKind};
use crate::p_local::*;
use crate::p_setup::MapContext;
use crate::p_world::PathFlags;

/// Press use for actor `id`. Returns true when a boundary was activated.
pub fn p_use_lines(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId) -> bool {
    let Some(usething) = ctx.level.actor(id) else {
        return false;
    };
    let origin = usething.origin;
    let p0 = usething.xy();
    let dir = angle_unit(usething.angle);
    let p1 = [p0[0] + dir[0] * USERANGE, p0[1] + dir[1] * USERANGE];

    for ic in ctx.level.path_intercepts(&p0, &p1, PathFlags::ADD_LINES) {
        let InterceptKind::Boundary(l) = ic.kind else { continue };
        let line = &ctx.level.boundaries[l];

        if line.special == 0 {
            if ctx.level.line_opening(l).range <= 0.0 {
                gi.start_sound(origin, SoundKind::NoWay, 1.0);
                return false; // can't use through a wall
            }
            continue; // not a special line, but keep checking
        }

        let pass = line.flags.contains(BoundaryFlags::PASS_USE);
        let side = line.point_on_side(&p0);
        if side == 1 {
            if pass {
                continue;
            }
            return false; // don't use back side
        }

        let used = gi.activate_boundary(l, line, id, side, ActivationKind::Use);
        if !pass {
            return used; // can't use for more than one special line in a row
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p_setup::LevelBuilder;
    use crate::p_testutil::*;

    fn facing(ctx: &mut MapContext, id: ActorId, angle: f32) {
        ctx.level.actors.get_mut(id).unwrap().angle = angle;
    }

    /// A switch wall at x = 40 whose front faces the room centre.
    fn switch_ctx(special: u16, flags: BoundaryFlags) -> MapContext {
        let mut lb = LevelBuilder::new();
        let r = lb.add_region(Region::new(0.0, 128.0));
        box_room(&mut lb, r, -256.0, 256.0);
        lb.add_boundary(
            Boundary::new([40.0, 100.0], [40.0, -100.0], r, None)
                .with_special(special, 0)
                .with_flags(flags),
        );
        ctx_from(lb)
    }

    #[test]
    fn test_use_switch_in_front() {
        let mut gi = RecordingImport {
            activation_result: true,
            ..Default::default()
        };
        let mut ctx = switch_ctx(11, BoundaryFlags::empty());
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        assert!(p_use_lines(&mut ctx, &mut gi, p));
        assert_eq!(gi.activations, vec![(4, p, 0, ActivationKind::Use)]);
    }

    #[test]
    fn test_out_of_reach() {
        let mut gi = RecordingImport::default();
        let mut ctx = switch_ctx(11, BoundaryFlags::empty());
        let p = spawn_player(&mut ctx, [-40.0, 0.0, 0.0]);
        assert!(!p_use_lines(&mut ctx, &mut gi, p));
        assert!(gi.activations.is_empty());
    }

    #[test]
    fn test_plain_wall_says_no_way() {
        let mut gi = RecordingImport::default();
        let mut ctx = switch_ctx(0, BoundaryFlags::empty());
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        assert!(!p_use_lines(&mut ctx, &mut gi, p));
        assert_eq!(gi.sounds, vec![SoundKind::NoWay]);
    }

    #[test]
    fn test_back_side_is_ignored() {
        let mut gi = RecordingImport::default();
        let mut ctx = switch_ctx(11, BoundaryFlags::empty());
        let p = spawn_player(&mut ctx, [80.0, 0.0, 0.0]);
        facing(&mut ctx, p, std::f32::consts::PI);
        assert!(!p_use_lines(&mut ctx, &mut gi, p));
        assert!(gi.activations.is_empty());
    }

    #[test]
    fn test_pass_use_reaches_next_line() {
        let mut gi = RecordingImport {
            activation_result: true,
            ..Default::default()
        };
        let mut lb = LevelBuilder::new();
        let r = lb.add_region(Region::new(0.0, 128.0));
        box_room(&mut lb, r, -256.0, 256.0);
        lb.add_boundary(
            Boundary::new([20.0, 100.0], [20.0, -100.0], r, Some(r))
                .with_special(1, 0)
                .with_flags(BoundaryFlags::PASS_USE),
        );
        lb.add_boundary(Boundary::new([40.0, 100.0], [40.0, -100.0], r, None).with_special(11, 0));
        let mut ctx = ctx_from(lb);
        let p = spawn_player(&mut ctx, [0.0, 0.0, 0.0]);
        assert!(p_use_lines(&mut ctx, &mut gi, p));
        let used: Vec<BoundaryId> = gi.activations.iter().map(|a| a.0).collect();
        assert_eq!(used, vec![4, 5]);
    }

    #[test]
    fn test_open_two_sided_line_is_passed() {
        let mut gi = RecordingImport::default();
        let mut ctx = two_room_ctx(0.0, 128.0, 0.0, 128.0);
        let p = spawn_player(&mut ctx, [-30.0, 0.0, 0.0]);
        assert!(!p_use_lines(&mut ctx, &mut gi, p));
        assert!(gi.sounds.is_empty());
    }
}
