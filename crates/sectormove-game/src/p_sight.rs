// p_sight.rs — line of sight between actors

use crate::p_local::*;
use crate::p_setup::Level;
use crate::p_world::PathFlags;

/// True when `looker` has an unobstructed view of any part of `target`.
pub fn p_check_sight(level: &Level, looker: ActorId, target: ActorId) -> bool {
    let (Some(t1), Some(t2)) = (level.actor(looker), level.actor(target)) else {
        return false;
    };

    // precomputed region pair table
    if let Some(reject) = &level.reject {
        if reject.is_blocked(t1.region, t2.region) {
            return false;
        }
    }

    let sightz = t1.origin[2] + t1.height - t1.height / 4.0;
    let mut topslope = t2.top() - sightz;
    let mut bottomslope = t2.origin[2] - sightz;

    let p0 = t1.xy();
    let p1 = t2.xy();
    let dx = p1[0] - p0[0];
    let dy = p1[1] - p0[1];
    let total = (dx * dx + dy * dy).sqrt();
    if total > 0.0 {
        topslope /= total;
        bottomslope /= total;
    }

    for ic in level.path_intercepts(&p0, &p1, PathFlags::ADD_LINES) {
        let InterceptKind::Boundary(id) = ic.kind else { continue };
        let li = &level.boundaries[id];
        let Some(back) = li.back else {
            return false; // stop
        };

        let open = level.line_opening(id);
        if open.bottom >= open.top {
            return false; // quick test for totally closed doors
        }

        let dist = (total * ic.frac).max(0.001);
        let front = &level.regions[li.front];
        let back = &level.regions[back];

        if front.floor_height != back.floor_height {
            bottomslope = bottomslope.max((open.bottom - sightz) / dist);
        }
        if front.ceiling_height != back.ceiling_height {
            topslope = topslope.min((open.top - sightz) / dist);
        }

        if topslope <= bottomslope {
            return false; // stop
        }
    }

    true // can see
}
