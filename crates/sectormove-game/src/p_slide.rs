// p_slide.rs — sliding along walls
//
// When a straight move is blocked, p_slide_move traces the leading corners of
// the actor along its momentum, finds the nearest boundary it cannot pass,
// moves up to it and redirects the rest of the momentum along the wall.

use sectormove_common::shared::*;

use crate::game_import::GameImport;
use crate::p_check::blocks_mover;
use crate::p_local::*;
use crate::p_move::try_move_to;
use crate::p_setup::{Level, MapContext};
use crate::p_world::PathFlags;

/// How many wall clips are tried before falling back to stair-stepping.
const MAX_SLIDE_ATTEMPTS: usize = 3;

/// Fraction meaning "nothing blocks".
const SLIDE_CLEAR: f32 = 1.0 + 1.0 / 65536.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideOutcome {
    /// The whole momentum was used without touching a wall.
    Moved,
    /// Some or all of the move followed a wall or an axis.
    Slid,
    /// Nothing worked; the actor did not move.
    Stuck,
}

enum Attempt<T> {
    Done(T),
    Retry,
}

/// Run `f` up to `limit` times until it finishes.
fn bounded_retry<T>(limit: usize, mut f: impl FnMut(usize) -> Attempt<T>) -> Option<T> {
    for i in 0..limit {
        if let Attempt::Done(v) = f(i) {
            return Some(v);
        }
    }
    None
}

#[derive(Debug, Clone, Copy)]
struct BestSlide {
    frac: f32,
    line: Option<BoundaryId>,
}

fn slide_blocking(best: &mut BestSlide, frac: f32, line: BoundaryId) {
    if frac < best.frac {
        best.frac = frac;
        best.line = Some(line);
    }
}

/// Returns false once a blocking boundary stops this trace.
fn slide_traverse(level: &Level, mo: &Actor, ic: &Intercept, best: &mut BestSlide) -> bool {
    let InterceptKind::Boundary(id) = ic.kind else {
        return true;
    };
    let li = &level.boundaries[id];

    if li.back.is_none() {
        if li.point_on_side(&mo.xy()) != 0 {
            return true; // don't hit the back side
        }
        slide_blocking(best, ic.frac, id);
        return false;
    }

    if blocks_mover(level, li, mo) {
        slide_blocking(best, ic.frac, id);
        return false;
    }

    let open = level.line_opening(id);
    if open.range < mo.height // doesn't fit
        || open.top - mo.origin[2] < mo.height // mobj is too high
        || open.bottom - mo.origin[2] > MAXSTEP
    // too big a step up
    {
        slide_blocking(best, ic.frac, id);
        return false;
    }

    // this line doesn't block movement
    true
}

/// Project the momentum onto the wall direction.
fn hit_slide_line(line: &Boundary, mom: &mut Vec2) {
    match line.slope_type {
        SlopeType::Horizontal => mom[1] = 0.0,
        SlopeType::Vertical => mom[0] = 0.0,
        _ => {
            let mut dir = line.delta;
            vec2_normalize(&mut dir);
            let along = dot2(mom, &dir);
            *mom = vec2_scale(&dir, along);
        }
    }
}

/// Try the y part of the move, then the x part. Momentum is left alone.
fn stair_step(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId) -> SlideOutcome {
    let Some(mo) = ctx.level.actor(id) else {
        return SlideOutcome::Stuck;
    };
    let [x, y, _] = mo.origin;
    let [mx, my, _] = mo.mom;

    if try_move_to(ctx, gi, id, x, y + my).succeeded {
        return SlideOutcome::Slid;
    }
    if try_move_to(ctx, gi, id, x + mx, y).succeeded {
        return SlideOutcome::Slid;
    }
    SlideOutcome::Stuck
}

fn slide_attempt(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId) -> Attempt<SlideOutcome> {
    let Some(mo) = ctx.level.actor(id).cloned() else {
        return Attempt::Done(SlideOutcome::Stuck);
    };
    let [x, y, _] = mo.origin;
    let [mx, my, _] = mo.mom;
    let r = mo.radius;

    // trace along the three leading corners
    let (leadx, trailx) = if mx > 0.0 { (x + r, x - r) } else { (x - r, x + r) };
    let (leady, traily) = if my > 0.0 { (y + r, y - r) } else { (y - r, y + r) };

    let mut best = BestSlide {
        frac: SLIDE_CLEAR,
        line: None,
    };
    for (sx, sy) in [(leadx, leady), (trailx, leady), (leadx, traily)] {
        let intercepts = ctx
            .level
            .path_intercepts(&[sx, sy], &[sx + mx, sy + my], PathFlags::ADD_LINES);
        for ic in &intercepts {
            if !slide_traverse(&ctx.level, &mo, ic, &mut best) {
                break;
            }
        }
    }

    let Some(line) = best.line else {
        // the move must have hit the middle, so stairstep
        if try_move_to(ctx, gi, id, x + mx, y + my).succeeded {
            return Attempt::Done(SlideOutcome::Moved);
        }
        return Attempt::Done(stair_step(ctx, gi, id));
    };

    // fudge a bit to make sure it doesn't hit
    let frac = best.frac - SLIDE_FUDGE;
    if frac > 0.0 && !try_move_to(ctx, gi, id, x + mx * frac, y + my * frac).succeeded {
        return Attempt::Done(stair_step(ctx, gi, id));
    }

    // now continue along the wall
    let remaining = (1.0 - (frac + SLIDE_FUDGE)).min(1.0);
    if remaining <= 0.0 {
        return Attempt::Done(SlideOutcome::Slid);
    }

    let mut slide = [mx * remaining, my * remaining];
    hit_slide_line(&ctx.level.boundaries[line], &mut slide);

    let Some(a) = ctx.level.actors.get_mut(id) else {
        return Attempt::Done(SlideOutcome::Stuck);
    };
    a.mom[0] = slide[0];
    a.mom[1] = slide[1];
    let [nx, ny, _] = a.origin;

    if try_move_to(ctx, gi, id, nx + slide[0], ny + slide[1]).succeeded {
        Attempt::Done(SlideOutcome::Slid)
    } else {
        Attempt::Retry
    }
}

/// Move actor `id` by its momentum, following walls where the direct path
/// is blocked. Gives up after a fixed number of wall clips and tries the
/// two axis moves on their own.
pub fn p_slide_move(ctx: &mut MapContext, gi: &mut dyn GameImport, id: ActorId) -> SlideOutcome {
    bounded_retry(MAX_SLIDE_ATTEMPTS, |_| slide_attempt(ctx, gi, id)).unwrap_or_else(|| stair_step(ctx, gi, id))
}
