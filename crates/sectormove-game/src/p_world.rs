// p_world.rs — area-node spatial index, point location and path traversal
//
// ===============================================================================
//
// ENTITY AREA CHECKING
//
// The map is split by a uniformly subdivided tree of area nodes. Boundaries
// and actors link into the first node their bounds cross, so a box query only
// has to walk the nodes the box touches.
//
// ===============================================================================

use sectormove_common::shared::*;

use crate::p_local::*;
use crate::p_setup::{ActorPool, Level};

const AREA_DEPTH: i32 = 4;

bitflags::bitflags! {
    /// What `path_intercepts` collects.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PathFlags: u8 {
        const ADD_LINES  = 1;
        const ADD_THINGS = 2;
    }
}

// ============================================================
// Area node
// ============================================================

#[derive(Debug, Clone)]
pub struct AreaNode {
    pub axis: i32, // -1 = leaf node
    pub dist: f32,
    pub children: [usize; 2], // [high side, low side]
    pub actors: Vec<ActorId>,
    pub boundaries: Vec<BoundaryId>,
}

impl Default for AreaNode {
    fn default() -> Self {
        Self {
            axis: -1,
            dist: 0.0,
            children: [usize::MAX; 2],
            actors: Vec::new(),
            boundaries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AreaIndex {
    nodes: Vec<AreaNode>,
}

impl AreaIndex {
    /// Build the node tree over the given world bounds.
    pub fn new(bounds: &BBox) -> Self {
        let mut index = Self { nodes: Vec::new() };
        index.create_area_node(0, &bounds.mins(), &bounds.maxs());
        index
    }

    fn create_area_node(&mut self, depth: i32, mins: &Vec2, maxs: &Vec2) -> usize {
        let anode_idx = self.nodes.len();
        self.nodes.push(AreaNode::default());

        if depth == AREA_DEPTH {
            return anode_idx;
        }

        let size = vec2_subtract(maxs, mins);
        let axis = if size[0] > size[1] { 0 } else { 1 };
        let dist = 0.5 * (maxs[axis] + mins[axis]);

        let mut maxs1 = *maxs;
        let mut mins2 = *mins;
        maxs1[axis] = dist;
        mins2[axis] = dist;

        let child0 = self.create_area_node(depth + 1, &mins2, maxs);
        let child1 = self.create_area_node(depth + 1, mins, &maxs1);

        let node = &mut self.nodes[anode_idx];
        node.axis = axis as i32;
        node.dist = dist;
        node.children = [child0, child1];
        anode_idx
    }

    /// First node that the box crosses, or the leaf that holds it.
    fn find_node(&self, bbox: &BBox) -> usize {
        let mins = bbox.mins();
        let maxs = bbox.maxs();
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[node_idx];
            if node.axis == -1 {
                break;
            }
            let axis = node.axis as usize;
            if mins[axis] > node.dist {
                node_idx = node.children[0];
            } else if maxs[axis] < node.dist {
                node_idx = node.children[1];
            } else {
                break; // crosses the node
            }
        }
        node_idx
    }

    pub fn link_boundary(&mut self, id: BoundaryId, bbox: &BBox) {
        let node_idx = self.find_node(bbox);
        self.nodes[node_idx].boundaries.push(id);
    }

    /// Link an actor by its footprint, padded by one unit. Returns the node.
    pub fn link_actor(&mut self, id: ActorId, footprint: &BBox) -> usize {
        let node_idx = self.find_node(&footprint.expand(1.0));
        self.nodes[node_idx].actors.push(id);
        node_idx
    }

    pub fn unlink_actor(&mut self, id: ActorId, node_idx: usize) {
        if let Some(node) = self.nodes.get_mut(node_idx) {
            node.actors.retain(|&a| a != id);
        }
    }

    fn area_r<F: FnMut(&AreaNode)>(&self, node_idx: usize, bbox: &BBox, f: &mut F) {
        let node = &self.nodes[node_idx];
        f(node);

        if node.axis == -1 {
            return; // terminal node
        }

        let axis = node.axis as usize;
        if bbox.maxs()[axis] >= node.dist {
            self.area_r(node.children[0], bbox, f);
        }
        if bbox.mins()[axis] <= node.dist {
            self.area_r(node.children[1], bbox, f);
        }
    }

    /// Actors whose origin lies in the box, in handle order. Callers widen
    /// the box by MAXRADIUS to catch actors reaching into it.
    pub fn area_actors(&self, actors: &ActorPool, bbox: &BBox) -> Vec<ActorId> {
        let mut list = Vec::new();
        if self.nodes.is_empty() {
            return list;
        }
        self.area_r(0, bbox, &mut |node| {
            for &id in &node.actors {
                let Some(actor) = actors.get(id) else { continue };
                let [x, y, _] = actor.origin;
                if x >= bbox.left && x <= bbox.right && y >= bbox.bottom && y <= bbox.top {
                    list.push(id);
                }
            }
        });
        list.sort();
        list
    }

    /// Boundaries whose bounds overlap the box, in index order. Touching
    /// edges count when `inclusive` is set.
    pub fn area_boundaries(&self, boundaries: &[Boundary], bbox: &BBox, inclusive: bool) -> Vec<BoundaryId> {
        let mut list = Vec::new();
        if self.nodes.is_empty() {
            return list;
        }
        self.area_r(0, bbox, &mut |node| {
            for &id in &node.boundaries {
                let lb = &boundaries[id].bbox;
                let hit = if inclusive {
                    !(bbox.right < lb.left || bbox.left > lb.right || bbox.top < lb.bottom || bbox.bottom > lb.top)
                } else {
                    bbox.overlaps(lb)
                };
                if hit {
                    list.push(id);
                }
            }
        });
        list.sort_unstable();
        list
    }
}

// ============================================================
// Level queries
// ============================================================

impl Level {
    /// Region containing the point. Casts a ray towards +x and takes the side
    /// of the nearest boundary it crosses.
    pub fn point_region(&self, x: f32, y: f32) -> RegionId {
        let probe = BBox {
            top: y,
            bottom: y,
            left: x,
            right: f32::MAX,
        };

        let mut best: Option<(f32, f32, BoundaryId)> = None;
        for id in self.index.area_boundaries(&self.boundaries, &probe, true) {
            let line = &self.boundaries[id];
            // half-open rule, the ray runs just above y
            if (line.v1[1] > y) == (line.v2[1] > y) {
                continue;
            }
            let dxdy = line.delta[0] / line.delta[1];
            let hit_x = line.v1[0] + (y - line.v1[1]) * dxdy;
            if hit_x < x {
                continue;
            }
            // at a shared vertex the crossing nearer just above the ray wins
            let closer = match best {
                None => true,
                Some((bx, bs, _)) => hit_x < bx || (hit_x == bx && dxdy < bs),
            };
            if closer {
                best = Some((hit_x, dxdy, id));
            }
        }

        match best {
            Some((_, _, id)) => {
                let line = &self.boundaries[id];
                if line.point_on_side(&[x, y]) == 0 {
                    line.front
                } else {
                    line.back.unwrap_or(line.front)
                }
            }
            None => 0,
        }
    }

    /// Vertical gap through a boundary. One-sided boundaries have none.
    pub fn line_opening(&self, id: BoundaryId) -> Opening {
        let line = &self.boundaries[id];
        let Some(back) = line.back else {
            let floor = self.regions[line.front].floor_height;
            return Opening {
                top: floor,
                bottom: floor,
                range: 0.0,
                low_floor: floor,
            };
        };

        let front = &self.regions[line.front];
        let back = &self.regions[back];

        let top = front.ceiling_height.min(back.ceiling_height);
        let (bottom, low_floor) = if front.floor_height > back.floor_height {
            (front.floor_height, back.floor_height)
        } else {
            (back.floor_height, front.floor_height)
        };

        Opening {
            top,
            bottom,
            range: top - bottom,
            low_floor,
        }
    }

    /// Everything the segment `p0 -> p1` passes through, nearest first.
    /// Boundaries sort ahead of actors at the same fraction.
    pub fn path_intercepts(&self, p0: &Vec2, p1: &Vec2, flags: PathFlags) -> Vec<Intercept> {
        let trace = DivLine::from_points(p0, p1);
        let bbox = BBox::from_points(p0, p1);
        let mut intercepts = Vec::new();

        if flags.contains(PathFlags::ADD_LINES) {
            for id in self.index.area_boundaries(&self.boundaries, &bbox, true) {
                let line = &self.boundaries[id];
                let s1 = point_on_divline_side(&line.v1, &trace);
                let s2 = point_on_divline_side(&line.v2, &trace);
                if s1 == s2 {
                    continue; // line isn't crossed
                }
                let frac = intercept_vector(&trace, &line.divline());
                if !(0.0..=1.0).contains(&frac) {
                    continue; // behind source or beyond the end
                }
                intercepts.push(Intercept {
                    frac,
                    kind: InterceptKind::Boundary(id),
                });
            }
        }

        if flags.contains(PathFlags::ADD_THINGS) {
            let tracepositive = (trace.dx > 0.0) == (trace.dy > 0.0);
            for id in self.index.area_actors(&self.actors, &bbox.expand(MAXRADIUS)) {
                let Some(thing) = self.actors.get(id) else { continue };
                let [x, y, _] = thing.origin;
                let r = thing.radius;

                // check the diagonal facing the trace
                let (c1, c2) = if tracepositive {
                    ([x - r, y + r], [x + r, y - r])
                } else {
                    ([x - r, y - r], [x + r, y + r])
                };
                let s1 = point_on_divline_side(&c1, &trace);
                let s2 = point_on_divline_side(&c2, &trace);
                if s1 == s2 {
                    continue; // line isn't crossed
                }

                let dl = DivLine::from_points(&c1, &c2);
                let frac = intercept_vector(&trace, &dl);
                if !(0.0..=1.0).contains(&frac) {
                    continue;
                }
                intercepts.push(Intercept {
                    frac,
                    kind: InterceptKind::Actor(id),
                });
            }
        }

        // stable: boundaries were pushed first
        intercepts.sort_by(|a, b| a.frac.total_cmp(&b.frac));
        intercepts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::p_testutil::*;
    use proptest::prelude::*;

    #[test]
    fn test_area_index_finds_linked_actor() {
        let mut ctx = box_room_ctx(-512.0, 512.0, 0.0, 128.0);
        let near = spawn(&mut ctx, [100.0, 100.0, 0.0], 16.0, 56.0, ActorFlags::SOLID);
        let far = spawn(&mut ctx, [-300.0, -300.0, 0.0], 16.0, 56.0, ActorFlags::SOLID);
        let level = &ctx.level;
        let found = level.index.area_actors(&level.actors, &BBox::around(100.0, 100.0, 40.0));
        assert_eq!(found, vec![near]);
        let all = level.index.area_actors(&level.actors, &BBox::around(0.0, 0.0, 512.0));
        assert!(all.contains(&near) && all.contains(&far));
    }

    #[test]
    fn test_area_boundaries_filters_by_box() {
        let ctx = box_room_ctx(-256.0, 256.0, 0.0, 128.0);
        let level = &ctx.level;
        let ids = level.index.area_boundaries(&level.boundaries, &BBox::around(240.0, 0.0, 32.0), false);
        assert_eq!(ids.len(), 1);
        let line = &level.boundaries[ids[0]];
        assert_eq!(line.v1[0], 256.0);
        assert_eq!(line.v2[0], 256.0);
    }

    #[test]
    fn test_point_region_two_rooms() {
        let ctx = two_room_ctx(0.0, 128.0, 40.0, 128.0);
        assert_eq!(ctx.level.point_region(-100.0, 0.0), 0);
        assert_eq!(ctx.level.point_region(100.0, 0.0), 1);
        // on the shared line counts as the back side
        assert_eq!(ctx.level.point_region(0.0, 0.0), 0);
    }

    #[test]
    fn test_point_region_at_vertex_height() {
        let ctx = two_room_ctx(0.0, 128.0, 40.0, 128.0);
        // level with the room corners, the ray passes through shared vertices
        assert_eq!(ctx.level.point_region(-100.0, 256.0 - 0.001), 0);
        assert_eq!(ctx.level.point_region(100.0, -256.0), 1);
    }

    #[test]
    fn test_line_opening() {
        let ctx = two_room_ctx(0.0, 128.0, 40.0, 96.0);
        let open = ctx.level.line_opening(SHARED_LINE);
        assert_eq!(open.bottom, 40.0);
        assert_eq!(open.top, 96.0);
        assert_eq!(open.range, 56.0);
        assert_eq!(open.low_floor, 0.0);
    }

    #[test]
    fn test_path_intercepts_sorted_lines_first() {
        let mut ctx = two_room_ctx(0.0, 128.0, 0.0, 128.0);
        // actor centered on the shared line: its diagonal crosses at the same spot
        let a = spawn(&mut ctx, [0.0, 0.0, 0.0], 16.0, 56.0, ActorFlags::SOLID | ActorFlags::SHOOTABLE);
        let ics = ctx.level.path_intercepts(
            &[-200.0, 0.0],
            &[200.0, 0.0],
            PathFlags::ADD_LINES | PathFlags::ADD_THINGS,
        );
        assert_eq!(ics.len(), 2);
        assert!(matches!(ics[0].kind, InterceptKind::Boundary(_)));
        assert_eq!(ics[1].kind, InterceptKind::Actor(a));
        assert!((ics[0].frac - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_path_intercepts_respects_flags() {
        let mut ctx = two_room_ctx(0.0, 128.0, 0.0, 128.0);
        spawn(&mut ctx, [50.0, 0.0, 0.0], 16.0, 56.0, ActorFlags::SOLID);
        let lines = ctx.level.path_intercepts(&[-100.0, 0.0], &[100.0, 0.0], PathFlags::ADD_LINES);
        assert!(lines.iter().all(|ic| matches!(ic.kind, InterceptKind::Boundary(_))));
        let things = ctx.level.path_intercepts(&[-100.0, 0.0], &[100.0, 0.0], PathFlags::ADD_THINGS);
        assert_eq!(things.len(), 1);
    }

    proptest! {
        #[test]
        fn prop_intercepts_non_decreasing(
            x0 in -240.0f32..240.0, y0 in -240.0f32..240.0,
            x1 in -240.0f32..240.0, y1 in -240.0f32..240.0,
        ) {
            let mut ctx = two_room_ctx(0.0, 128.0, 16.0, 128.0);
            spawn(&mut ctx, [60.0, 40.0, 0.0], 16.0, 56.0, ActorFlags::SOLID);
            spawn(&mut ctx, [-80.0, -20.0, 0.0], 20.0, 56.0, ActorFlags::SOLID);
            let ics = ctx.level.path_intercepts(&[x0, y0], &[x1, y1], PathFlags::ADD_LINES | PathFlags::ADD_THINGS);
            for pair in ics.windows(2) {
                prop_assert!(pair[0].frac <= pair[1].frac);
            }
            for ic in &ics {
                prop_assert!((0.0..=1.0).contains(&ic.frac));
            }
        }
    }
}
