// p_local.rs — actors, boundaries, regions and movement constants

use bitflags::bitflags;
use sectormove_common::shared::*;

// ============================================================
// Constants
// ============================================================

/// Largest actor radius. Actors are indexed by origin, so box queries are
/// widened by this much to catch neighbours that reach into the box.
pub const MAXRADIUS: f32 = 32.0;
/// Largest floor rise (or drop, for dropoff checks) walked in one move.
pub const MAXSTEP: f32 = 24.0;
/// Reach of a use press.
pub const USERANGE: f32 = 64.0;
/// Attacks at or below this range count as melee.
pub const MELEERANGE: f32 = 64.0;
pub const MISSILERANGE: f32 = 2048.0;

/// Attacks leave from this far above the shooter's mid height.
pub const ATTACK_Z_OFFSET: f32 = 8.0;
/// Slides stop this fraction short of the blocking boundary.
pub const SLIDE_FUDGE: f32 = 1.0 / 32.0;
/// Initial vertical window for auto-aim.
pub const AIM_TOP_SLOPE: f32 = 100.0 / 160.0;
pub const AIM_BOTTOM_SLOPE: f32 = -100.0 / 160.0;
/// Damage dealt to actors stomped by a teleport.
pub const TELEFRAG_DAMAGE: i32 = 10000;

pub type RegionId = usize;
pub type BoundaryId = usize;
pub type ArchetypeId = usize;
pub type PlayerId = usize;
pub type SurfaceId = u32;

// ============================================================
// Flags
// ============================================================

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ActorFlags: u32 {
        const SPECIAL        = 0x0000_0001;
        const SOLID          = 0x0000_0002;
        const SHOOTABLE      = 0x0000_0004;
        const NOSECTOR       = 0x0000_0008;
        const NOBLOCKMAP     = 0x0000_0010;
        const NOGRAVITY      = 0x0000_0020;
        const DROPOFF        = 0x0000_0040;
        const PICKUP         = 0x0000_0080;
        const NOCLIP         = 0x0000_0100;
        const FLOAT          = 0x0000_0200;
        const TELEPORT       = 0x0000_0400;
        const MISSILE        = 0x0000_0800;
        const DROPPED        = 0x0000_1000;
        const NOBLOOD        = 0x0000_2000;
        const CORPSE         = 0x0000_4000;
        const SKULLFLY       = 0x0001_0000;
        const CAMERA         = 0x0002_0000;
        const PUSHABLE       = 0x0004_0000;
        const FRIEND         = 0x0008_0000;
        const BLAST_IGNORE_Z = 0x0010_0000;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BoundaryFlags: u16 {
        const BLOCKING       = 0x0001;
        const BLOCK_MONSTERS = 0x0002;
        const TWO_SIDED      = 0x0004;
        const SECRET         = 0x0020;
        const PASS_USE       = 0x0200;
    }
}

bitflags! {
    /// Per-archetype collision exceptions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ArchetypeTraits: u32 {
        const NO_RADIUS_DAMAGE              = 0x0001;
        const NO_STACKING                   = 0x0002;
        const SPECIES_FRIENDLY_FIRE_IMMUNE  = 0x0004;
        const IGNORE_MONSTER_BLOCK          = 0x0008;
        const CAN_TELEFRAG                  = 0x0010;
    }
}

// ============================================================
// Actor handles
// ============================================================

/// Weak handle to an actor. A removed actor's slot gets a new generation, so
/// old handles stop resolving instead of pointing at whatever reuses the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId {
    pub index: u32,
    pub generation: u32,
}

// ============================================================
// Archetypes
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Archetype {
    pub name: String,
    pub species: u32,
    pub traits: ArchetypeTraits,
}

impl Archetype {
    pub fn new(name: &str, species: u32, traits: ArchetypeTraits) -> Self {
        Self {
            name: name.to_string(),
            species,
            traits,
        }
    }
}

// ============================================================
// Actor
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub origin: Vec3,
    /// Facing, radians counter-clockwise from +x.
    pub angle: f32,
    /// Look pitch, radians, positive is up.
    pub pitch: f32,
    pub radius: f32,
    pub height: f32,
    pub mom: Vec3,

    pub floorz: f32,
    pub ceilingz: f32,
    pub dropoffz: f32,
    pub region: RegionId,

    pub flags: ActorFlags,
    pub archetype: ArchetypeId,
    pub player: Option<PlayerId>,
    /// Recomputed on every accepted move.
    pub standing_on: Option<ActorId>,
    /// For missiles, whoever fired them.
    pub target: Option<ActorId>,
    pub health: i32,
    /// Damage multiplier for missiles and charging actors.
    pub damage: i32,

    pub(crate) area_node: Option<usize>,
}

impl Actor {
    pub fn new(archetype: ArchetypeId, origin: Vec3, radius: f32, height: f32, flags: ActorFlags) -> Self {
        Self {
            origin,
            angle: 0.0,
            pitch: 0.0,
            radius,
            height,
            mom: VEC3_ORIGIN,
            floorz: 0.0,
            ceilingz: 0.0,
            dropoffz: 0.0,
            region: 0,
            flags,
            archetype,
            player: None,
            standing_on: None,
            target: None,
            health: 100,
            damage: 0,
            area_node: None,
        }
    }

    #[inline]
    pub fn xy(&self) -> Vec2 {
        [self.origin[0], self.origin[1]]
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin[2] + self.height
    }

    pub fn bbox(&self) -> BBox {
        BBox::around(self.origin[0], self.origin[1], self.radius)
    }

    pub fn is_player(&self) -> bool {
        self.player.is_some()
    }
}

// ============================================================
// Boundary
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub v1: Vec2,
    pub v2: Vec2,
    pub delta: Vec2,
    pub bbox: BBox,
    pub slope_type: SlopeType,
    /// Region on the right hand side of `v1 -> v2`.
    pub front: RegionId,
    pub back: Option<RegionId>,
    pub flags: BoundaryFlags,
    pub special: u16,
    pub tag: u16,
}

impl Boundary {
    pub fn new(v1: Vec2, v2: Vec2, front: RegionId, back: Option<RegionId>) -> Self {
        let delta = vec2_subtract(&v2, &v1);
        let mut flags = BoundaryFlags::empty();
        if back.is_some() {
            flags |= BoundaryFlags::TWO_SIDED;
        }
        Self {
            v1,
            v2,
            delta,
            bbox: BBox::from_points(&v1, &v2),
            slope_type: SlopeType::from_delta(&delta),
            front,
            back,
            flags,
            special: 0,
            tag: 0,
        }
    }

    pub fn with_flags(mut self, flags: BoundaryFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_special(mut self, special: u16, tag: u16) -> Self {
        self.special = special;
        self.tag = tag;
        self
    }

    /// 0 = front, 1 = back.
    pub fn point_on_side(&self, p: &Vec2) -> usize {
        point_on_line_side(p, &self.v1, &self.delta)
    }

    /// 0 or 1 when the box lies wholly on one side, -1 when it crosses.
    pub fn box_on_side(&self, bbox: &BBox) -> i32 {
        box_on_line_side(bbox, &self.v1, &self.delta, self.slope_type)
    }

    pub fn is_two_sided(&self) -> bool {
        self.back.is_some()
    }

    /// The box overlaps the segment's bounds and straddles the line.
    pub fn touches_box(&self, bbox: &BBox) -> bool {
        bbox.overlaps(&self.bbox) && self.box_on_side(bbox) == -1
    }

    pub fn divline(&self) -> DivLine {
        DivLine::new(&self.v1, &self.delta)
    }
}

// ============================================================
// Region
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub floor_height: f32,
    pub ceiling_height: f32,
    pub floor_pic: SurfaceId,
    pub ceiling_pic: SurfaceId,
    pub light_level: i16,
    pub special: u16,
    pub tag: u16,

    // filled in by LevelBuilder::build
    pub bbox: BBox,
    pub boundaries: Vec<BoundaryId>,
}

impl Region {
    pub fn new(floor_height: f32, ceiling_height: f32) -> Self {
        Self {
            floor_height,
            ceiling_height,
            floor_pic: 0,
            ceiling_pic: 0,
            light_level: 160,
            special: 0,
            tag: 0,
            bbox: BBox::cleared(),
            boundaries: Vec::new(),
        }
    }
}

// ============================================================
// Openings and intercepts
// ============================================================

/// Vertical gap through a two-sided boundary.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Opening {
    pub top: f32,
    pub bottom: f32,
    pub range: f32,
    pub low_floor: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptKind {
    Boundary(BoundaryId),
    Actor(ActorId),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    /// Fraction along the traced segment, 0 at the start.
    pub frac: f32,
    pub kind: InterceptKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_two_sided_flag() {
        let one = Boundary::new([0.0, 0.0], [0.0, 64.0], 0, None);
        assert!(!one.flags.contains(BoundaryFlags::TWO_SIDED));
        let two = Boundary::new([0.0, 0.0], [0.0, 64.0], 0, Some(1));
        assert!(two.flags.contains(BoundaryFlags::TWO_SIDED));
        assert!(two.is_two_sided());
    }

    #[test]
    fn test_boundary_front_is_right_hand_side() {
        let line = Boundary::new([0.0, -100.0], [0.0, 100.0], 0, None);
        assert_eq!(line.point_on_side(&[10.0, 0.0]), 0);
        assert_eq!(line.point_on_side(&[-10.0, 0.0]), 1);
        // on the line counts as back
        assert_eq!(line.point_on_side(&[0.0, 0.0]), 1);
    }

    #[test]
    fn test_touches_box() {
        let line = Boundary::new([20.0, -100.0], [20.0, 100.0], 0, None);
        let a = Actor::new(0, [0.0, 0.0, 0.0], 16.0, 56.0, ActorFlags::SOLID);
        assert!(!line.touches_box(&a.bbox()));
        let b = Actor::new(0, [10.0, 0.0, 0.0], 16.0, 56.0, ActorFlags::SOLID);
        assert!(line.touches_box(&b.bbox()));
    }
}
