// p_testutil.rs — shared test maps and a recording host

use sectormove_common::shared::{Vec2, Vec3};

use crate::game_import::{ActivationKind, GameImport, SoundKind};
use crate::p_config::MoveConfig;
use crate::p_local::*;
use crate::p_setup::{LevelBuilder, MapContext};

/// The two-sided line between the rooms of `two_room_ctx`.
pub const SHARED_LINE: BoundaryId = 0;

#[derive(Debug, Clone, PartialEq)]
pub struct DamageRecord {
    pub target: ActorId,
    pub inflictor: Option<ActorId>,
    pub source: Option<ActorId>,
    pub amount: i32,
    pub is_radius: bool,
}

/// Records every callback.
#[derive(Debug, Default)]
pub struct RecordingImport {
    pub activations: Vec<(BoundaryId, ActorId, usize, ActivationKind)>,
    pub damage: Vec<DamageRecord>,
    pub pickups: Vec<(ActorId, ActorId)>,
    pub puffs: Vec<(Vec3, bool)>,
    pub blood: Vec<(Vec3, i32)>,
    pub crush_blood: Vec<(Vec3, Vec2)>,
    pub gibs: Vec<ActorId>,
    pub sounds: Vec<SoundKind>,
    /// Returned from every activation.
    pub activation_result: bool,
}

impl GameImport for RecordingImport {
    fn activate_boundary(&mut self, id: BoundaryId, _line: &Boundary, activator: ActorId, side: usize, kind: ActivationKind) -> bool {
        self.activations.push((id, activator, side, kind));
        self.activation_result
    }

    fn apply_damage(
        &mut self,
        target_id: ActorId,
        target: &mut Actor,
        inflictor: Option<ActorId>,
        source: Option<ActorId>,
        amount: i32,
        is_radius: bool,
    ) -> i32 {
        target.health -= amount;
        self.damage.push(DamageRecord {
            target: target_id,
            inflictor,
            source,
            amount,
            is_radius,
        });
        amount
    }

    fn touch_special(&mut self, item_id: ActorId, _item: &mut Actor, toucher: ActorId) {
        self.pickups.push((item_id, toucher));
    }

    fn spawn_puff(&mut self, pos: Vec3, melee: bool) {
        self.puffs.push((pos, melee));
    }

    fn spawn_blood(&mut self, pos: Vec3, damage: i32) {
        self.blood.push((pos, damage));
    }

    fn spawn_crush_blood(&mut self, pos: Vec3, mom: Vec2) {
        self.crush_blood.push((pos, mom));
    }

    fn spawn_gibs(&mut self, id: ActorId, _actor: &Actor) {
        self.gibs.push(id);
    }

    fn start_sound(&mut self, _origin: Vec3, sound: SoundKind, _volume: f32) {
        self.sounds.push(sound);
    }
}

/// Four clockwise walls around `[min, max]` on both axes.
pub fn box_room(lb: &mut LevelBuilder, region: RegionId, min: f32, max: f32) {
    lb.add_boundary(Boundary::new([min, min], [min, max], region, None));
    lb.add_boundary(Boundary::new([min, max], [max, max], region, None));
    lb.add_boundary(Boundary::new([max, max], [max, min], region, None));
    lb.add_boundary(Boundary::new([max, min], [min, min], region, None));
}

pub fn box_room_builder(min: f32, max: f32, floor: f32, ceiling: f32) -> LevelBuilder {
    let mut lb = LevelBuilder::new();
    let r = lb.add_region(Region::new(floor, ceiling));
    box_room(&mut lb, r, min, max);
    lb
}

pub fn box_room_ctx(min: f32, max: f32, floor: f32, ceiling: f32) -> MapContext {
    ctx_from(box_room_builder(min, max, floor, ceiling))
}

/// Region 0 spans x in [-256, 0], region 1 spans x in [0, 256], both
/// y in [-256, 256]. They share SHARED_LINE at x = 0, front side region 1.
pub fn two_room_builder(floor_a: f32, ceil_a: f32, floor_b: f32, ceil_b: f32) -> LevelBuilder {
    let mut lb = LevelBuilder::new();
    let a = lb.add_region(Region::new(floor_a, ceil_a));
    let b = lb.add_region(Region::new(floor_b, ceil_b));
    let shared = lb.add_boundary(Boundary::new([0.0, -256.0], [0.0, 256.0], b, Some(a)));
    assert_eq!(shared, SHARED_LINE);

    lb.add_boundary(Boundary::new([-256.0, -256.0], [-256.0, 256.0], a, None));
    lb.add_boundary(Boundary::new([-256.0, 256.0], [0.0, 256.0], a, None));
    lb.add_boundary(Boundary::new([0.0, -256.0], [-256.0, -256.0], a, None));

    lb.add_boundary(Boundary::new([0.0, 256.0], [256.0, 256.0], b, None));
    lb.add_boundary(Boundary::new([256.0, 256.0], [256.0, -256.0], b, None));
    lb.add_boundary(Boundary::new([256.0, -256.0], [0.0, -256.0], b, None));
    lb
}

pub fn two_room_ctx(floor_a: f32, ceil_a: f32, floor_b: f32, ceil_b: f32) -> MapContext {
    ctx_from(two_room_builder(floor_a, ceil_a, floor_b, ceil_b))
}

pub fn ctx_from(lb: LevelBuilder) -> MapContext {
    MapContext::new(lb.build().unwrap(), MoveConfig::default())
}

pub fn spawn(ctx: &mut MapContext, origin: Vec3, radius: f32, height: f32, flags: ActorFlags) -> ActorId {
    spawn_actor(ctx, Actor::new(0, origin, radius, height, flags))
}

pub fn spawn_actor(ctx: &mut MapContext, actor: Actor) -> ActorId {
    ctx.level.spawn_actor(actor).unwrap()
}

pub fn spawn_player(ctx: &mut MapContext, origin: Vec3) -> ActorId {
    let mut actor = Actor::new(0, origin, 16.0, 56.0, ActorFlags::SOLID | ActorFlags::SHOOTABLE | ActorFlags::PICKUP);
    actor.player = Some(0);
    spawn_actor(ctx, actor)
}

pub fn spawn_monster(ctx: &mut MapContext, origin: Vec3) -> ActorId {
    spawn(ctx, origin, 20.0, 56.0, ActorFlags::SOLID | ActorFlags::SHOOTABLE)
}

pub fn pos(ctx: &MapContext, id: ActorId) -> Vec3 {
    ctx.level.actor(id).unwrap().origin
}
