// game_import.rs — host callbacks used by the movement core
//
// The host passes an implementation into every operation that can fire
// triggers, deal damage or spawn effects. Callbacks only ever see the data
// they are handed, never the level, so a trigger cannot start another move
// while one is in progress.

use sectormove_common::common::com_dprintf;
use sectormove_common::shared::{Vec2, Vec3};

use crate::p_local::{Actor, ActorId, Boundary, BoundaryId};

/// How a boundary special was set off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationKind {
    /// A player walked over the line.
    Cross,
    /// Use press.
    Use,
    /// Shot or struck by a projectile.
    Impact,
    MonsterCross,
    ProjectileCross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// Use press against something out of reach.
    NoWay,
}

/// Functions provided by the host to the movement core.
pub trait GameImport {
    // Triggers
    /// Returns true when the special did something.
    fn activate_boundary(
        &mut self,
        id: BoundaryId,
        line: &Boundary,
        activator: ActorId,
        side: usize,
        kind: ActivationKind,
    ) -> bool;

    // Damage
    /// Returns the damage actually dealt.
    fn apply_damage(
        &mut self,
        target_id: ActorId,
        target: &mut Actor,
        inflictor: Option<ActorId>,
        source: Option<ActorId>,
        amount: i32,
        is_radius: bool,
    ) -> i32;

    /// `toucher` walked over a SPECIAL actor while carrying PICKUP.
    fn touch_special(&mut self, item_id: ActorId, item: &mut Actor, toucher: ActorId);

    // Effects
    fn spawn_puff(&mut self, pos: Vec3, melee: bool);
    fn spawn_blood(&mut self, pos: Vec3, damage: i32);
    fn spawn_crush_blood(&mut self, pos: Vec3, mom: Vec2);
    fn spawn_gibs(&mut self, id: ActorId, actor: &Actor);
    fn start_sound(&mut self, origin: Vec3, sound: SoundKind, volume: f32);
}

/// Minimal host: logs triggers and effects, subtracts damage from health.
pub struct StubGameImport;

impl GameImport for StubGameImport {
    fn activate_boundary(&mut self, id: BoundaryId, line: &Boundary, activator: ActorId, side: usize, kind: ActivationKind) -> bool {
        com_dprintf(&format!(
            "activate line {} special {} tag {} by {:?} side {} ({:?})\n",
            id, line.special, line.tag, activator, side, kind
        ));
        false
    }

    fn apply_damage(
        &mut self,
        _target_id: ActorId,
        target: &mut Actor,
        _inflictor: Option<ActorId>,
        _source: Option<ActorId>,
        amount: i32,
        _is_radius: bool,
    ) -> i32 {
        target.health -= amount;
        amount
    }

    fn touch_special(&mut self, item_id: ActorId, _item: &mut Actor, toucher: ActorId) {
        com_dprintf(&format!("{:?} touched {:?}\n", toucher, item_id));
    }

    fn spawn_puff(&mut self, pos: Vec3, melee: bool) {
        com_dprintf(&format!("puff at {:?} melee {}\n", pos, melee));
    }

    fn spawn_blood(&mut self, pos: Vec3, damage: i32) {
        com_dprintf(&format!("blood at {:?} ({})\n", pos, damage));
    }

    fn spawn_crush_blood(&mut self, pos: Vec3, mom: Vec2) {
        com_dprintf(&format!("crush blood at {:?} mom {:?}\n", pos, mom));
    }

    fn spawn_gibs(&mut self, id: ActorId, _actor: &Actor) {
        com_dprintf(&format!("{:?} gibbed\n", id));
    }

    fn start_sound(&mut self, origin: Vec3, sound: SoundKind, volume: f32) {
        com_dprintf(&format!("sound {:?} at {:?} vol {}\n", sound, origin, volume));
    }
}
