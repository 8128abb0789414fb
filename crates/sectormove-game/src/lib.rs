#![allow(clippy::too_many_arguments, clippy::collapsible_if, clippy::collapsible_else_if,
         clippy::float_cmp, clippy::manual_range_contains, clippy::comparison_chain,
         clippy::needless_range_loop, clippy::new_without_default)]
// Movement and collision core: position checks, moves, slides, traces,
// blast damage and sector height changes.

pub mod game_import;
pub mod p_local;
pub mod p_config;
pub mod p_setup;
pub mod p_world;
pub mod p_check;
pub mod p_move;
pub mod p_slide;
pub mod p_attack;
pub mod p_aim;
pub mod p_radius;
pub mod p_use;
pub mod p_sight;
pub mod p_sector;

#[cfg(test)]
mod p_testutil;

pub use game_import::{ActivationKind, GameImport, SoundKind};
pub use p_aim::{p_aim_line_attack, AimResult};
pub use p_attack::{p_line_attack, AttackResult};
pub use p_check::{p_check_position, CheckMode, Contact, PositionCheck};
pub use p_config::{ConfigError, DropoffPolicy, MoveConfig};
pub use p_local::*;
pub use p_move::{p_teleport_move, p_try_move, p_try_move_z, Blocker, MoveResult};
pub use p_radius::{p_radius_attack, radius_damage_amount};
pub use p_sector::{p_change_sector, p_move_plane, p_thing_height_clip, PlaneDirection, PlaneKind, PlaneMove, PlaneResult};
pub use p_setup::{ActorPool, Level, LevelBuilder, LevelError, MapContext, RejectMatrix};
pub use p_sight::p_check_sight;
pub use p_slide::{p_slide_move, SlideOutcome};
pub use p_use::p_use_lines;
