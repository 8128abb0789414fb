#![allow(clippy::too_many_arguments, clippy::float_cmp, clippy::manual_range_contains,
         clippy::comparison_chain, clippy::needless_range_loop)]
// Shared code for the sector movement workspace: map geometry helpers,
// console printing and console variables.

pub mod shared;
pub mod common;
pub mod cvar;
