#![allow(clippy::float_cmp, clippy::new_without_default)]

// Server side of the static world: sector tree and level spawn.

pub mod sv_init;
pub mod sv_world;
