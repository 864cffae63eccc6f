#![allow(clippy::needless_range_loop, clippy::float_cmp, clippy::identity_op,
         clippy::new_without_default)]

pub mod q_shared;
pub mod qfiles;
pub mod error;
pub mod byte_order;
pub mod md4;
pub mod cvar;
pub mod files;
pub mod cmodel;
pub mod cm_query;
pub mod cm_area;
pub mod cm_patch;
pub mod bsp_writer;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
