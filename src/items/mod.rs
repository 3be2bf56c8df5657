//! Item system: catalog types, drop rolls and the player's inventory.

#![allow(unused_imports)]

pub mod drops;
pub mod inventory;
pub mod types;

pub use drops::*;
pub use inventory::*;
pub use types::*;
