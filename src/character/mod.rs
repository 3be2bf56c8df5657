//! Character stats, persisted record, leveling and death.

#![allow(unused_imports)]

pub mod death;
pub mod leveling;
pub mod record;
pub mod stats;

pub use death::*;
pub use leveling::*;
pub use record::*;
pub use stats::*;
