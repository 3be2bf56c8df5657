//! Cooperative raids: a party of humans and simulated allies against a boss.

#![allow(unused_imports)]

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
