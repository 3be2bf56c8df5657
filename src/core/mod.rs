//! Engine core: constants, configuration, errors, randomness and the facade.

#![allow(unused_imports)]

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod events;
pub mod fairness;
pub mod rng;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::{MemorySink, OutcomeSink};
pub use fairness::*;
pub use rng::*;
