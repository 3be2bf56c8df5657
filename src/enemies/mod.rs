//! Enemy templates, encounter selection and level scaling.

#![allow(unused_imports)]

pub mod scaling;
pub mod types;

pub use scaling::*;
pub use types::*;
