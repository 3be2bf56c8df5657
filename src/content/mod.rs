//! Built-in content tables.

#![allow(unused_imports)]

pub mod data;

pub use data::default_content;
