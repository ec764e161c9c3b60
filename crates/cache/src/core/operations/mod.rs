//! Cache operations module

pub mod get;
pub mod misc;
pub mod put;
mod remove;
