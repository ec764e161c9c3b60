//! Bulk and introspection operations

mod clear;
mod stats;
