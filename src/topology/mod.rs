//! Partition topology: who owns which global row.

pub mod geometry;
pub mod ownership;
