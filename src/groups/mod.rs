//! Registration groups.

pub mod group;

pub use group::{Group, GroupSource};
