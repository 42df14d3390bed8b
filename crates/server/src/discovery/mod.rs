//! Course discovery: augments resource searches with course listings drawn from a
//! curated dataset of real courses plus templated entries across known platforms.

pub mod catalog;
pub mod engine;

pub use engine::{discover_courses, DiscoveryCourse};
