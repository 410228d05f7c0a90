//! Domain layer
//!
//! Item references, the tag index and the search engine.

pub mod item;
pub mod search;
pub mod tags;
