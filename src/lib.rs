//! Lodgelink - record linkage for accommodation listings
//!
//! This library resolves duplicate hotel listings appearing independently in
//! two booking datasets. It implements a blocking / scoring / classification /
//! resolution pipeline producing a one-to-one matched table.

pub mod config;
pub mod core;
pub mod dataset;
pub mod models;
pub mod normalize;

// Re-export commonly used types
pub use crate::core::{jaro, jaro_winkler, LinkError, Linker};
pub use crate::models::{
    ClassifierMode, LinkOptions, LinkReport, LinkedRecord, Listing, MatchMode, ResolutionPolicy,
};
