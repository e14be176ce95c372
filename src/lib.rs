//! Ranks repository contributors into S/A/B/C activity tiers.
//!
//! The classification itself lives in [`tiers`] and is a pure function over
//! any slice of [`tiers::ContributorMetric`] records. The other modules feed
//! it (a git history walk or a JSON metrics file) and present the result.

pub mod config;
pub mod git;
pub mod input;
pub mod output;
pub mod tiers;
