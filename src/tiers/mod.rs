use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod classifier;
pub mod stats;

pub use classifier::{assign_tiers, Placement, TierAssignment};
pub use stats::TierDistribution;

/// Performance tier of a contributor. `S` is the best, `C` the worst, and the
/// derived ordering follows that (`S < A < B < C`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    S,
    A,
    B,
    C,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "S" => Ok(Tier::S),
            "A" => Ok(Tier::A),
            "B" => Ok(Tier::B),
            "C" => Ok(Tier::C),
            other => Err(anyhow::anyhow!("Unknown tier '{}'", other)),
        }
    }
}

/// Anything that can be ranked by commit activity.
pub trait ContributorMetric {
    fn commits(&self) -> f64;
}

impl<T: ContributorMetric + ?Sized> ContributorMetric for &T {
    fn commits(&self) -> f64 {
        (**self).commits()
    }
}

macro_rules! impl_metric_for_number {
    ($($t:ty),*) => {
        $(
            impl ContributorMetric for $t {
                fn commits(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_metric_for_number!(u32, u64, usize, i32, i64, f32, f64);

/// Cumulative percentile boundaries, ascending, each paired with the tier it
/// closes. The last boundary is always 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    bands: [(f64, Tier); 4],
}

/// Top 10% are S, the next 20% A, the next 30% B, the rest C.
pub const TIER_THRESHOLDS: TierThresholds = TierThresholds {
    bands: [(0.10, Tier::S), (0.30, Tier::A), (0.60, Tier::B), (1.00, Tier::C)],
};

impl TierThresholds {
    pub fn bands(&self) -> &[(f64, Tier)] {
        &self.bands
    }

    /// First tier whose boundary is >= `percentile`. Boundaries are inclusive.
    pub fn tier_for(&self, percentile: f64) -> Tier {
        self.bands
            .iter()
            .find(|(bound, _)| percentile <= *bound)
            .map(|(_, tier)| *tier)
            .unwrap_or(Tier::C)
    }
}
