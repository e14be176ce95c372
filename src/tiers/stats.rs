use super::Tier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Population of each tier.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierDistribution {
    pub s: usize,
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl TierDistribution {
    pub fn from_tiers(tiers: impl IntoIterator<Item = Tier>) -> Self {
        let mut dist = Self::default();
        for tier in tiers {
            *dist.slot_mut(tier) += 1;
        }
        dist
    }

    fn slot_mut(&mut self, tier: Tier) -> &mut usize {
        match tier {
            Tier::S => &mut self.s,
            Tier::A => &mut self.a,
            Tier::B => &mut self.b,
            Tier::C => &mut self.c,
        }
    }

    pub fn count(&self, tier: Tier) -> usize {
        match tier {
            Tier::S => self.s,
            Tier::A => self.a,
            Tier::B => self.b,
            Tier::C => self.c,
        }
    }

    pub fn total(&self) -> usize {
        self.s + self.a + self.b + self.c
    }

    /// Share of contributors in `tier`, as a percentage. Zero when empty.
    pub fn percentage(&self, tier: Tier) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.count(tier) as f64 / total as f64 * 100.0
    }
}

impl fmt::Display for TierDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S:{} A:{} B:{} C:{}", self.s, self.a, self.b, self.c)
    }
}
