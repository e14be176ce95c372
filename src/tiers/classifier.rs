use super::{ContributorMetric, Tier, TierDistribution, TIER_THRESHOLDS};
use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

/// Where one input record landed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Index of the record in the classified slice.
    pub index: usize,
    /// 1-based rank, 1 being the most active contributor.
    pub position: usize,
    /// `position / total`, always in (0, 1].
    pub percentile: f64,
    pub tier: Tier,
}

/// Result of [`assign_tiers`]. Placements are stored in input order, so
/// `placements()[i]` describes `contributors[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierAssignment {
    placements: Vec<Placement>,
}

impl TierAssignment {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn get(&self, index: usize) -> Option<&Placement> {
        self.placements.get(index)
    }

    pub fn tier_of(&self, index: usize) -> Option<Tier> {
        self.get(index).map(|p| p.tier)
    }

    /// Placements ordered by rank position, most active first.
    pub fn ranked(&self) -> Vec<&Placement> {
        let mut ranked: Vec<_> = self.placements.iter().collect();
        ranked.sort_by_key(|p| p.position);
        ranked
    }

    pub fn distribution(&self) -> TierDistribution {
        TierDistribution::from_tiers(self.placements.iter().map(|p| p.tier))
    }

    /// Re-keys the assignment by a caller supplied identifier. `records` must
    /// be the slice that was classified. A key produced twice keeps the tier
    /// of the later record.
    pub fn keyed_by<R, K, F>(&self, records: &[R], mut key: F) -> HashMap<K, Tier>
    where
        K: Eq + Hash,
        F: FnMut(&R) -> K,
    {
        self.placements
            .iter()
            .zip(records)
            .map(|(placement, record)| (key(record), placement.tier))
            .collect()
    }
}

/// Partitions contributors into S/A/B/C tiers by percentile rank of their
/// commit count.
///
/// Contributors are ranked by commits, descending. Equal counts keep their
/// input order, so with ties the earlier record may land in the better tier
/// when the pair straddles a boundary. A contributor at position `p` of `n`
/// gets the first tier in [`TIER_THRESHOLDS`] whose boundary is `>= p / n`.
///
/// The split is not forced to 10/20/30/40 of `n`: two contributors end up in
/// B and C, ten contributors in 1/2/3/4. An empty slice yields an empty
/// assignment.
pub fn assign_tiers<T: ContributorMetric>(contributors: &[T]) -> TierAssignment {
    let total = contributors.len();
    if total == 0 {
        return TierAssignment::default();
    }

    let counts: Vec<f64> = contributors.iter().map(|c| c.commits()).collect();

    let mut order: Vec<usize> = (0..total).collect();
    // sort_by is stable; total_cmp keeps NaN from breaking the ordering.
    order.sort_by(|&a, &b| counts[b].total_cmp(&counts[a]));

    let mut placements = vec![
        Placement {
            index: 0,
            position: 0,
            percentile: 0.0,
            tier: Tier::C,
        };
        total
    ];

    for (rank, &index) in order.iter().enumerate() {
        let position = rank + 1;
        let percentile = position as f64 / total as f64;
        placements[index] = Placement {
            index,
            position,
            percentile,
            tier: TIER_THRESHOLDS.tier_for(percentile),
        };
    }

    TierAssignment { placements }
}
