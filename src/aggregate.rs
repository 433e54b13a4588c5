use crate::desc::RegionId;
use crate::flatten::FlatPair;
use std::collections::HashMap;
use tracing::debug;

/// A summed signal.
///
/// `Zero` is the sum over no voxels at all. It is kept apart from `Real(0.0)` because
/// the two print differently in the report (`0` against `0.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalValue {
    Zero,
    Real(f64),
}

impl SignalValue {
    pub fn as_f64(self) -> f64 {
        match self {
            SignalValue::Zero => 0.0,
            SignalValue::Real(v) => v,
        }
    }

    pub fn is_real(self) -> bool {
        matches!(self, SignalValue::Real(_))
    }
}

/// A pool of labeled voxels that can be drained one region at a time.
///
/// Each voxel is counted toward at most one region: once `take_region_sum` has
/// returned it, later calls (for any id, including the same one) never see it again.
pub trait RegionSums {
    /// Sums the signal of every remaining voxel labeled `region_id` and marks them spent.
    /// Returns `SignalValue::Zero` when nothing matches.
    fn take_region_sum(&mut self, region_id: RegionId) -> SignalValue;

    /// Number of voxels not yet spent.
    fn remaining(&self) -> usize;
}

// Scan and shrink
// -----------------------------------------------------------------------------

impl RegionSums for FlatPair {
    /// Single pass that compacts the unmatched pairs to the front, keeping their order.
    fn take_region_sum(&mut self, region_id: RegionId) -> SignalValue {
        debug_assert_eq!(self.signals.len(), self.labels.len());

        let mut sum = SignalValue::Zero;
        let mut keep_i = 0usize;
        for i in 0..self.labels.len() {
            if self.labels[i] == region_id {
                sum = SignalValue::Real(sum.as_f64() + self.signals[i]);
            } else {
                self.labels[keep_i] = self.labels[i];
                self.signals[keep_i] = self.signals[i];
                keep_i += 1;
            }
        }
        self.labels.truncate(keep_i);
        self.signals.truncate(keep_i);

        sum
    }

    fn remaining(&self) -> usize {
        self.len()
    }
}

// Grouped by label
// -----------------------------------------------------------------------------

/// Voxel positions grouped by label, built once from a `FlatPair`.
///
/// Draining a region removes its whole group, so the total work is linear in the
/// number of voxels instead of (regions x voxels). Positions within a group are in
/// scan order, so sums accumulate in the same order as the scan-and-shrink pass and
/// come out bit-identical.
#[derive(Debug, Clone)]
pub struct RegionIndex {
    signals: Vec<f64>,
    voxel_iz_by_region: HashMap<RegionId, Vec<usize>>,
    remaining: usize,
}

impl RegionIndex {
    pub fn new(flat: FlatPair) -> Self {
        let FlatPair { signals, labels } = flat;

        let mut voxel_iz_by_region: HashMap<RegionId, Vec<usize>> = HashMap::new();
        for (flat_i, &label) in labels.iter().enumerate() {
            voxel_iz_by_region.entry(label).or_default().push(flat_i);
        }

        debug!(n_regions = voxel_iz_by_region.len(), "built region index");
        Self {
            remaining: labels.len(),
            signals,
            voxel_iz_by_region,
        }
    }

    /// Number of distinct labels not yet drained.
    pub fn n_regions(&self) -> usize {
        self.voxel_iz_by_region.len()
    }
}

impl RegionSums for RegionIndex {
    fn take_region_sum(&mut self, region_id: RegionId) -> SignalValue {
        let Some(voxel_iz) = self.voxel_iz_by_region.remove(&region_id) else {
            return SignalValue::Zero;
        };

        self.remaining -= voxel_iz.len();
        let mut sum = 0.0_f64;
        for i in voxel_iz {
            sum += self.signals[i];
        }
        // Groups are never empty, so a present region always has a real sum.
        SignalValue::Real(sum)
    }

    fn remaining(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desc::BACKGROUND;
    use super::SignalValue::{Real, Zero};
    use proptest::prelude::*;

    fn flat_pair(pairs: &[(f64, i64)]) -> FlatPair {
        FlatPair {
            signals: pairs.iter().map(|&(s, _)| s).collect(),
            labels: pairs.iter().map(|&(_, l)| RegionId(l)).collect(),
        }
    }

    #[test]
    fn scan_sums_matches_and_removes_them_in_order() {
        let mut flat = flat_pair(&[(1.0, 5), (2.0, 7), (4.0, 5), (8.0, 9), (16.0, 7)]);

        let sum = flat.take_region_sum(RegionId(5));
        assert_eq!(sum, Real(5.0));
        assert_eq!(flat.labels, vec![RegionId(7), RegionId(9), RegionId(7)]);
        assert_eq!(flat.signals, vec![2.0, 8.0, 16.0]);
        assert_eq!(flat.remaining(), 3);
    }

    #[test]
    fn scan_returns_zero_for_unknown_and_leaves_pair_untouched() {
        let mut flat = flat_pair(&[(1.0, 5), (2.0, 7)]);
        let before = flat.clone();
        assert_eq!(flat.take_region_sum(RegionId(42)), Zero);
        assert_eq!(flat, before);
    }

    #[test]
    fn repeat_request_for_same_region_is_zero() {
        let mut flat = flat_pair(&[(1.5, 3), (2.5, 3), (9.0, 4)]);
        assert_eq!(flat.take_region_sum(RegionId(3)), Real(4.0));
        assert_eq!(flat.take_region_sum(RegionId(3)), Zero);

        let mut index = RegionIndex::new(flat_pair(&[(1.5, 3), (2.5, 3), (9.0, 4)]));
        assert_eq!(index.take_region_sum(RegionId(3)), Real(4.0));
        assert_eq!(index.take_region_sum(RegionId(3)), Zero);
        assert_eq!(index.remaining(), 1);
        assert_eq!(index.n_regions(), 1);
    }

    #[test]
    fn background_request_is_zero() {
        let mut index = RegionIndex::new(flat_pair(&[(1.0, 1), (2.0, 2)]));
        assert_eq!(index.take_region_sum(BACKGROUND), Zero);
        assert_eq!(index.remaining(), 2);
    }

    #[test]
    fn index_drains_to_empty() {
        let mut index = RegionIndex::new(flat_pair(&[(1.0, 1), (2.0, 2), (3.0, 1)]));
        assert_eq!(index.n_regions(), 2);
        assert_eq!(index.take_region_sum(RegionId(1)), Real(4.0));
        assert_eq!(index.take_region_sum(RegionId(2)), Real(2.0));
        assert_eq!(index.remaining(), 0);
        assert_eq!(index.n_regions(), 0);
    }

    #[test]
    fn matched_voxels_summing_to_zero_stay_real() {
        let mut flat = flat_pair(&[(0.0, 6), (-2.0, 7), (2.0, 7)]);
        let mut index = RegionIndex::new(flat.clone());
        assert_eq!(flat.take_region_sum(RegionId(6)), Real(0.0));
        assert_eq!(flat.take_region_sum(RegionId(7)), Real(0.0));
        assert_eq!(index.take_region_sum(RegionId(6)), Real(0.0));
        assert_eq!(index.take_region_sum(RegionId(7)), Real(0.0));
    }

    fn arb_pairs() -> impl Strategy<Value = Vec<(f64, i64)>> {
        prop::collection::vec((-1000.0_f64..1000.0, 1_i64..8), 0..200)
    }

    proptest! {
        #[test]
        fn region_sums_conserve_total(pairs in arb_pairs()) {
            let flat = flat_pair(&pairs);
            let mut index = RegionIndex::new(flat.clone());

            let mut ids: Vec<RegionId> = flat.labels.clone();
            ids.sort();
            ids.dedup();

            let total: f64 = pairs.iter().map(|&(s, _)| s).sum();
            let mut by_region = 0.0;
            for id in ids {
                by_region += index.take_region_sum(id).as_f64();
            }
            prop_assert!((total - by_region).abs() <= 1e-6 * (1.0 + total.abs()));
            prop_assert_eq!(index.remaining(), 0);
        }

        #[test]
        fn drained_region_never_leaks_into_another(pairs in arb_pairs(), r in 1_i64..8, r2 in 1_i64..8) {
            prop_assume!(r != r2);
            let mut flat = flat_pair(&pairs);
            flat.take_region_sum(RegionId(r));
            prop_assert!(flat.labels.iter().all(|&l| l != RegionId(r)));

            let expected: f64 = pairs
                .iter()
                .filter(|&&(_, l)| l == r2)
                .map(|&(s, _)| s)
                .fold(0.0, |acc, s| acc + s);
            prop_assert_eq!(flat.take_region_sum(RegionId(r2)).as_f64(), expected);
        }

        #[test]
        fn index_matches_scan_bit_for_bit(pairs in arb_pairs(), order in prop::collection::vec(0_i64..10, 0..20)) {
            let mut flat = flat_pair(&pairs);
            let mut index = RegionIndex::new(flat.clone());
            for id in order {
                let a = flat.take_region_sum(RegionId(id));
                let b = index.take_region_sum(RegionId(id));
                prop_assert_eq!(a.is_real(), b.is_real());
                prop_assert_eq!(a.as_f64().to_bits(), b.as_f64().to_bits());
                prop_assert_eq!(flat.remaining(), index.remaining());
            }
        }
    }
}
