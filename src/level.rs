use crate::aggregate::{RegionIndex, RegionSums, SignalValue};
use crate::desc::{Depth, StructureDesc};
use crate::flatten::flatten_vols;
use crate::vol::{LabelVol, SignalVol};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-region sums grouped by tree depth, in structure-table order within each depth.
pub type LevelBuckets = BTreeMap<Depth, Vec<SignalValue>>;

/// Summary of one depth's bucket.
///
/// `max` and `min` are the bucket entries themselves. `mean` and `sum` stay
/// `SignalValue::Zero` only when every region in the bucket had no voxels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelStats {
    pub level: Depth,
    pub mean: SignalValue,
    pub max: SignalValue,
    pub min: SignalValue,
    pub sum: SignalValue,
}

impl LevelStats {
    /// Returns `None` for an empty bucket.
    pub fn from_values(level: Depth, vals: &[SignalValue]) -> Option<Self> {
        let (&first, rest) = vals.split_first()?;

        let mut max = first;
        let mut min = first;
        for &v in rest {
            // Strict comparisons keep the first of equal extremes.
            if v.as_f64() > max.as_f64() {
                max = v;
            }
            if v.as_f64() < min.as_f64() {
                min = v;
            }
        }

        let (mean, sum) = if vals.iter().any(|v| v.is_real()) {
            let reals: Vec<f64> = vals.iter().map(|v| v.as_f64()).collect();
            let sum = reals.iter().fold(0.0_f64, |acc, &v| acc + v);
            (SignalValue::Real(mean_of(&reals)), SignalValue::Real(sum))
        } else {
            (SignalValue::Zero, SignalValue::Zero)
        };

        Some(Self {
            level,
            mean,
            max,
            min,
            sum,
        })
    }
}

// Mean
// -----------------------------------------------------------------------------

/// Adds `x` to a list of non-overlapping partials whose exact sum is the running total.
fn add_exact(partials: &mut Vec<f64>, mut x: f64) {
    let mut n_kept = 0usize;
    for j in 0..partials.len() {
        let mut y = partials[j];
        if x.abs() < y.abs() {
            std::mem::swap(&mut x, &mut y);
        }
        let hi = x + y;
        let lo = y - (hi - x);
        if lo != 0.0 {
            partials[n_kept] = lo;
            n_kept += 1;
        }
        x = hi;
    }
    partials.truncate(n_kept);
    partials.push(x);
}

/// Arithmetic mean rounded from the exact sum, not from a rounded running total.
///
/// `[0.1, 0.2, 0.3]` gives `0.2`, where `sum / n` would give `0.19999999999999998`.
/// Non-finite inputs fall back to `sum / n`.
pub fn mean_of(vals: &[f64]) -> f64 {
    let n = vals.len() as f64;
    if vals.iter().any(|v| !v.is_finite()) {
        return vals.iter().sum::<f64>() / n;
    }

    let mut partials = Vec::new();
    for &v in vals {
        add_exact(&mut partials, v);
    }
    let q = partials.iter().sum::<f64>() / n;
    if !q.is_finite() {
        return q;
    }

    // Residual of the exact sum against q * n, with the product split exactly.
    let p = q * n;
    let p_err = q.mul_add(n, -p);
    add_exact(&mut partials, -p);
    add_exact(&mut partials, -p_err);
    let residual: f64 = partials.iter().sum();
    q + residual / n
}

/// Drains one region per structure row, in table order, and files each region's sum
/// under the row's depth.
///
/// Rows with malformed paths land under negative depths; they are kept but never
/// reach the statistics pass.
pub fn bucket_by_depth<A: RegionSums>(structures: &[StructureDesc], region_sums: &mut A) -> LevelBuckets {
    let mut buckets = LevelBuckets::new();

    for structure in structures {
        let depth = structure.depth();
        debug!(
            region = %structure.id,
            depth,
            remaining = region_sums.remaining(),
            "aggregating region"
        );
        let sum = region_sums.take_region_sum(structure.id);
        buckets.entry(depth).or_default().push(sum);
    }

    buckets
}

/// Walks depths 0, 1, 2, ... and stops at the first depth without a bucket.
/// Depths past a gap are not reported.
pub fn level_stats(buckets: &LevelBuckets) -> Vec<LevelStats> {
    let mut out = Vec::new();

    let mut level: Depth = 0;
    while let Some(vals) = buckets.get(&level) {
        let Some(stats) = LevelStats::from_values(level, vals) else {
            break;
        };
        debug!(?stats, "level statistics");
        out.push(stats);
        level += 1;
    }

    let n_unreported = buckets.keys().filter(|&&d| d >= level || d < 0).count();
    if n_unreported > 0 {
        debug!(n_unreported, "depths left out of the report");
    }
    info!(n_levels = out.len(), "computed level statistics");
    out
}

/// Full roll-up: flatten, drain every structure row, summarize by depth.
pub fn compute_level_stats(
    signal_vol: &SignalVol,
    label_vol: &LabelVol,
    structures: &[StructureDesc],
) -> Vec<LevelStats> {
    let flat = flatten_vols(signal_vol, label_vol);
    let mut index = RegionIndex::new(flat);
    let buckets = bucket_by_depth(structures, &mut index);
    level_stats(&buckets)
}
