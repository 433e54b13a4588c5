use crate::desc::{BACKGROUND, RegionId};
use crate::vol::{LabelVol, SignalVol};
use tracing::info;

/// Signal values and their labels for every non-background voxel, paired by position,
/// in scan order (x outermost, then y, then z).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatPair {
    pub signals: Vec<f64>,
    pub labels: Vec<RegionId>,
}

impl FlatPair {
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Flattens a signal/annotation pair, dropping background voxels.
///
/// Shapes are not validated; the annotation's extent drives the scan and the signal
/// is indexed at the same linear position.
pub fn flatten_vols(signal_vol: &SignalVol, label_vol: &LabelVol) -> FlatPair {
    let mut flat = FlatPair::default();

    for (vox_i, &label) in label_vol.arr.iter().enumerate() {
        if label == BACKGROUND {
            continue;
        }
        flat.signals.push(signal_vol.arr[vox_i]);
        flat.labels.push(label);
    }

    info!(
        n_voxels = label_vol.len(),
        n_labeled = flat.len(),
        "flattened volumes"
    );
    flat
}
