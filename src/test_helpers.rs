use crate::desc::{RegionId, StructureDesc};
use crate::vol::{LabelVol, SignalVol};

/// Builds a label volume from digit grids.
///
/// Blank-line separated blocks are x slices, rows within a block are y, and
/// characters within a row are z.
pub fn label_vol_from_ascii(grid: &str) -> LabelVol {
    let mut slices: Vec<Vec<&str>> = vec![Vec::new()];
    for line in grid.lines().map(|l| l.trim()) {
        if line.is_empty() {
            if !slices.last().is_some_and(|s| s.is_empty()) {
                slices.push(Vec::new());
            }
            continue;
        }
        slices.last_mut().unwrap().push(line);
    }
    if slices.last().is_some_and(|s| s.is_empty()) {
        slices.pop();
    }

    let nx = slices.len();
    assert!(nx > 0, "grid must have at least one slice");
    let ny = slices[0].len();
    let nz = slices[0][0].len();
    assert!(nz > 0, "grid rows must be non-empty");
    for slice in &slices {
        assert_eq!(slice.len(), ny, "all slices must have equal row count");
        for row in slice {
            assert_eq!(row.len(), nz, "all rows must have equal length");
        }
    }

    let mut vol = LabelVol::new(nx, ny, nz);
    for (x, slice) in slices.iter().enumerate() {
        for (y, row) in slice.iter().enumerate() {
            for (z, ch) in row.chars().enumerate() {
                let v = ch
                    .to_digit(10)
                    .unwrap_or_else(|| panic!("invalid label char '{ch}', expected digit"));
                let i = vol.idx(x, y, z);
                vol.arr[i] = RegionId(v as i64);
            }
        }
    }
    vol
}

pub fn signal_vol_filled(nx: usize, ny: usize, nz: usize, v: f64) -> SignalVol {
    let mut vol = SignalVol::new(nx, ny, nz);
    vol.arr.fill(v);
    vol
}

/// Each voxel's signal is its linear index.
pub fn signal_vol_counting(nx: usize, ny: usize, nz: usize) -> SignalVol {
    let mut vol = SignalVol::new(nx, ny, nz);
    for (i, v) in vol.arr.iter_mut().enumerate() {
        *v = i as f64;
    }
    vol
}

pub fn structures_from_rows(rows: &[(i64, &str)]) -> Vec<StructureDesc> {
    rows.iter()
        .map(|&(id, path)| StructureDesc::new(id, path))
        .collect()
}
