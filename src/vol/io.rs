use super::core::{LabelVol, SignalVol, Vol};
use crate::desc::RegionId;
use crate::error::{Error, Result};
use ndarray::{Array3, Ix3, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpyError, ReadNpzError};
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::info;

/// Name `numpy.savez` gives to its first positional array.
pub const NPZ_ARRAY_NAME: &str = "arr_0";

// Helpers for dtype dispatch
// -----------------------------------------------------------------------------

fn vol_from_array3<T: Copy, U>(arr: Array3<T>, f: impl Fn(T) -> U) -> Vol<U> {
    let (nx, ny, nz) = arr.dim();
    // `iter()` walks logical (row-major) order even for Fortran-ordered arrays.
    let arr: Vec<U> = arr.iter().map(|&v| f(v)).collect();
    Vol::from_vec(nx, ny, nz, arr)
}

/// Finds the zip entry for `name`, with or without the `.npy` suffix.
fn find_entry<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<String> {
    npz.names()?
        .into_iter()
        .find(|n| n.strip_suffix(".npy").unwrap_or(n.as_str()) == name)
        .ok_or_else(|| Error::MissingArray {
            name: name.to_owned(),
        })
}

/// Tries each listed element type in turn. A descriptor mismatch moves on to the
/// next type; any other failure (bad shape, corrupt data) is returned as is.
macro_rules! read_first_matching {
    ($npz:expr, $entry:expr, |$v:ident| $conv:expr, $($t:ty),+ $(,)?) => {{
        $(
            match $npz.by_name::<OwnedRepr<$t>, Ix3>($entry) {
                Ok(arr) => {
                    let mut out = Vec::with_capacity(arr.len());
                    let (nx, ny, nz) = arr.dim();
                    for &$v in arr.iter() {
                        out.push($conv?);
                    }
                    return Ok(Vol::from_vec(nx, ny, nz, out));
                }
                Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => {}
                Err(e) => return Err(e.into()),
            }
        )+
    }};
}

// Signal volume
// -----------------------------------------------------------------------------

/// Reads the `arr_0` array of an npz stream as a 3D signal volume, widening to f64.
pub fn read_signal_npz<R: Read + Seek>(reader: R) -> Result<SignalVol> {
    let mut npz = NpzReader::new(reader)?;
    let entry = find_entry(&mut npz, NPZ_ARRAY_NAME)?;

    match npz.by_name::<OwnedRepr<f64>, Ix3>(&entry) {
        Ok(arr) => return Ok(vol_from_array3(arr, |v| v)),
        Err(ReadNpzError::Npy(ReadNpyError::WrongDescriptor(_))) => {}
        Err(e) => return Err(e.into()),
    }

    read_first_matching!(
        npz,
        &entry,
        |v| Ok::<f64, Error>(v as f64),
        f32, u8, u16, u32, u64, i8, i16, i32, i64,
    );

    Err(Error::UnsupportedDtype { name: entry })
}

pub fn load_signal_npz<P: AsRef<Path>>(path: P) -> Result<SignalVol> {
    let vol = read_signal_npz(File::open(path.as_ref())?)?;
    info!(path = %path.as_ref().display(), shape = ?vol.shape(), "loaded signal volume");
    Ok(vol)
}

// Annotation volume
// -----------------------------------------------------------------------------

fn u64_to_region_id(v: u64) -> Result<RegionId> {
    i64::try_from(v)
        .map(RegionId)
        .map_err(|_| Error::LabelOutOfRange { value: v })
}

/// Reads the `arr_0` array of an npz stream as a 3D label volume.
pub fn read_label_npz<R: Read + Seek>(reader: R) -> Result<LabelVol> {
    let mut npz = NpzReader::new(reader)?;
    let entry = find_entry(&mut npz, NPZ_ARRAY_NAME)?;

    read_first_matching!(
        npz,
        &entry,
        |v| Ok::<RegionId, Error>(RegionId(v as i64)),
        i64, i32, u32, u16, u8, i16, i8,
    );

    read_first_matching!(npz, &entry, |v| u64_to_region_id(v), u64);

    Err(Error::UnsupportedDtype { name: entry })
}

pub fn load_label_npz<P: AsRef<Path>>(path: P) -> Result<LabelVol> {
    let vol = read_label_npz(File::open(path.as_ref())?)?;
    info!(path = %path.as_ref().display(), shape = ?vol.shape(), "loaded annotation volume");
    Ok(vol)
}

// Tests
// -----------------------------------------------------------------------------
