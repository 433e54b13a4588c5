use crate::error::{Error, Result};
use crate::vol::Vol;

/// Y positions whose values become the x, y and z coordinates of each scatter point.
const SCATTER_Y_IZ: [usize; 3] = [1, 2, 3];

/// One point per `(x, z)` column: the volume's values at y = 1, 2, 3.
///
/// Points are ordered x-major, z-minor.
pub fn scatter_points<T: Copy + Into<f64>>(vol: &Vol<T>) -> Result<Vec<[f64; 3]>> {
    if vol.ny <= SCATTER_Y_IZ[2] {
        return Err(Error::VolTooThinForScatter { ny: vol.ny });
    }

    let mut points = Vec::with_capacity(vol.nx * vol.nz);
    for x in 0..vol.nx {
        for z in 0..vol.nz {
            let mut p = [0.0_f64; 3];
            for (axis, &y) in SCATTER_Y_IZ.iter().enumerate() {
                p[axis] = vol.arr[vol.idx(x, y, z)].into();
            }
            points.push(p);
        }
    }
    Ok(points)
}
