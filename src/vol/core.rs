use crate::desc::RegionId;

/// Dense 3D grid stored in row-major (C) order.
///
/// Element `(x, y, z)` lives at `(x * ny + y) * nz + z`, so walking `arr`
/// front to back visits voxels with x outermost and z innermost.
#[derive(Debug, Clone, PartialEq)]
pub struct Vol<T> {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub arr: Vec<T>,
}

// Constructor
// -----------------------------------------------------------------------------
impl<T: Copy + Default> Vol<T> {
    pub fn new(nx: usize, ny: usize, nz: usize) -> Self {
        let arr = vec![T::default(); nx * ny * nz];
        Self { nx, ny, nz, arr }
    }
}

impl<T> Vol<T> {
    /// Wraps an existing row-major buffer. Panics if the length does not match the shape.
    pub fn from_vec(nx: usize, ny: usize, nz: usize, arr: Vec<T>) -> Self {
        assert_eq!(arr.len(), nx * ny * nz, "buffer length does not match shape");
        Self { nx, ny, nz, arr }
    }

    #[inline(always)]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.ny + y) * self.nz + z
    }

    #[inline(always)]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.arr.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.arr.is_empty()
    }
}

pub type SignalVol = Vol<f64>;
pub type LabelVol = Vol<RegionId>;
