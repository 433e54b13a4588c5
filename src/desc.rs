use crate::error::Result;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

macro_rules! transparent_newtype_copy {
    ($name:ident($inner:ty)) => {
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);
    };
}

transparent_newtype_copy!(RegionId(i64));
impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RegionId> for f64 {
    fn from(id: RegionId) -> f64 {
        id.0 as f64
    }
}

/// Label value meaning "no region". Never aggregated.
pub const BACKGROUND: RegionId = RegionId(0);

/// Separator between ancestor ids in `structure_id_path`.
pub const PATH_DELIM: char = '/';

/// Delimiters that do not count toward depth: the leading one and the one closing the root.
pub const DEPTH_OFFSET: i64 = 2;

/// Tree depth. Signed because malformed paths produce negative values.
pub type Depth = i64;

/// One row of the structure table.
///
/// Only `id` and `structure_id_path` are read; the leading index column and any
/// other columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructureDesc {
    pub id: RegionId,
    pub structure_id_path: String,
}

impl StructureDesc {
    pub fn new(id: i64, structure_id_path: &str) -> Self {
        Self {
            id: RegionId(id),
            structure_id_path: structure_id_path.to_owned(),
        }
    }

    pub fn depth(&self) -> Depth {
        tree_depth(&self.structure_id_path)
    }
}

/// Depth of a region from its ancestor path: delimiter count minus `DEPTH_OFFSET`.
///
/// `"/997/"` is the root (0), `"/997/8/"` is 1, `"/997/8/567/"` is 2.
/// A path with no delimiters gives `-2`.
pub fn tree_depth(structure_id_path: &str) -> Depth {
    structure_id_path.matches(PATH_DELIM).count() as Depth - DEPTH_OFFSET
}

/// Parses a structure table (header row required). Row order is kept.
pub fn read_structure_csv<R: Read>(reader: R) -> Result<Vec<StructureDesc>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut out = Vec::new();
    for row in rdr.deserialize() {
        out.push(row?);
    }
    Ok(out)
}

pub fn load_structure_csv<P: AsRef<Path>>(path: P) -> Result<Vec<StructureDesc>> {
    let structures = read_structure_csv(File::open(path.as_ref())?)?;
    info!(
        path = %path.as_ref().display(),
        n_rows = structures.len(),
        "loaded structure table"
    );
    Ok(structures)
}
