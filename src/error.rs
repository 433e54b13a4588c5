use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "vol-io")]
    #[error("npz read error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    #[error("structure table error: {0}")]
    Csv(#[from] csv::Error),

    /// The archive has no entry with the expected array name.
    #[error("array `{name}` not found in archive")]
    MissingArray { name: String },

    #[error("array `{name}` has a dtype that cannot be read as this volume")]
    UnsupportedDtype { name: String },

    #[error("label value {value} does not fit a region id")]
    LabelOutOfRange { value: u64 },

    /// Scatter plots read positions 1, 2 and 3 along the second axis.
    #[error("volume is too thin along y for a scatter plot (ny={ny}, need at least 4)")]
    VolTooThinForScatter { ny: usize },

    #[error("display error: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, Error>;
