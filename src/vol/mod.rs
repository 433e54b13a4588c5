pub mod core;
#[allow(unused_imports)]
pub use self::core::{LabelVol, SignalVol, Vol};

// Optional extras
// -----------------------------------------------------------------------------

#[cfg(feature = "vol-io")]
pub mod io;

#[cfg(feature = "vol-io")]
#[allow(unused_imports)]
pub use io::{load_label_npz, load_signal_npz};
