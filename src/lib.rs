// Library crate root.
//
// This crate is used both as a binary (src/main.rs) and as a library.
// Keeping modules here prevents "dead_code" warnings for public APIs that are
// intentionally exported for downstream crates.

pub mod error;
pub mod vol;
pub mod desc;
pub mod flatten;
pub mod aggregate;
pub mod level;
pub mod report;
pub mod viz;
pub mod debug_ui;

pub use error::{Error, Result};

#[cfg(test)]
pub mod test_helpers;
