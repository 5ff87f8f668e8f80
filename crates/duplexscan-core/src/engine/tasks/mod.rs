//! Computational tasks of the analysis.
//!
//! Each task reads an immutable [`MolecularSystem`](crate::core::models::system::MolecularSystem),
//! reports progress through a [`ProgressReporter`](crate::engine::progress::ProgressReporter)
//! and returns plain values; none of them keeps state between calls.

pub mod duplex_clustering;
pub mod hydrogen_bonds;
pub mod pair_detection;
