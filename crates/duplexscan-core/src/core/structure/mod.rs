//! # Secondary Structure Module
//!
//! Value types describing nucleic-acid secondary structure, and the per-residue
//! geometry they are derived from.
//!
//! ## Key Components
//!
//! - [`nucleotide`] - Base-group centroid, best-fit base plane and polar atoms of one residue
//! - [`base_pair`] - A canonicalized pair of residues with optional edge/orientation annotations
//! - [`duplex`] - A cluster of stacked base pairs forming one helical segment
//! - [`index`] - Lookup of base pairs by residue number and by phase

pub mod base_pair;
pub mod duplex;
pub mod index;
pub mod nucleotide;
