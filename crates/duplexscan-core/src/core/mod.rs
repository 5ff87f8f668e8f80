//! # Core Module
//!
//! Fundamental building blocks for nucleic-acid secondary-structure analysis.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, residues, chains and systems
//! - **Geometry** ([`geometry`]) - Uniform-grid spatial hashing and least-squares fits
//! - **Secondary Structure** ([`structure`]) - Nucleotide base geometry, base pairs and duplexes
//! - **Identifiers** ([`utils`]) - Atom-name tables and normalization

pub mod geometry;
pub mod models;
pub mod structure;
pub mod utils;
