//! # duplexscan
//!
//! Detection of nucleic-acid base pairs and double-helical segments (duplexes and
//! hairpin stems) from atomic 3D coordinates, using fast geometric heuristics.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`), the
//!   `SpatialIndex` proximity structure, best-fit plane and line estimation, and the
//!   secondary-structure value types (`BasePair`, `Duplex`).
//!
//! - **[`engine`]: The Logic Core.** Analysis configuration, error types, progress
//!   reporting and the individual analysis passes: the base-pair classifier, the
//!   duplex clustering step and hydrogen-bond candidate enumeration.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together to run a
//!   complete secondary-structure analysis over the nucleic-acid chains of a system.

pub mod core;
pub mod engine;
pub mod workflows;
