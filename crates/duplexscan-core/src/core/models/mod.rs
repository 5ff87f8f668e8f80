//! # Core Models Module
//!
//! Minimal molecular data model consumed by the secondary-structure analysis.
//!
//! ## Overview
//!
//! The analysis only needs read access to a handful of facts about each residue:
//! its sequence number and insertion code, its named atoms and their coordinates,
//! the subset of atoms forming the nucleotide base, and its neighbours along the
//! chain. These models provide exactly that, with stable slot-map keys so that
//! analysis results ([`BasePair`](crate::core::structure::base_pair::BasePair),
//! [`Duplex`](crate::core::structure::duplex::Duplex)) can refer back into the system.
//!
//! ## Key Components
//!
//! - [`atom`] - Atom name, element and position
//! - [`residue`] - Residue numbering, nucleotide classification and atom lookup
//! - [`chain`] - Ordered residue lists and polymer type
//! - [`ids`] - Slot-map keys shared by the models and the analysis results
//! - [`system`] - Owning container with lookups and sequence navigation
//!
//! ## Usage
//!
//! ```ignore
//! use duplexscan::core::models::{atom::Atom, chain::ChainType, system::MolecularSystem};
//!
//! let mut system = MolecularSystem::new();
//! let chain_id = system.add_chain('A', ChainType::RNA);
//! let residue_id = system.add_residue(chain_id, 1, ' ', "G")?;
//! system.add_atom_to_residue(residue_id, Atom::new("N1", residue_id, Point3::origin()))?;
//! ```

pub mod atom;
pub mod chain;
pub mod ids;
pub mod residue;
pub mod system;
