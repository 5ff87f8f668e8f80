//! # Workflows Module
//!
//! High-level entry points that run complete analyses on a
//! [`MolecularSystem`](crate::core::models::system::MolecularSystem).
//!
//! - **Secondary-structure analysis** ([`analyze`]) - Base-pair detection followed
//!   by duplex clustering, chain by chain, with optional hydrogen-bond enumeration.

pub mod analyze;
