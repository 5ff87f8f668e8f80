//! # Engine Module
//!
//! The computational layer of duplexscan: it turns a
//! [`MolecularSystem`](crate::core::models::system::MolecularSystem) into base
//! pairs and duplexes.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Classifier and clustering thresholds, loadable from TOML
//! - **Tasks** ([`tasks`]) - Pair detection, duplex clustering and hydrogen-bond enumeration
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type
//!
//! Tasks are independent of each other and only share the immutable system, so
//! callers may run them separately. [`workflows::analyze`](crate::workflows::analyze)
//! chains them per nucleic-acid chain.

pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
