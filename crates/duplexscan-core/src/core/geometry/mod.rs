//! # Geometry Module
//!
//! Geometric primitives used by the base-pair classifier.
//!
//! - [`spatial_index`] - A uniform-grid spatial hash answering radius queries over a
//!   dynamic point set in amortized constant time.
//! - [`fit`] - Least-squares best-fit planes and lines through (optionally weighted)
//!   point clouds, via eigendecomposition of the covariance matrix.

pub mod fit;
pub mod spatial_index;
