use crate::core::geometry::spatial_index::SpatialIndex;
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use crate::core::structure::base_pair::{BasePair, PairedResidue};
use crate::core::structure::nucleotide::NucleotideGeometry;
use crate::engine::config::PairingConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::HashSet;
use tracing::{debug, info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How many residue pairs survived each classifier stage, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
    /// Pairs whose base centroids are within the distance cutoff.
    pub close: usize,
    /// ...that are also far enough apart in sequence.
    pub separated: usize,
    /// ...whose base planes are nearly parallel.
    pub parallel: usize,
    /// ...whose centroids lie near each other's plane.
    pub coplanar: usize,
    /// ...with at least one N/O contact. Equals the number of base pairs found.
    pub touching: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PairDetection {
    /// Detected pairs in canonical order.
    pub base_pairs: Vec<BasePair>,
    pub counts: StageCounts,
    /// Residues that were not nucleotides or lacked a usable base.
    pub skipped_residues: usize,
}

struct Candidate {
    residue: PairedResidue,
    geometry: NucleotideGeometry,
}

fn prepare(system: &MolecularSystem, residue_id: ResidueId) -> Option<Candidate> {
    let residue = PairedResidue::from_system(system, residue_id)?;
    match NucleotideGeometry::from_residue(system, residue_id) {
        Ok(geometry) => Some(Candidate { residue, geometry }),
        Err(e) => {
            trace!(error = %e, "Skipping residue.");
            None
        }
    }
}

fn far_enough_in_sequence(a: &PairedResidue, b: &PairedResidue, min_distance: usize) -> bool {
    a.chain != b.chain || a.number.abs_diff(b.number) >= min_distance
}

fn planes_parallel(a: &NucleotideGeometry, b: &NucleotideGeometry, min_alignment: f64) -> bool {
    a.plane().normal_alignment(b.plane()) >= min_alignment
}

fn coplanar(a: &NucleotideGeometry, b: &NucleotideGeometry, max_height: f64) -> bool {
    a.plane().distance(b.centroid()) <= max_height && b.plane().distance(a.centroid()) <= max_height
}

/// Finds base pairs among `residues`.
///
/// Each residue's base is measured once, then every unordered pair of residues
/// whose base centroids lie within `centroid_distance_cutoff` is tested exactly
/// once against, in order: the minimum sequence separation, the maximum angle
/// between base planes, the maximum height of each centroid above the other
/// plane, and the presence of an N/O atom contact.
///
/// Residues listed more than once are measured once. Residues that are not
/// nucleotides or whose bases cannot be fitted are skipped.
#[instrument(skip_all, name = "pair_detection_task")]
pub fn run(
    system: &MolecularSystem,
    residues: &[ResidueId],
    config: &PairingConfig,
    reporter: &ProgressReporter,
) -> Result<PairDetection, EngineError> {
    config.validate()?;
    info!(
        residues = residues.len(),
        centroid_cutoff = config.centroid_distance_cutoff,
        "Detecting base pairs."
    );

    let mut seen = HashSet::with_capacity(residues.len());
    let residues: Vec<ResidueId> = residues
        .iter()
        .copied()
        .filter(|&residue_id| seen.insert(residue_id))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = residues.iter();

    #[cfg(feature = "parallel")]
    let iterator = residues.par_iter();

    let candidates: Vec<Candidate> = iterator
        .filter_map(|&residue_id| prepare(system, residue_id))
        .collect();
    let skipped_residues = residues.len() - candidates.len();
    debug!(
        usable = candidates.len(),
        skipped = skipped_residues,
        "Measured nucleotide bases."
    );

    // Several residues may share an exact centroid, so each cell entry holds a list.
    let mut centroids: SpatialIndex<Vec<usize>> = SpatialIndex::new(config.cell_size);
    for (i, candidate) in candidates.iter().enumerate() {
        let centroid = *candidate.geometry.centroid();
        match centroids.get_mut(&centroid) {
            Some(indices) => indices.push(i),
            None => {
                centroids.insert(centroid, vec![i]);
            }
        }
    }

    reporter.report(Progress::TaskStart {
        total_steps: candidates.len() as u64,
    });

    let min_alignment = config.min_normal_alignment();
    let mut counts = StageCounts::default();
    let mut base_pairs = Vec::new();

    for (i, a) in candidates.iter().enumerate() {
        let mut neighbors: Vec<usize> = centroids
            .find_all_within_radius(a.geometry.centroid(), config.centroid_distance_cutoff)
            .into_iter()
            .flatten()
            .copied()
            .filter(|&j| j > i)
            .collect();
        neighbors.sort_unstable();

        for j in neighbors {
            let b = &candidates[j];
            if b.residue.id == a.residue.id {
                continue;
            }
            counts.close += 1;

            if !far_enough_in_sequence(&a.residue, &b.residue, config.min_sequence_distance) {
                continue;
            }
            counts.separated += 1;

            if !planes_parallel(&a.geometry, &b.geometry, min_alignment) {
                continue;
            }
            counts.parallel += 1;

            if !coplanar(&a.geometry, &b.geometry, config.plane_height_cutoff) {
                continue;
            }
            counts.coplanar += 1;

            if !a.geometry.has_polar_contact(&b.geometry, config.atomic_distance) {
                continue;
            }
            counts.touching += 1;

            trace!(first = %a.residue, second = %b.residue, "Accepted base pair.");
            base_pairs.push(BasePair::new(a.residue, b.residue));
        }

        reporter.report(Progress::TaskIncrement);
    }

    reporter.report(Progress::TaskFinish);
    base_pairs.sort();

    debug!(
        close = counts.close,
        separated = counts.separated,
        parallel = counts.parallel,
        coplanar = counts.coplanar,
        touching = counts.touching,
        "Classifier stage counts."
    );
    info!(base_pairs = base_pairs.len(), "Base-pair detection complete.");

    Ok(PairDetection {
        base_pairs,
        counts,
        skipped_residues,
    })
}
