use crate::core::geometry::spatial_index::SpatialIndex;
use crate::core::models::ids::{AtomId, ResidueId};
use crate::core::models::system::MolecularSystem;
use crate::engine::config::HydrogenBondConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use tracing::{info, instrument};

/// A donor/acceptor atom pair close enough to form a hydrogen bond.
///
/// Only distance is checked; there is no angular criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrogenBondCandidate {
    pub donor: AtomId,
    pub donor_residue: ResidueId,
    pub acceptor: AtomId,
    pub acceptor_residue: ResidueId,
    pub distance: f64,
}

fn named_atoms<'a>(
    system: &'a MolecularSystem,
    residue_id: ResidueId,
    names: &'a [&'static str],
) -> impl Iterator<Item = AtomId> + 'a {
    let residue = system.residue(residue_id);
    names
        .iter()
        .filter_map(move |name| residue?.get_atom_id_by_name(name))
}

/// Lists donor/acceptor pairs between different residues of `residues`.
///
/// Donors and acceptors are taken from each nucleotide's base and ribose
/// according to its type. A pair qualifies when its distance lies within
/// `[min_distance, max_distance]`. Results are sorted by distance.
#[instrument(skip_all, name = "hydrogen_bond_task")]
pub fn run(
    system: &MolecularSystem,
    residues: &[ResidueId],
    config: &HydrogenBondConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<HydrogenBondCandidate>, EngineError> {
    config.validate()?;
    info!(
        residues = residues.len(),
        max_distance = config.max_distance,
        "Enumerating hydrogen-bond candidates."
    );

    let mut donors: SpatialIndex<AtomId> = SpatialIndex::new(config.cell_size);
    let mut acceptors: Vec<AtomId> = Vec::new();
    for &residue_id in residues {
        let Some(nucleotide) = system.residue(residue_id).and_then(|r| r.residue_type) else {
            continue;
        };
        for atom_id in named_atoms(system, residue_id, nucleotide.hydrogen_bond_donor_names()) {
            if let Some(atom) = system.atom(atom_id) {
                donors.insert(atom.position, atom_id);
            }
        }
        acceptors.extend(named_atoms(
            system,
            residue_id,
            nucleotide.hydrogen_bond_acceptor_names(),
        ));
    }

    reporter.report(Progress::TaskStart {
        total_steps: acceptors.len() as u64,
    });

    let mut candidates = Vec::new();
    for acceptor_id in acceptors {
        reporter.report(Progress::TaskIncrement);
        let Some(acceptor) = system.atom(acceptor_id) else {
            continue;
        };
        for (position, &donor_id) in
            donors.neighbors_within_radius(&acceptor.position, config.max_distance)
        {
            let Some(donor) = system.atom(donor_id) else {
                continue;
            };
            if donor.residue_id == acceptor.residue_id {
                continue;
            }
            let distance = (position - acceptor.position).norm();
            if distance < config.min_distance {
                continue;
            }
            candidates.push(HydrogenBondCandidate {
                donor: donor_id,
                donor_residue: donor.residue_id,
                acceptor: acceptor_id,
                acceptor_residue: acceptor.residue_id,
                distance,
            });
        }
    }

    reporter.report(Progress::TaskFinish);
    candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    info!(
        candidates = candidates.len(),
        "Hydrogen-bond enumeration complete."
    );
    Ok(candidates)
}
