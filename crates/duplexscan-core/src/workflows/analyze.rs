use crate::core::models::ids::ChainId;
use crate::core::models::system::MolecularSystem;
use crate::core::structure::base_pair::BasePair;
use crate::core::structure::duplex::Duplex;
use crate::core::structure::index::BasePairIndex;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::hydrogen_bonds::HydrogenBondCandidate;
use crate::engine::tasks::pair_detection::StageCounts;
use crate::engine::tasks::{duplex_clustering, hydrogen_bonds, pair_detection};
use tracing::{info, instrument, warn};

/// Which chains of the system to analyze.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChainSelection {
    /// Every DNA or RNA chain; other chains are skipped silently.
    #[default]
    All,
    /// Exactly these chains, which must exist and be nucleic acids.
    Chains(Vec<char>),
}

#[derive(Debug, Clone)]
pub struct ChainAnalysis {
    pub chain_id: ChainId,
    pub chain: char,
    pub base_pairs: BasePairIndex,
    pub duplexes: Vec<Duplex>,
    /// Empty unless hydrogen-bond enumeration is enabled.
    pub hydrogen_bonds: Vec<HydrogenBondCandidate>,
    pub stage_counts: StageCounts,
    pub skipped_residues: usize,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub chains: Vec<ChainAnalysis>,
}

impl AnalysisResult {
    pub fn chain(&self, id: char) -> Option<&ChainAnalysis> {
        self.chains.iter().find(|c| c.chain == id)
    }

    pub fn base_pairs(&self) -> impl Iterator<Item = &BasePair> {
        self.chains.iter().flat_map(|c| c.base_pairs.pairs())
    }

    pub fn duplexes(&self) -> impl Iterator<Item = &Duplex> {
        self.chains.iter().flat_map(|c| c.duplexes.iter())
    }

    pub fn total_base_pairs(&self) -> usize {
        self.chains.iter().map(|c| c.base_pairs.len()).sum()
    }

    pub fn total_duplexes(&self) -> usize {
        self.chains.iter().map(|c| c.duplexes.len()).sum()
    }
}

fn resolve_chains(
    system: &MolecularSystem,
    selection: &ChainSelection,
) -> Result<Vec<ChainId>, EngineError> {
    match selection {
        ChainSelection::All => Ok(system
            .chains_iter()
            .filter(|(_, chain)| chain.chain_type.is_nucleic_acid())
            .map(|(id, _)| id)
            .collect()),
        ChainSelection::Chains(ids) => ids
            .iter()
            .map(|&id| {
                let chain_id = system
                    .find_chain_by_id(id)
                    .ok_or(EngineError::ChainNotFound(id))?;
                let chain_type = system
                    .chain(chain_id)
                    .map(|chain| chain.chain_type)
                    .ok_or(EngineError::ChainNotFound(id))?;
                if !chain_type.is_nucleic_acid() {
                    return Err(EngineError::NotANucleicAcid {
                        chain_id: id,
                        chain_type,
                    });
                }
                Ok(chain_id)
            })
            .collect(),
    }
}

/// Detects base pairs and duplexes in the selected chains of `system`.
///
/// Chains are analyzed independently and reported in chain-identifier order.
#[instrument(skip_all, name = "analysis_workflow")]
pub fn run(
    system: &MolecularSystem,
    config: &AnalysisConfig,
    selection: &ChainSelection,
    reporter: &ProgressReporter,
) -> Result<AnalysisResult, EngineError> {
    config.validate()?;
    let mut chain_ids = resolve_chains(system, selection)?;
    chain_ids.sort_by_key(|&id| system.chain(id).map(|c| c.id));
    chain_ids.dedup();
    if chain_ids.is_empty() {
        warn!("No nucleic-acid chains selected; nothing to analyze.");
    }

    let mut chains = Vec::with_capacity(chain_ids.len());
    for chain_id in chain_ids {
        let Some(chain) = system.chain(chain_id) else {
            continue;
        };
        info!(chain = %chain.id, residues = chain.residues().len(), "Analyzing chain.");
        reporter.report(Progress::Message(format!("Chain {}", chain.id)));

        reporter.report(Progress::PhaseStart {
            name: "Base-Pair Detection",
        });
        let detection = pair_detection::run(system, chain.residues(), &config.pairing, reporter)?;
        reporter.report(Progress::PhaseFinish);

        let base_pairs = BasePairIndex::new(detection.base_pairs);

        reporter.report(Progress::PhaseStart {
            name: "Duplex Clustering",
        });
        let duplexes = duplex_clustering::run(system, &base_pairs, &config.clustering, reporter)?;
        reporter.report(Progress::PhaseFinish);

        let hydrogen_bonds = if config.hydrogen_bonds.enabled {
            reporter.report(Progress::PhaseStart {
                name: "Hydrogen-Bond Enumeration",
            });
            let bonds =
                hydrogen_bonds::run(system, chain.residues(), &config.hydrogen_bonds, reporter)?;
            reporter.report(Progress::PhaseFinish);
            bonds
        } else {
            Vec::new()
        };

        chains.push(ChainAnalysis {
            chain_id,
            chain: chain.id,
            base_pairs,
            duplexes,
            hydrogen_bonds,
            stage_counts: detection.counts,
            skipped_residues: detection.skipped_residues,
        });
    }

    let result = AnalysisResult { chains };
    info!(
        chains = result.chains.len(),
        base_pairs = result.total_base_pairs(),
        duplexes = result.total_duplexes(),
        "Analysis complete."
    );
    Ok(result)
}
