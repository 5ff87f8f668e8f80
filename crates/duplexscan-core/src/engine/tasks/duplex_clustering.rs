use crate::core::geometry::fit::Plane3D;
use crate::core::models::system::MolecularSystem;
use crate::core::structure::base_pair::BasePair;
use crate::core::structure::duplex::Duplex;
use crate::core::structure::index::BasePairIndex;
use crate::engine::config::ClusteringConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::VecDeque;
use tracing::{debug, info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Undirected compatibility graph over the pairs of a [`BasePairIndex`],
/// addressed by pair position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompatibilityGraph {
    adjacency: Vec<Vec<usize>>,
}

impl CompatibilityGraph {
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    /// Connected components, each sorted, ordered by their smallest node.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.adjacency.len()];
        let mut components = Vec::new();
        let mut worklist = VecDeque::new();

        for seed in 0..self.adjacency.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            worklist.push_back(seed);

            let mut component = Vec::new();
            while let Some(node) = worklist.pop_front() {
                component.push(node);
                for &next in &self.adjacency[node] {
                    if !visited[next] {
                        visited[next] = true;
                        worklist.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}

fn within(a: isize, b: isize, cutoff: usize) -> bool {
    a.abs_diff(b) <= cutoff
}

/// Whether `p` and `q` could be neighbouring steps of one antiparallel helix.
fn stack_compatible(
    p: &BasePair,
    q: &BasePair,
    plane_p: &Plane3D,
    plane_q: &Plane3D,
    config: &ClusteringConfig,
) -> bool {
    let cutoff = config.sequence_distance_cutoff;
    let (p_low, p_high) = p.sequence_numbers();
    let (q_low, q_high) = q.sequence_numbers();
    within(p.phase(), q.phase(), cutoff)
        && within(p_low, q_low, cutoff)
        && within(p_high, q_high, cutoff)
        && plane_p.normal_alignment(plane_q) >= config.min_normal_alignment()
}

/// Builds the compatibility graph of `index`.
///
/// Pair planes are fitted once through both bases; pairs whose plane cannot be
/// fitted get no edges. Only pairs within the phase window are compared.
pub fn build_graph(
    system: &MolecularSystem,
    index: &BasePairIndex,
    config: &ClusteringConfig,
) -> CompatibilityGraph {
    #[cfg(not(feature = "parallel"))]
    let iterator = index.pairs().iter();

    #[cfg(feature = "parallel")]
    let iterator = index.pairs().par_iter();

    let planes: Vec<Option<Plane3D>> = iterator
        .map(|pair| match pair.base_plane(system) {
            Ok(plane) => Some(plane),
            Err(e) => {
                trace!(error = %e, "Base pair has no usable plane.");
                None
            }
        })
        .collect();

    let window = isize::try_from(config.sequence_distance_cutoff).unwrap_or(isize::MAX);
    let mut adjacency = vec![Vec::new(); index.len()];

    for (i, p) in index.pairs().iter().enumerate() {
        let Some(plane_p) = &planes[i] else {
            continue;
        };
        for j in index.indices_near_phase(p.phase(), window) {
            if j <= i {
                continue;
            }
            let Some(plane_q) = &planes[j] else {
                continue;
            };
            if stack_compatible(p, &index.pairs()[j], plane_p, plane_q, config) {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }
    }

    CompatibilityGraph { adjacency }
}

/// Groups stacked base pairs into duplexes by single linkage.
///
/// Connected components of the compatibility graph with fewer than
/// `min_base_pair_count` pairs are dropped. Duplexes are returned in order of
/// their 5'-most pair.
#[instrument(skip_all, name = "duplex_clustering_task")]
pub fn run(
    system: &MolecularSystem,
    index: &BasePairIndex,
    config: &ClusteringConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<Duplex>, EngineError> {
    config.validate()?;
    info!(
        base_pairs = index.len(),
        min_pairs = config.min_base_pair_count,
        "Clustering base pairs into duplexes."
    );

    reporter.report(Progress::TaskStart {
        total_steps: index.len() as u64,
    });

    let graph = build_graph(system, index, config);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "Built compatibility graph."
    );

    let mut duplexes = Vec::new();
    for component in graph.components() {
        for _ in &component {
            reporter.report(Progress::TaskIncrement);
        }
        if component.len() < config.min_base_pair_count {
            trace!(size = component.len(), "Dropping small cluster.");
            continue;
        }
        duplexes.push(Duplex::from_base_pairs(
            component.into_iter().map(|i| index.pairs()[i].clone()),
        ));
    }

    reporter.report(Progress::TaskFinish);
    duplexes.sort_by(|a, b| a.five_prime_pair().cmp(&b.five_prime_pair()));

    info!(duplexes = duplexes.len(), "Duplex clustering complete.");
    Ok(duplexes)
}
