use super::base_pair::{BasePair, PairedResidue};
use crate::core::models::ids::ResidueId;
use std::fmt;

/// A group of stacked base pairs forming one double-helical segment or hairpin stem.
///
/// Members are kept sorted in canonical base-pair order (by the lower residue),
/// so two duplexes with the same members compare equal regardless of the order
/// in which pairs were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duplex {
    base_pairs: Vec<BasePair>,
}

impl Duplex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_base_pairs(base_pairs: impl IntoIterator<Item = BasePair>) -> Self {
        let mut base_pairs: Vec<BasePair> = base_pairs.into_iter().collect();
        base_pairs.sort();
        base_pairs.dedup();
        Self { base_pairs }
    }

    /// Adds `base_pair`, returning `false` if it was already a member.
    pub fn add(&mut self, base_pair: BasePair) -> bool {
        match self.base_pairs.binary_search(&base_pair) {
            Ok(_) => false,
            Err(slot) => {
                self.base_pairs.insert(slot, base_pair);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.base_pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base_pairs.is_empty()
    }

    pub fn base_pairs(&self) -> &[BasePair] {
        &self.base_pairs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BasePair> {
        self.base_pairs.iter()
    }

    pub fn contains(&self, base_pair: &BasePair) -> bool {
        self.base_pairs.binary_search(base_pair).is_ok()
    }

    /// Every residue taking part in the duplex, in sequence order.
    pub fn residue_ids(&self) -> Vec<ResidueId> {
        let mut residues: Vec<&PairedResidue> = self
            .base_pairs
            .iter()
            .flat_map(|bp| [bp.first(), bp.second()])
            .collect();
        residues.sort_by_key(|r| (r.number, r.insertion_code, r.id));
        residues.dedup_by_key(|r| r.id);
        residues.into_iter().map(|r| r.id).collect()
    }

    /// The pair containing the lowest-numbered residue (the 5' end of the first strand).
    pub fn five_prime_pair(&self) -> Option<&BasePair> {
        self.base_pairs.first()
    }

    /// The innermost pair along the first strand; for a hairpin, the one closing the loop.
    pub fn three_prime_pair(&self) -> Option<&BasePair> {
        self.base_pairs.last()
    }

    /// Lowest-numbered residue of the duplex.
    pub fn lowest_residue(&self) -> Option<&PairedResidue> {
        self.five_prime_pair().map(BasePair::first)
    }

    /// Highest-numbered residue of the duplex.
    pub fn highest_residue(&self) -> Option<&PairedResidue> {
        self.base_pairs
            .iter()
            .map(BasePair::second)
            .max_by_key(|r| (r.number, r.insertion_code, r.id))
    }

    /// Compact description `((chain, lowest), (chain, highest), pair count)`.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl<'a> IntoIterator for &'a Duplex {
    type Item = &'a BasePair;
    type IntoIter = std::slice::Iter<'a, BasePair>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Duplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lowest_residue(), self.highest_residue()) {
            (Some(low), Some(high)) => write!(f, "({}, {}, {})", low, high, self.len()),
            _ => write!(f, "((), (), 0)"),
        }
    }
}
