use super::base_pair::BasePair;
use std::collections::{BTreeMap, HashMap};

/// Base pairs indexed by residue number and by phase.
///
/// Pairs are stored once, in canonical order, and addressed by their position
/// in [`pairs`](Self::pairs). The phase index is ordered so that all pairs
/// within a phase window can be visited without scanning the whole set.
#[derive(Debug, Clone, Default)]
pub struct BasePairIndex {
    pairs: Vec<BasePair>,
    by_residue_number: HashMap<isize, Vec<usize>>,
    by_phase: BTreeMap<isize, Vec<usize>>,
}

impl BasePairIndex {
    pub fn new(pairs: impl IntoIterator<Item = BasePair>) -> Self {
        let mut pairs: Vec<BasePair> = pairs.into_iter().collect();
        pairs.sort();
        pairs.dedup();

        let mut by_residue_number: HashMap<isize, Vec<usize>> = HashMap::new();
        let mut by_phase: BTreeMap<isize, Vec<usize>> = BTreeMap::new();
        for (i, pair) in pairs.iter().enumerate() {
            let (low, high) = pair.sequence_numbers();
            by_residue_number.entry(low).or_default().push(i);
            if high != low {
                by_residue_number.entry(high).or_default().push(i);
            }
            by_phase.entry(pair.phase()).or_default().push(i);
        }

        Self {
            pairs,
            by_residue_number,
            by_phase,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[BasePair] {
        &self.pairs
    }

    pub fn get(&self, index: usize) -> Option<&BasePair> {
        self.pairs.get(index)
    }

    pub fn into_pairs(self) -> Vec<BasePair> {
        self.pairs
    }

    /// Pairs in which a residue numbered `number` takes part.
    pub fn pairs_for_residue(&self, number: isize) -> impl Iterator<Item = &BasePair> {
        self.by_residue_number
            .get(&number)
            .into_iter()
            .flatten()
            .map(|&i| &self.pairs[i])
    }

    pub fn pairs_with_phase(&self, phase: isize) -> impl Iterator<Item = &BasePair> {
        self.by_phase
            .get(&phase)
            .into_iter()
            .flatten()
            .map(|&i| &self.pairs[i])
    }

    /// Positions of all pairs whose phase lies within `tolerance` of `phase`.
    pub fn indices_near_phase(
        &self,
        phase: isize,
        tolerance: isize,
    ) -> impl Iterator<Item = usize> {
        let tolerance = tolerance.max(0);
        self.by_phase
            .range(phase.saturating_sub(tolerance)..=phase.saturating_add(tolerance))
            .flat_map(|(_, indices)| indices.iter().copied())
    }
}

impl FromIterator<BasePair> for BasePairIndex {
    fn from_iter<I: IntoIterator<Item = BasePair>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ResidueId;
    use crate::core::structure::base_pair::PairedResidue;
    use slotmap::KeyData;

    fn pair(a: isize, b: isize) -> BasePair {
        let residue = |n: isize| PairedResidue {
            id: ResidueId::from(KeyData::from_ffi(n as u64)),
            chain: 'A',
            number: n,
            insertion_code: ' ',
        };
        BasePair::new(residue(a), residue(b))
    }

    fn numbers<'a>(pairs: impl Iterator<Item = &'a BasePair>) -> Vec<(isize, isize)> {
        let mut numbers: Vec<_> = pairs.map(BasePair::sequence_numbers).collect();
        numbers.sort_unstable();
        numbers
    }

    #[test]
    fn indexes_by_residue_number() {
        let index: BasePairIndex = [pair(1, 20), pair(2, 19), pair(20, 30)].into_iter().collect();
        assert_eq!(numbers(index.pairs_for_residue(20)), vec![(1, 20), (20, 30)]);
        assert_eq!(numbers(index.pairs_for_residue(2)), vec![(2, 19)]);
        assert!(index.pairs_for_residue(7).next().is_none());
    }

    #[test]
    fn indexes_by_phase() {
        let index = BasePairIndex::new([pair(1, 20), pair(2, 19), pair(5, 30)]);
        assert_eq!(numbers(index.pairs_with_phase(21)), vec![(1, 20), (2, 19)]);
        assert_eq!(numbers(index.pairs_with_phase(35)), vec![(5, 30)]);
        assert!(index.pairs_with_phase(22).next().is_none());
    }

    #[test]
    fn phase_window_is_inclusive() {
        let index = BasePairIndex::new([pair(1, 20), pair(3, 22), pair(4, 22), pair(8, 30)]);
        let near: Vec<(isize, isize)> =
            numbers(index.indices_near_phase(23, 2).map(|i| &index.pairs()[i]));
        assert_eq!(near, vec![(1, 20), (3, 22)]);
        assert_eq!(index.indices_near_phase(23, -1).count(), 0);
    }

    #[test]
    fn duplicate_pairs_are_stored_once() {
        let index = BasePairIndex::new([pair(1, 20), pair(20, 1)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.pairs_for_residue(1).count(), 1);
    }
}
