use super::nucleotide::{GeometryError, centroid_of, residue_label};
use crate::core::geometry::fit::{FitError, Plane3D};
use crate::core::models::ids::ResidueId;
use crate::core::models::system::MolecularSystem;
use crate::core::utils::identifiers::GLYCOSIDIC_CARBON_NAME;
use nalgebra::Point3;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Distance from the C1'-C1' midpoint to the helix axis, in Angstroms.
const HELIX_AXIS_OFFSET: f64 = 5.9;

/// Which edge of a base takes part in the pairing interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeType {
    WatsonCrick,
    Hoogsteen,
    Sugar,
    #[default]
    Unknown,
}

impl EdgeType {
    /// Single-character designation used in annotation files.
    pub fn designation(self) -> char {
        match self {
            EdgeType::WatsonCrick => 'W',
            EdgeType::Hoogsteen => 'H',
            EdgeType::Sugar => 'S',
            EdgeType::Unknown => '!',
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized base-pair annotation: '{0}'")]
pub struct ParseAnnotationError(pub String);

impl FromStr for EdgeType {
    type Err = ParseAnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "w" | "+" | "-" => Ok(EdgeType::WatsonCrick),
            "h" => Ok(EdgeType::Hoogsteen),
            "s" => Ok(EdgeType::Sugar),
            "!" => Ok(EdgeType::Unknown),
            _ => Err(ParseAnnotationError(s.to_string())),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeType::WatsonCrick => "Watson-Crick",
            EdgeType::Hoogsteen => "Hoogsteen",
            EdgeType::Sugar => "Sugar",
            EdgeType::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Relative orientation of the two glycosidic bonds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrientation {
    Cis,
    Trans,
    #[default]
    Unknown,
}

impl FromStr for BondOrientation {
    type Err = ParseAnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cis" | "c" => Ok(BondOrientation::Cis),
            "trans" | "tran" | "t" => Ok(BondOrientation::Trans),
            "!" => Ok(BondOrientation::Unknown),
            _ => Err(ParseAnnotationError(s.to_string())),
        }
    }
}

impl fmt::Display for BondOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BondOrientation::Cis => "cis",
            BondOrientation::Trans => "trans",
            BondOrientation::Unknown => "!",
        };
        f.write_str(name)
    }
}

/// Where a base pair came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SourceType {
    /// Detected geometrically by this crate.
    #[default]
    Computed,
    /// Read from an RNAML annotation.
    Rnaml,
    Other(String),
}

/// The identity of one residue of a base pair, with the fields needed for
/// ordering and reporting without going back to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairedResidue {
    pub id: ResidueId,
    pub chain: char,
    pub number: isize,
    pub insertion_code: char,
}

impl PairedResidue {
    /// Looks up the sequence identity of `residue_id`.
    pub fn from_system(system: &MolecularSystem, residue_id: ResidueId) -> Option<Self> {
        let residue = system.residue(residue_id)?;
        let chain = system.chain(residue.chain_id)?;
        Some(Self {
            id: residue_id,
            chain: chain.id,
            number: residue.number,
            insertion_code: residue.insertion_code,
        })
    }

    fn sequence_key(&self) -> (isize, char, ResidueId) {
        (self.number, self.insertion_code, self.id)
    }
}

impl fmt::Display for PairedResidue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}", self.chain, self.number)?;
        if self.insertion_code != ' ' {
            write!(f, "{}", self.insertion_code)?;
        }
        write!(f, ")")
    }
}

#[derive(Debug, Clone, Default)]
struct Annotations {
    edges: [EdgeType; 2],
    bond_orientation: BondOrientation,
    strand_orientation: Option<String>,
    source: SourceType,
}

/// Two residues whose bases interact, stored in canonical order.
///
/// The residue with the lower `(number, insertion code)` is always
/// [`first`](Self::first). Equality and hashing depend only on the two residue
/// ids, so `BasePair::new(a, b) == BasePair::new(b, a)`; annotations never take
/// part in comparisons.
#[derive(Debug, Clone)]
pub struct BasePair {
    first: PairedResidue,
    second: PairedResidue,
    annotations: Annotations,
}

impl BasePair {
    /// Creates a canonicalized pair.
    ///
    /// # Panics
    ///
    /// Panics if both arguments refer to the same residue.
    pub fn new(a: PairedResidue, b: PairedResidue) -> Self {
        assert_ne!(a.id, b.id, "a base pair needs two distinct residues");
        let (first, second) = if b.sequence_key() < a.sequence_key() {
            (b, a)
        } else {
            (a, b)
        };
        Self {
            first,
            second,
            annotations: Annotations::default(),
        }
    }

    /// Creates a pair from two residues of `system`, or `None` if either is missing.
    pub fn from_residues(system: &MolecularSystem, a: ResidueId, b: ResidueId) -> Option<Self> {
        Some(Self::new(
            PairedResidue::from_system(system, a)?,
            PairedResidue::from_system(system, b)?,
        ))
    }

    pub fn first(&self) -> &PairedResidue {
        &self.first
    }

    pub fn second(&self) -> &PairedResidue {
        &self.second
    }

    pub fn residue_ids(&self) -> (ResidueId, ResidueId) {
        (self.first.id, self.second.id)
    }

    /// Residue numbers in canonical (ascending) order.
    pub fn sequence_numbers(&self) -> (isize, isize) {
        (self.first.number, self.second.number)
    }

    /// Sum of the two residue numbers; constant along an ideal antiparallel helix.
    pub fn phase(&self) -> isize {
        self.first.number + self.second.number
    }

    pub fn contains(&self, residue_id: ResidueId) -> bool {
        self.first.id == residue_id || self.second.id == residue_id
    }

    /// Whether this pair joins exactly `a` and `b`, in either order.
    pub fn is_between(&self, a: ResidueId, b: ResidueId) -> bool {
        (self.first.id == a && self.second.id == b) || (self.first.id == b && self.second.id == a)
    }

    /// The other residue of the pair.
    pub fn partner_of(&self, residue_id: ResidueId) -> Option<ResidueId> {
        if self.first.id == residue_id {
            Some(self.second.id)
        } else if self.second.id == residue_id {
            Some(self.first.id)
        } else {
            None
        }
    }

    fn slot_of(&self, residue_id: ResidueId) -> usize {
        match self.partner_of(residue_id) {
            Some(_) if self.first.id == residue_id => 0,
            Some(_) => 1,
            None => panic!("residue {residue_id:?} is not part of base pair {self}"),
        }
    }

    /// The interacting edge of `residue_id`'s base.
    ///
    /// # Panics
    ///
    /// Panics if `residue_id` is not one of the two residues of this pair.
    pub fn edge(&self, residue_id: ResidueId) -> EdgeType {
        self.annotations.edges[self.slot_of(residue_id)]
    }

    /// # Panics
    ///
    /// Panics if `residue_id` is not one of the two residues of this pair.
    pub fn set_edge(&mut self, residue_id: ResidueId, edge: EdgeType) {
        let slot = self.slot_of(residue_id);
        self.annotations.edges[slot] = edge;
    }

    pub fn bond_orientation(&self) -> BondOrientation {
        self.annotations.bond_orientation
    }

    pub fn set_bond_orientation(&mut self, orientation: BondOrientation) {
        self.annotations.bond_orientation = orientation;
    }

    pub fn strand_orientation(&self) -> Option<&str> {
        self.annotations.strand_orientation.as_deref()
    }

    pub fn set_strand_orientation(&mut self, orientation: impl Into<String>) {
        self.annotations.strand_orientation = Some(orientation.into());
    }

    pub fn source(&self) -> &SourceType {
        &self.annotations.source
    }

    pub fn set_source(&mut self, source: SourceType) {
        self.annotations.source = source;
    }

    fn base_positions(&self, system: &MolecularSystem) -> Vec<Point3<f64>> {
        [self.first.id, self.second.id]
            .into_iter()
            .flat_map(|id| system.base_group_atoms(id))
            .map(|atom| atom.position)
            .collect()
    }

    /// Best-fit plane through the base-group atoms of both residues.
    pub fn base_plane(&self, system: &MolecularSystem) -> Result<Plane3D, GeometryError> {
        Plane3D::best_fit(&self.base_positions(system)).map_err(|source| {
            GeometryError::InsufficientAtoms {
                residue: self.to_string(),
                source,
            }
        })
    }

    /// Estimated point on the axis of the double helix containing this pair.
    ///
    /// Starts at the midpoint of the two C1' atoms and moves 5.9 Å within the
    /// base-pair plane, perpendicular to the C1'-C1' line, towards the bases.
    pub fn helix_center(&self, system: &MolecularSystem) -> Result<Point3<f64>, GeometryError> {
        let positions = self.base_positions(system);
        let plane = Plane3D::best_fit(&positions).map_err(|source| {
            GeometryError::InsufficientAtoms {
                residue: self.to_string(),
                source,
            }
        })?;
        // best_fit succeeding guarantees a non-empty point set.
        let base_centroid = centroid_of(&positions).unwrap_or_else(Point3::origin);

        let glycosidic_carbon = |id: ResidueId| {
            system
                .atom_position(id, GLYCOSIDIC_CARBON_NAME)
                .ok_or_else(|| GeometryError::MissingAtom {
                    residue: residue_label(system, id),
                    atom: GLYCOSIDIC_CARBON_NAME,
                })
        };
        let c1_first = glycosidic_carbon(self.first.id)?;
        let c1_second = glycosidic_carbon(self.second.id)?;
        let c1_midpoint = nalgebra::center(&c1_first, &c1_second);

        let across = c1_second - c1_first;
        let mut groove_direction = across.cross(plane.normal().as_ref());
        if groove_direction.norm_squared() == 0.0 {
            return Err(GeometryError::InsufficientAtoms {
                residue: self.to_string(),
                source: FitError::Degenerate { required_rank: 1 },
            });
        }
        groove_direction.normalize_mut();
        if groove_direction.dot(&(base_centroid - c1_midpoint)) < 0.0 {
            groove_direction = -groove_direction;
        }

        Ok(c1_midpoint + groove_direction * HELIX_AXIS_OFFSET)
    }
}

impl PartialEq for BasePair {
    fn eq(&self, other: &Self) -> bool {
        self.first.id == other.first.id && self.second.id == other.second.id
    }
}

impl Eq for BasePair {}

impl Hash for BasePair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.first.id.hash(state);
        self.second.id.hash(state);
    }
}

impl PartialOrd for BasePair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BasePair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.first
            .sequence_key()
            .cmp(&other.first.sequence_key())
            .then_with(|| self.second.sequence_key().cmp(&other.second.sequence_key()))
    }
}

impl fmt::Display for BasePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::chain::ChainType;
    use slotmap::KeyData;
    use std::collections::HashSet;

    fn paired(n: u64, number: isize, insertion_code: char) -> PairedResidue {
        PairedResidue {
            id: ResidueId::from(KeyData::from_ffi(n)),
            chain: 'A',
            number,
            insertion_code,
        }
    }

    mod canonical_order {
        use super::*;

        #[test]
        fn lower_number_is_always_first() {
            let low = paired(1, 3, ' ');
            let high = paired(2, 17, ' ');
            let forward = BasePair::new(low, high);
            let backward = BasePair::new(high, low);

            assert_eq!(forward.first(), &low);
            assert_eq!(backward.first(), &low);
            assert_eq!(forward, backward);
            assert_eq!(forward.sequence_numbers(), (3, 17));
            assert_eq!(forward.phase(), 20);
        }

        #[test]
        fn insertion_code_breaks_number_ties() {
            let plain = paired(1, 10, ' ');
            let inserted = paired(2, 10, 'A');
            assert_eq!(BasePair::new(inserted, plain).first(), &plain);
        }

        #[test]
        fn swapped_pairs_hash_identically() {
            let a = paired(1, 4, ' ');
            let b = paired(2, 30, ' ');
            let set: HashSet<_> = [BasePair::new(a, b), BasePair::new(b, a)].into_iter().collect();
            assert_eq!(set.len(), 1);
        }

        #[test]
        fn annotations_do_not_affect_equality() {
            let a = paired(1, 4, ' ');
            let b = paired(2, 30, ' ');
            let plain = BasePair::new(a, b);
            let mut annotated = BasePair::new(b, a);
            annotated.set_bond_orientation(BondOrientation::Trans);
            annotated.set_source(SourceType::Rnaml);
            assert_eq!(plain, annotated);
        }

        #[test]
        #[should_panic(expected = "two distinct residues")]
        fn self_pair_is_rejected() {
            let a = paired(1, 4, ' ');
            let _ = BasePair::new(a, a);
        }
    }

    mod membership {
        use super::*;

        #[test]
        fn contains_partner_and_is_between() {
            let a = paired(1, 4, ' ');
            let b = paired(2, 30, ' ');
            let outsider = ResidueId::from(KeyData::from_ffi(9));
            let pair = BasePair::new(a, b);

            assert!(pair.contains(a.id) && pair.contains(b.id));
            assert!(!pair.contains(outsider));
            assert!(pair.is_between(b.id, a.id));
            assert!(!pair.is_between(a.id, outsider));
            assert_eq!(pair.partner_of(a.id), Some(b.id));
            assert_eq!(pair.partner_of(outsider), None);
        }
    }

    mod annotations {
        use super::*;

        #[test]
        fn edges_are_tracked_per_residue() {
            let a = paired(1, 4, ' ');
            let b = paired(2, 30, ' ');
            let mut pair = BasePair::new(b, a);
            assert_eq!(pair.edge(a.id), EdgeType::Unknown);

            pair.set_edge(a.id, EdgeType::Hoogsteen);
            pair.set_edge(b.id, EdgeType::Sugar);
            assert_eq!(pair.edge(a.id), EdgeType::Hoogsteen);
            assert_eq!(pair.edge(b.id), EdgeType::Sugar);
        }

        #[test]
        #[should_panic(expected = "is not part of base pair")]
        fn setting_edge_on_foreign_residue_panics() {
            let mut pair = BasePair::new(paired(1, 4, ' '), paired(2, 30, ' '));
            pair.set_edge(ResidueId::from(KeyData::from_ffi(3)), EdgeType::WatsonCrick);
        }

        #[test]
        #[should_panic(expected = "is not part of base pair")]
        fn reading_edge_of_foreign_residue_panics() {
            let pair = BasePair::new(paired(1, 4, ' '), paired(2, 30, ' '));
            let _ = pair.edge(ResidueId::from(KeyData::from_ffi(3)));
        }

        #[test]
        fn designations_parse() {
            for text in ["W", "+", "-"] {
                assert_eq!(EdgeType::from_str(text), Ok(EdgeType::WatsonCrick));
            }
            assert_eq!(EdgeType::from_str("h"), Ok(EdgeType::Hoogsteen));
            assert_eq!(EdgeType::from_str("S"), Ok(EdgeType::Sugar));
            assert_eq!(EdgeType::from_str("!"), Ok(EdgeType::Unknown));
            assert!(EdgeType::from_str("x").is_err());

            assert_eq!(BondOrientation::from_str("cis"), Ok(BondOrientation::Cis));
            assert_eq!(BondOrientation::from_str("tran"), Ok(BondOrientation::Trans));
            assert_eq!(BondOrientation::from_str("T"), Ok(BondOrientation::Trans));
            assert!(BondOrientation::from_str("sideways").is_err());
        }

        #[test]
        fn strand_orientation_round_trips() {
            let mut pair = BasePair::new(paired(1, 4, ' '), paired(2, 30, ' '));
            assert_eq!(pair.strand_orientation(), None);
            pair.set_strand_orientation("antiparallel");
            assert_eq!(pair.strand_orientation(), Some("antiparallel"));
            assert_eq!(pair.source(), &SourceType::Computed);
        }

        #[test]
        fn display_uses_chain_and_number() {
            let pair = BasePair::new(paired(2, 30, ' '), paired(1, 4, 'B'));
            assert_eq!(pair.to_string(), "(A, 4B)-(A, 30)");
        }
    }

    mod geometry {
        use super::*;

        /// Two flat three-atom "bases" in the z = 0 plane facing each other along x,
        /// with C1' atoms on the far side at y = -1.
        fn paired_system() -> (MolecularSystem, BasePair) {
            let mut system = MolecularSystem::new();
            let chain = system.add_chain('A', ChainType::RNA);
            let left = system.add_residue(chain, 1, ' ', "G").unwrap();
            let right = system.add_residue(chain, 12, ' ', "C").unwrap();
            let atoms: [(ResidueId, &str, [f64; 3]); 8] = [
                (left, "N1", [0.0, 0.0, 0.0]),
                (left, "C2", [1.0, 0.0, 0.0]),
                (left, "N3", [1.0, 1.0, 0.0]),
                (left, "C1'", [-1.0, -1.0, 0.0]),
                (right, "N3", [4.0, 0.0, 0.0]),
                (right, "C2", [5.0, 0.0, 0.0]),
                (right, "O2", [5.0, 1.0, 0.0]),
                (right, "C1'", [6.0, -1.0, 0.0]),
            ];
            for (residue_id, name, [x, y, z]) in atoms {
                let atom = Atom::new(name, residue_id, Point3::new(x, y, z));
                system.add_atom_to_residue(residue_id, atom).unwrap();
            }
            let pair = BasePair::from_residues(&system, right, left).unwrap();
            (system, pair)
        }

        #[test]
        fn from_residues_reads_sequence_identity() {
            let (_, pair) = paired_system();
            assert_eq!(pair.sequence_numbers(), (1, 12));
            assert_eq!(pair.first().chain, 'A');
        }

        #[test]
        fn base_plane_spans_both_bases() {
            let (system, pair) = paired_system();
            let plane = pair.base_plane(&system).unwrap();
            assert!((plane.normal().z.abs() - 1.0).abs() < 1e-9);
        }

        #[test]
        fn helix_center_lies_on_the_base_side_of_the_c1_line() {
            let (system, pair) = paired_system();
            let center = pair.helix_center(&system).unwrap();
            // Midpoint of C1' atoms is (2.5, -1, 0); bases sit at positive y.
            assert!((center - Point3::new(2.5, -1.0 + 5.9, 0.0)).norm() < 1e-9);
        }

        #[test]
        fn helix_center_needs_glycosidic_carbons() {
            let (mut system, pair) = paired_system();
            let c1 = system
                .residue(pair.first().id)
                .and_then(|r| r.get_atom_id_by_name("C1'"))
                .unwrap();
            system.remove_atom(c1);
            assert!(matches!(
                pair.helix_center(&system),
                Err(GeometryError::MissingAtom { atom: "C1'", .. })
            ));
        }
    }
}
