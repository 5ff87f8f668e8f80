use super::ids::ResidueId;
use nalgebra::Point3;

/// Chemical element of an atom, restricted to what nucleic-acid structures carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Element {
    Carbon,
    Nitrogen,
    Oxygen,
    Phosphorus,
    Hydrogen,
    Magnesium,
    #[default]
    Other,
}

impl Element {
    /// Infers the element from a PDB-style atom name.
    ///
    /// Leading digits (as in `1H5'`) are skipped; the first letter decides the
    /// element, except for the two-letter magnesium name `MG`.
    pub fn from_atom_name(name: &str) -> Self {
        let trimmed = name.trim().trim_start_matches(|c: char| c.is_ascii_digit());
        if trimmed.eq_ignore_ascii_case("MG") {
            return Element::Magnesium;
        }
        match trimmed.chars().next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => Element::Carbon,
            Some('N') => Element::Nitrogen,
            Some('O') => Element::Oxygen,
            Some('P') => Element::Phosphorus,
            Some('H') | Some('D') => Element::Hydrogen,
            _ => Element::Other,
        }
    }

    /// Nitrogen and oxygen: the atoms able to take part in a hydrogen bond.
    pub fn is_polar(self) -> bool {
        matches!(self, Element::Nitrogen | Element::Oxygen)
    }
}

/// An atom with its identity and Cartesian position in Angstroms.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name (e.g., "N1", "C1'").
    pub name: String,
    /// The ID of the parent residue this atom belongs to.
    pub residue_id: ResidueId,
    /// The chemical element, inferred from the name.
    pub element: Element,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom`, inferring its element from `name`.
    pub fn new(name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_id,
            element: Element::from_atom_name(name),
            position,
        }
    }

    pub fn is_polar(&self) -> bool {
        self.element.is_polar()
    }
}
