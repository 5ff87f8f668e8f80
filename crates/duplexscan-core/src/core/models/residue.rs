use super::ids::{AtomId, ChainId};
use crate::core::utils::identifiers::normalize_atom_name;
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NucleotideType {
    // --- Purines ---
    Adenine,
    Guanine,

    // --- Pyrimidines ---
    Cytosine,
    Uracil,  // RNA
    Thymine, // DNA
}

impl NucleotideType {
    pub fn is_purine(self) -> bool {
        matches!(self, NucleotideType::Adenine | NucleotideType::Guanine)
    }

    pub fn is_pyrimidine(self) -> bool {
        !self.is_purine()
    }

    pub fn one_letter_code(self) -> char {
        match self {
            NucleotideType::Adenine => 'A',
            NucleotideType::Guanine => 'G',
            NucleotideType::Cytosine => 'C',
            NucleotideType::Uracil => 'U',
            NucleotideType::Thymine => 'T',
        }
    }

    /// Atom names able to donate a hydrogen in a base-base or base-sugar bond.
    pub fn hydrogen_bond_donor_names(self) -> &'static [&'static str] {
        match self {
            NucleotideType::Adenine => &["N6", "O2'"],
            NucleotideType::Guanine => &["N1", "N2", "O2'"],
            NucleotideType::Cytosine => &["N4", "O2'"],
            NucleotideType::Uracil => &["N3", "O2'"],
            NucleotideType::Thymine => &["N3"],
        }
    }

    /// Atom names able to accept a hydrogen.
    pub fn hydrogen_bond_acceptor_names(self) -> &'static [&'static str] {
        match self {
            NucleotideType::Adenine => &["N1", "N3", "N7", "O2'"],
            NucleotideType::Guanine => &["O6", "N3", "N7", "O2'"],
            NucleotideType::Cytosine => &["O2", "N3", "O2'"],
            NucleotideType::Uracil => &["O2", "O4", "O2'"],
            NucleotideType::Thymine => &["O2", "O4"],
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unrecognized nucleotide residue name: '{0}'")]
pub struct ParseNucleotideTypeError(pub String);

impl FromStr for NucleotideType {
    type Err = ParseNucleotideTypeError;

    /// Parses one-letter, three-letter and DNA/RNA-prefixed residue names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" | "ADE" | "DA" | "RA" => Ok(NucleotideType::Adenine),
            "G" | "GUA" | "DG" | "RG" => Ok(NucleotideType::Guanine),
            "C" | "CYT" | "DC" | "RC" => Ok(NucleotideType::Cytosine),
            "U" | "URA" | "URI" | "DU" | "RU" => Ok(NucleotideType::Uracil),
            "T" | "THY" | "DT" => Ok(NucleotideType::Thymine),
            _ => Err(ParseNucleotideTypeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub number: isize,                         // Residue sequence number from source file
    pub insertion_code: char,                  // PDB insertion code, ' ' when absent
    pub name: String,                          // Name of the residue (e.g., "G", "DA")
    pub residue_type: Option<NucleotideType>,  // None for anything that is not a nucleotide
    pub chain_id: ChainId,                     // ID of the parent chain
    pub(crate) atoms: Vec<AtomId>,             // Atoms in insertion order
    atom_name_map: HashMap<String, AtomId>,    // Normalized atom name to ID
}

impl Residue {
    pub(crate) fn new(number: isize, insertion_code: char, name: &str, chain_id: ChainId) -> Self {
        Self {
            number,
            insertion_code,
            name: name.to_string(),
            residue_type: NucleotideType::from_str(name).ok(),
            chain_id,
            atoms: Vec::new(),
            atom_name_map: HashMap::new(),
        }
    }

    pub(crate) fn add_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.push(atom_id);
        self.atom_name_map
            .insert(normalize_atom_name(atom_name).into_owned(), atom_id);
    }

    pub(crate) fn remove_atom(&mut self, atom_name: &str, atom_id: AtomId) {
        self.atoms.retain(|&id| id != atom_id);
        let key = normalize_atom_name(atom_name);
        if self.atom_name_map.get(key.as_ref()) == Some(&atom_id) {
            self.atom_name_map.remove(key.as_ref());
        }
    }

    pub fn atoms(&self) -> &[AtomId] {
        &self.atoms
    }

    /// Looks up an atom by name; `C1*` and `C1'` refer to the same atom.
    pub fn get_atom_id_by_name(&self, name: &str) -> Option<AtomId> {
        self.atom_name_map
            .get(normalize_atom_name(name).as_ref())
            .copied()
    }
}
