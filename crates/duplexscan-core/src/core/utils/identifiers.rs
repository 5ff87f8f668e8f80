use phf::{Set, phf_set};
use std::borrow::Cow;

/// Ring atoms of the purine/pyrimidine base plus their exocyclic substituents.
static BASE_GROUP_ATOM_NAMES: Set<&'static str> = phf_set! {
    "N1", "C2", "N3", "C4", "C5", "C6", "N7", "C8", "N9",
    "O2", "N2", "O4", "N4", "O6", "N6",
};

/// Upper bound on the number of base-group atoms a single nucleotide can carry.
pub const MAX_BASE_GROUP_ATOMS: usize = 11;

/// Name of the glycosidic sugar carbon, used to locate the helix axis.
pub const GLYCOSIDIC_CARBON_NAME: &str = "C1'";

/// Canonicalizes an atom name for lookup.
///
/// Surrounding whitespace is removed and the legacy `*` prime marker used by
/// older PDB files (`C1*`) is rewritten to the modern `'` (`C1'`).
pub fn normalize_atom_name(name: &str) -> Cow<'_, str> {
    let trimmed = name.trim();
    if trimmed.contains('*') {
        Cow::Owned(trimmed.replace('*', "'"))
    } else {
        Cow::Borrowed(trimmed)
    }
}

pub fn is_base_group_atom(atom_name: &str) -> bool {
    BASE_GROUP_ATOM_NAMES.contains(normalize_atom_name(atom_name).as_ref())
}
