use slotmap::new_key_type;

new_key_type! {
    /// Key of an [`Atom`](super::atom::Atom) inside a
    /// [`MolecularSystem`](super::system::MolecularSystem).
    pub struct AtomId;
    /// Key of a [`Residue`](super::residue::Residue).
    pub struct ResidueId;
    /// Key of a [`Chain`](super::chain::Chain).
    pub struct ChainId;
}
