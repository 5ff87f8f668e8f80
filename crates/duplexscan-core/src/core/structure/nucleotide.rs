use crate::core::geometry::fit::{FitError, Plane3D};
use crate::core::models::ids::ResidueId;
use crate::core::models::residue::NucleotideType;
use crate::core::models::system::MolecularSystem;
use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Residue {residue} lacks the base-group atoms needed for its geometry: {source}")]
    InsufficientAtoms {
        residue: String,
        #[source]
        source: FitError,
    },

    #[error("Residue {residue} is not a nucleotide")]
    NotANucleotide { residue: String },

    #[error("Residue {residue} has no '{atom}' atom")]
    MissingAtom { residue: String, atom: &'static str },

    #[error("Residue {0:?} does not exist in the system")]
    ResidueNotFound(ResidueId),
}

/// Human-readable `chain:number[icode]` label used in diagnostics.
pub(crate) fn residue_label(system: &MolecularSystem, residue_id: ResidueId) -> String {
    let Some(residue) = system.residue(residue_id) else {
        return format!("{residue_id:?}");
    };
    let chain = system.chain(residue.chain_id).map_or('?', |c| c.id);
    if residue.insertion_code == ' ' {
        format!("{}:{}{}", chain, residue.name, residue.number)
    } else {
        format!(
            "{}:{}{}{}",
            chain, residue.name, residue.number, residue.insertion_code
        )
    }
}

pub(crate) fn centroid_of(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f64))
}

/// Geometry of one nucleotide's base, computed once per analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct NucleotideGeometry {
    residue_id: ResidueId,
    number: isize,
    insertion_code: char,
    nucleotide_type: NucleotideType,
    centroid: Point3<f64>,
    plane: Plane3D,
    polar_atoms: Vec<Point3<f64>>,
}

impl NucleotideGeometry {
    /// Classifies `residue_id` and measures its base.
    ///
    /// This is the single capability check of the analysis: residues that are
    /// not nucleotides, or whose base atoms do not determine a plane, are
    /// rejected here and never reach the classifier.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::NotANucleotide`] for residues without a nucleotide type.
    /// - [`GeometryError::InsufficientAtoms`] when the base group has fewer than
    ///   three atoms or they are collinear.
    pub fn from_residue(
        system: &MolecularSystem,
        residue_id: ResidueId,
    ) -> Result<Self, GeometryError> {
        let residue = system
            .residue(residue_id)
            .ok_or(GeometryError::ResidueNotFound(residue_id))?;
        let nucleotide_type =
            residue
                .residue_type
                .ok_or_else(|| GeometryError::NotANucleotide {
                    residue: residue_label(system, residue_id),
                })?;

        let base_positions: Vec<Point3<f64>> = system
            .base_group_atoms(residue_id)
            .into_iter()
            .map(|atom| atom.position)
            .collect();

        let insufficient = |source| GeometryError::InsufficientAtoms {
            residue: residue_label(system, residue_id),
            source,
        };
        let plane = Plane3D::best_fit(&base_positions).map_err(insufficient)?;
        let centroid = centroid_of(&base_positions).ok_or_else(|| {
            insufficient(FitError::InsufficientPoints {
                required: 3,
                found: 0,
            })
        })?;

        let polar_atoms = system
            .residue_atoms(residue_id)
            .filter(|atom| atom.is_polar())
            .map(|atom| atom.position)
            .collect();

        Ok(Self {
            residue_id,
            number: residue.number,
            insertion_code: residue.insertion_code,
            nucleotide_type,
            centroid,
            plane,
            polar_atoms,
        })
    }

    pub fn residue_id(&self) -> ResidueId {
        self.residue_id
    }

    pub fn number(&self) -> isize {
        self.number
    }

    pub fn insertion_code(&self) -> char {
        self.insertion_code
    }

    pub fn nucleotide_type(&self) -> NucleotideType {
        self.nucleotide_type
    }

    /// Mean position of the base-group atoms.
    pub fn centroid(&self) -> &Point3<f64> {
        &self.centroid
    }

    /// Best-fit plane through the base-group atoms.
    pub fn plane(&self) -> &Plane3D {
        &self.plane
    }

    /// Positions of every nitrogen and oxygen atom of the residue.
    pub fn polar_atoms(&self) -> &[Point3<f64>] {
        &self.polar_atoms
    }

    /// Whether any polar atom of `self` lies within `cutoff` of a polar atom of `other`.
    pub fn has_polar_contact(&self, other: &NucleotideGeometry, cutoff: f64) -> bool {
        let cutoff_sq = cutoff * cutoff;
        self.polar_atoms.iter().any(|a| {
            other
                .polar_atoms
                .iter()
                .any(|b| (a - b).norm_squared() <= cutoff_sq)
        })
    }
}
