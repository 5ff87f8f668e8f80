use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
    #[error("I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

fn require_positive(parameter: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            parameter,
            reason: format!("expected a positive distance, got {value}"),
        })
    }
}

fn require_angle(parameter: &'static str, degrees: f64) -> Result<(), ConfigError> {
    if degrees > 0.0 && degrees <= 90.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            parameter,
            reason: format!("expected an angle in (0, 90] degrees, got {degrees}"),
        })
    }
}

/// Thresholds of the four-stage base-pair classifier. Distances are in
/// Angstroms, angles in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PairingConfig {
    /// Side of the spatial-index cells holding base centroids.
    pub cell_size: f64,
    /// Residues closer than this in sequence are never paired.
    pub min_sequence_distance: usize,
    /// Maximum distance between the two base centroids.
    pub centroid_distance_cutoff: f64,
    /// Maximum angle between the two base planes.
    pub interplane_angle_cutoff: f64,
    /// Maximum distance of each centroid from the partner's base plane.
    pub plane_height_cutoff: f64,
    /// Maximum N/O-N/O distance for the two bases to count as touching.
    pub atomic_distance: f64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            cell_size: 4.0,
            min_sequence_distance: 3,
            centroid_distance_cutoff: 8.7,
            interplane_angle_cutoff: 30.0,
            plane_height_cutoff: 2.0,
            atomic_distance: 3.1,
        }
    }
}

impl PairingConfig {
    /// A looser calibration that tolerates more buckled or propeller-twisted pairs.
    pub fn relaxed() -> Self {
        Self {
            interplane_angle_cutoff: 46.0,
            plane_height_cutoff: 3.2,
            atomic_distance: 3.2,
            ..Self::default()
        }
    }

    /// Minimum `|cos|` between base-plane normals.
    pub fn min_normal_alignment(&self) -> f64 {
        self.interplane_angle_cutoff.to_radians().cos()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("pairing.cell-size", self.cell_size)?;
        require_positive(
            "pairing.centroid-distance-cutoff",
            self.centroid_distance_cutoff,
        )?;
        require_angle(
            "pairing.interplane-angle-cutoff",
            self.interplane_angle_cutoff,
        )?;
        require_positive("pairing.plane-height-cutoff", self.plane_height_cutoff)?;
        require_positive("pairing.atomic-distance", self.atomic_distance)
    }
}

/// Thresholds deciding whether two base pairs stack in the same duplex.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClusteringConfig {
    /// Maximum difference in phase, and in each residue number, between stacked pairs.
    pub sequence_distance_cutoff: usize,
    /// Maximum angle between the planes of stacked pairs.
    pub interplane_angle_cutoff: f64,
    /// Smallest number of pairs reported as a duplex.
    pub min_base_pair_count: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            sequence_distance_cutoff: 4,
            interplane_angle_cutoff: 20.0,
            min_base_pair_count: 3,
        }
    }
}

impl ClusteringConfig {
    pub fn min_normal_alignment(&self) -> f64 {
        self.interplane_angle_cutoff.to_radians().cos()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_angle(
            "clustering.interplane-angle-cutoff",
            self.interplane_angle_cutoff,
        )?;
        if self.min_base_pair_count == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "clustering.min-base-pair-count",
                reason: "a duplex needs at least one base pair".to_string(),
            });
        }
        Ok(())
    }
}

/// Settings of the donor/acceptor proximity scan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct HydrogenBondConfig {
    /// Whether the analysis workflow runs the scan at all.
    pub enabled: bool,
    pub cell_size: f64,
    /// Donor-acceptor distances above this are ignored.
    pub max_distance: f64,
    /// Donor-acceptor distances below this are treated as clashes and ignored.
    pub min_distance: f64,
}

impl Default for HydrogenBondConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cell_size: 3.5,
            max_distance: 3.5,
            min_distance: 2.0,
        }
    }
}

impl HydrogenBondConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("hydrogen-bonds.cell-size", self.cell_size)?;
        require_positive("hydrogen-bonds.max-distance", self.max_distance)?;
        if !(self.min_distance >= 0.0 && self.min_distance < self.max_distance) {
            return Err(ConfigError::InvalidParameter {
                parameter: "hydrogen-bonds.min-distance",
                reason: format!(
                    "expected a value in [0, {}), got {}",
                    self.max_distance, self.min_distance
                ),
            });
        }
        Ok(())
    }
}

/// Complete analysis configuration.
///
/// Every table and key is optional in TOML; omitted values take their defaults.
///
/// ```toml
/// [pairing]
/// interplane-angle-cutoff = 46.0
///
/// [clustering]
/// min-base-pair-count = 4
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalysisConfig {
    pub pairing: PairingConfig,
    pub clustering: ClusteringConfig,
    pub hydrogen_bonds: HydrogenBondConfig,
}

impl AnalysisConfig {
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::new()
    }

    /// Reads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.to_string_lossy())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<string>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Toml {
            path: origin.to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pairing.validate()?;
        self.clustering.validate()?;
        self.hydrogen_bonds.validate()
    }
}

/// Programmatic construction of an [`AnalysisConfig`], starting from the defaults.
#[derive(Default)]
pub struct AnalysisConfigBuilder {
    pairing: PairingConfig,
    clustering: ClusteringConfig,
    hydrogen_bonds: HydrogenBondConfig,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairing(mut self, pairing: PairingConfig) -> Self {
        self.pairing = pairing;
        self
    }
    pub fn clustering(mut self, clustering: ClusteringConfig) -> Self {
        self.clustering = clustering;
        self
    }
    pub fn hydrogen_bonds(mut self, hydrogen_bonds: HydrogenBondConfig) -> Self {
        self.hydrogen_bonds = hydrogen_bonds;
        self
    }

    pub fn cell_size(mut self, size: f64) -> Self {
        self.pairing.cell_size = size;
        self
    }
    pub fn min_sequence_distance(mut self, distance: usize) -> Self {
        self.pairing.min_sequence_distance = distance;
        self
    }
    pub fn centroid_distance_cutoff(mut self, cutoff: f64) -> Self {
        self.pairing.centroid_distance_cutoff = cutoff;
        self
    }
    pub fn pair_interplane_angle_cutoff(mut self, degrees: f64) -> Self {
        self.pairing.interplane_angle_cutoff = degrees;
        self
    }
    pub fn plane_height_cutoff(mut self, cutoff: f64) -> Self {
        self.pairing.plane_height_cutoff = cutoff;
        self
    }
    pub fn atomic_distance(mut self, distance: f64) -> Self {
        self.pairing.atomic_distance = distance;
        self
    }
    pub fn sequence_distance_cutoff(mut self, cutoff: usize) -> Self {
        self.clustering.sequence_distance_cutoff = cutoff;
        self
    }
    pub fn cluster_interplane_angle_cutoff(mut self, degrees: f64) -> Self {
        self.clustering.interplane_angle_cutoff = degrees;
        self
    }
    pub fn min_base_pair_count(mut self, count: usize) -> Self {
        self.clustering.min_base_pair_count = count;
        self
    }
    pub fn detect_hydrogen_bonds(mut self, enabled: bool) -> Self {
        self.hydrogen_bonds.enabled = enabled;
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let config = AnalysisConfig {
            pairing: self.pairing,
            clustering: self.clustering,
            hydrogen_bonds: self.hydrogen_bonds,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    mod defaults {
        use super::*;

        #[test]
        fn default_thresholds() {
            let config = AnalysisConfig::default();
            assert_eq!(config.pairing.cell_size, 4.0);
            assert_eq!(config.pairing.min_sequence_distance, 3);
            assert_eq!(config.pairing.centroid_distance_cutoff, 8.7);
            assert_eq!(config.pairing.interplane_angle_cutoff, 30.0);
            assert_eq!(config.pairing.plane_height_cutoff, 2.0);
            assert_eq!(config.pairing.atomic_distance, 3.1);
            assert_eq!(config.clustering.sequence_distance_cutoff, 4);
            assert_eq!(config.clustering.interplane_angle_cutoff, 20.0);
            assert_eq!(config.clustering.min_base_pair_count, 3);
            assert!(!config.hydrogen_bonds.enabled);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn relaxed_pairing_only_loosens_geometry() {
            let relaxed = PairingConfig::relaxed();
            assert_eq!(relaxed.interplane_angle_cutoff, 46.0);
            assert_eq!(relaxed.plane_height_cutoff, 3.2);
            assert_eq!(relaxed.atomic_distance, 3.2);
            assert_eq!(relaxed.centroid_distance_cutoff, 8.7);
            assert!(relaxed.validate().is_ok());
        }

        #[test]
        fn normal_alignment_is_cosine_of_cutoff() {
            let pairing = PairingConfig {
                interplane_angle_cutoff: 60.0,
                ..PairingConfig::default()
            };
            assert!((pairing.min_normal_alignment() - 0.5).abs() < 1e-12);
        }
    }

    mod builder {
        use super::*;

        #[test]
        fn setters_override_defaults() {
            let config = AnalysisConfig::builder()
                .centroid_distance_cutoff(7.5)
                .min_sequence_distance(4)
                .cluster_interplane_angle_cutoff(25.0)
                .min_base_pair_count(2)
                .detect_hydrogen_bonds(true)
                .build()
                .unwrap();
            assert_eq!(config.pairing.centroid_distance_cutoff, 7.5);
            assert_eq!(config.pairing.min_sequence_distance, 4);
            assert_eq!(config.pairing.atomic_distance, 3.1);
            assert_eq!(config.clustering.interplane_angle_cutoff, 25.0);
            assert_eq!(config.clustering.min_base_pair_count, 2);
            assert!(config.hydrogen_bonds.enabled);
        }

        #[test]
        fn build_rejects_non_positive_distances() {
            let result = AnalysisConfig::builder().atomic_distance(0.0).build();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidParameter {
                    parameter: "pairing.atomic-distance",
                    ..
                })
            ));
            assert!(AnalysisConfig::builder().cell_size(f64::NAN).build().is_err());
        }

        #[test]
        fn build_rejects_out_of_range_angles() {
            assert!(
                AnalysisConfig::builder()
                    .pair_interplane_angle_cutoff(0.0)
                    .build()
                    .is_err()
            );
            assert!(
                AnalysisConfig::builder()
                    .cluster_interplane_angle_cutoff(120.0)
                    .build()
                    .is_err()
            );
            assert!(
                AnalysisConfig::builder()
                    .pair_interplane_angle_cutoff(90.0)
                    .build()
                    .is_ok()
            );
        }

        #[test]
        fn build_rejects_empty_duplexes() {
            let result = AnalysisConfig::builder().min_base_pair_count(0).build();
            assert!(matches!(
                result,
                Err(ConfigError::InvalidParameter {
                    parameter: "clustering.min-base-pair-count",
                    ..
                })
            ));
        }

        #[test]
        fn build_rejects_inverted_hydrogen_bond_window() {
            let result = AnalysisConfig::builder()
                .hydrogen_bonds(HydrogenBondConfig {
                    min_distance: 3.6,
                    ..HydrogenBondConfig::default()
                })
                .build();
            assert!(result.is_err());
        }
    }

    mod toml_loading {
        use super::*;

        #[test]
        fn partial_file_keeps_remaining_defaults() {
            let config = AnalysisConfig::from_toml_str(
                r#"
                [pairing]
                interplane-angle-cutoff = 46.0
                plane-height-cutoff = 3.2

                [clustering]
                min-base-pair-count = 4
                "#,
            )
            .unwrap();
            assert_eq!(config.pairing.interplane_angle_cutoff, 46.0);
            assert_eq!(config.pairing.plane_height_cutoff, 3.2);
            assert_eq!(config.pairing.atomic_distance, 3.1);
            assert_eq!(config.clustering.min_base_pair_count, 4);
            assert_eq!(config.clustering.sequence_distance_cutoff, 4);
        }

        #[test]
        fn empty_document_is_the_default_config() {
            assert_eq!(
                AnalysisConfig::from_toml_str("").unwrap(),
                AnalysisConfig::default()
            );
        }

        #[test]
        fn unknown_keys_are_rejected() {
            let result = AnalysisConfig::from_toml_str("[pairing]\ncentroid-cutoff = 9.0\n");
            assert!(matches!(result, Err(ConfigError::Toml { .. })));
        }

        #[test]
        fn negative_sequence_distance_is_rejected() {
            let result = AnalysisConfig::from_toml_str("[pairing]\nmin-sequence-distance = -1\n");
            assert!(matches!(result, Err(ConfigError::Toml { .. })));
        }

        #[test]
        fn parsed_values_are_validated() {
            let result = AnalysisConfig::from_toml_str("[pairing]\ncell-size = -4.0\n");
            assert!(matches!(result, Err(ConfigError::InvalidParameter { .. })));
        }

        #[test]
        fn load_reads_file_from_disk() {
            let dir = tempdir().unwrap();
            let file_path = dir.path().join("duplexscan.toml");
            fs::write(
                &file_path,
                "[hydrogen-bonds]\nenabled = true\nmax-distance = 3.3\n",
            )
            .unwrap();

            let config = AnalysisConfig::load(&file_path).unwrap();
            assert!(config.hydrogen_bonds.enabled);
            assert_eq!(config.hydrogen_bonds.max_distance, 3.3);
            assert_eq!(config.hydrogen_bonds.min_distance, 2.0);
        }

        #[test]
        fn load_fails_for_missing_file() {
            let dir = tempdir().unwrap();
            let result = AnalysisConfig::load(&dir.path().join("missing.toml"));
            assert!(matches!(result, Err(ConfigError::Io { .. })));
        }
    }
}
