//! Configuration for periodic grid integration
//!
//! A YAML file describes the cell (lattice, images, atoms, NWChem basis
//! blocks per element), the integrator settings, and optionally the
//! k-point.

use crate::error::NumIntError;
use crate::pbc::{ImageCutoff, KptNumInt};
use basis::{Cell, BLKSIZE};
use color_eyre::eyre::{ensure, eyre, Result, WrapErr};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Grid points per driver block unless configured otherwise.
pub const DEFAULT_BLOCK_POINTS: usize = BLKSIZE * 16;

/// Integrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumIntConfig {
    /// Which lattice images enter the Bloch sum
    #[serde(default)]
    pub image_cutoff: Option<ImageCutoff>,

    /// Grid points per driver block, rounded up to a multiple of 128
    #[serde(default)]
    pub block_points: Option<usize>,
}

impl Default for NumIntConfig {
    fn default() -> Self {
        NumIntConfig {
            image_cutoff: Some(ImageCutoff::default()),
            block_points: Some(DEFAULT_BLOCK_POINTS),
        }
    }
}

impl NumIntConfig {
    /// Apply default values to any missing fields
    pub fn with_defaults(mut self) -> Self {
        let defaults = NumIntConfig::default();
        if self.image_cutoff.is_none() {
            self.image_cutoff = defaults.image_cutoff;
        }
        if self.block_points.is_none() {
            self.block_points = defaults.block_points;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ImageCutoff::Sphere { fraction }) = self.image_cutoff {
            ensure!(
                fraction.is_finite() && fraction >= 0.0,
                NumIntError::InvalidConfig(format!(
                    "image cutoff fraction {} must be >= 0",
                    fraction
                ))
            );
        }
        ensure!(
            self.block_points != Some(0),
            NumIntError::InvalidConfig("block_points must be positive".to_string())
        );
        Ok(())
    }
}

/// Atom in the unit cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtomConfig {
    /// Element symbol (e.g., "H", "Si")
    pub element: String,

    /// Cartesian position [x, y, z] in bohr
    pub coords: [f64; 3],
}

/// Unit cell and its basis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellConfig {
    /// Lattice vectors a1, a2, a3 as rows, in bohr
    pub lattice: [[f64; 3]; 3],

    /// Periodic repeats per lattice direction
    #[serde(default)]
    pub nimgs: [i32; 3],

    pub atoms: Vec<AtomConfig>,

    /// NWChem basis block for each element
    #[serde(default)]
    pub basis_sets: HashMap<String, String>,
}

impl CellConfig {
    pub fn build(&self) -> Result<Cell> {
        let mut cell = Cell::from_lattice_rows(self.lattice, self.nimgs);
        for atom in &self.atoms {
            let basis = self
                .basis_sets
                .get(&atom.element)
                .ok_or_else(|| {
                    eyre!(NumIntError::InvalidConfig(format!(
                        "no basis set given for element {}",
                        atom.element
                    )))
                })?;
            let [x, y, z] = atom.coords;
            cell.add_atom(&atom.element, Vector3::new(x, y, z), basis)
                .wrap_err_with(|| format!("Failed to add atom {}", atom.element))?;
        }
        Ok(cell)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub cell: CellConfig,

    #[serde(default)]
    pub numint: NumIntConfig,

    /// Bloch momentum; absent means the Γ point
    #[serde(default)]
    pub kpt: Option<[f64; 3]>,
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Config =
            serde_yml::from_str(yaml).wrap_err("Failed to parse YAML configuration")?;
        let config = config.with_defaults();
        config.numint.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply default values to any missing configuration fields
    pub fn with_defaults(mut self) -> Self {
        self.numint = self.numint.with_defaults();
        self
    }

    pub fn kpoint(&self) -> Option<Vector3<f64>> {
        self.kpt.map(|[x, y, z]| Vector3::new(x, y, z))
    }

    /// The k-point integrator described by this configuration.
    pub fn integrator(&self) -> Result<KptNumInt> {
        KptNumInt::from_config(&self.numint, self.kpoint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SILICON_LIKE: &str = r#"
cell:
  lattice:
    - [0.0, 5.13, 5.13]
    - [5.13, 0.0, 5.13]
    - [5.13, 5.13, 0.0]
  nimgs: [1, 1, 1]
  atoms:
    - element: H
      coords: [0.0, 0.0, 0.0]
    - element: H
      coords: [2.565, 2.565, 2.565]
  basis_sets:
    H: |
      H    S
            3.42525091             0.15432897
            0.62391373             0.53532814
            0.16885540             0.44463454
numint:
  image_cutoff:
    kind: box
kpt: [0.1, 0.0, 0.2]
"#;

    #[test]
    fn test_config_defaults() {
        let config = NumIntConfig {
            image_cutoff: None,
            block_points: None,
        }
        .with_defaults();
        assert_eq!(config, NumIntConfig::default());
        assert_eq!(config.block_points, Some(DEFAULT_BLOCK_POINTS));
        assert_eq!(config.image_cutoff, Some(ImageCutoff::Sphere { fraction: 1.0 / 3.0 }));
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_yaml_str(SILICON_LIKE).unwrap();
        assert_eq!(config.numint.image_cutoff, Some(ImageCutoff::Box));
        assert_eq!(config.numint.block_points, Some(DEFAULT_BLOCK_POINTS));

        let cell = config.cell.build().unwrap();
        assert_eq!(cell.nao(), 2);
        assert_eq!(cell.nimgs, [1, 1, 1]);
        assert!((cell.lattice.column(0) - Vector3::new(0.0, 5.13, 5.13)).norm() < 1e-14);

        let ni = config.integrator().unwrap();
        assert_eq!(ni.image_cutoff, ImageCutoff::Box);
        assert_eq!(ni.kpt, Some(Vector3::new(0.1, 0.0, 0.2)));
    }

    #[test]
    fn test_missing_numint_section_uses_defaults() {
        let yaml = "cell:\n  lattice: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]\n  \
                    atoms: []\n";
        let config = Config::from_yaml_str(yaml).unwrap();
        assert_eq!(config.numint, NumIntConfig::default());
        assert_eq!(config.cell.nimgs, [0, 0, 0]);
        assert!(config.kpoint().is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let negative = NumIntConfig {
            image_cutoff: Some(ImageCutoff::Sphere { fraction: -1.0 }),
            block_points: None,
        };
        let err = negative.validate().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NumIntError>(),
            Some(NumIntError::InvalidConfig(_))
        ));

        let zero_block = NumIntConfig {
            image_cutoff: None,
            block_points: Some(0),
        };
        assert!(KptNumInt::from_config(&zero_block, None).is_err());
    }

    #[test]
    fn test_missing_basis_set_is_an_error() {
        let mut config = Config::from_yaml_str(SILICON_LIKE).unwrap();
        config.cell.basis_sets.clear();
        assert!(config.cell.build().is_err());
    }
}
