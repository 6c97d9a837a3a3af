//! Numerical integration of Gaussian-basis DFT quantities on real-space
//! grids, for molecules and for periodic cells at a single k-point.
//!
//! ```rust,ignore
//! use pbc_numint::{Config, NumInt, XcFunctional};
//!
//! let config = Config::from_file("cell.yaml")?;
//! let cell = config.cell.build()?;
//! let ni = config.integrator()?;
//! let vxc = ni.nr_rks(&cell, &grids, XcFunctional::LdaX, &dm)?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod numint;
pub mod pbc;

pub use config::{Config, NumIntConfig};
pub use error::NumIntError;
pub use numint::mol::MolNumInt;
pub use numint::{AoValues, Grids, NumInt, RksVxc, UksVxc, XcFunctional};
pub use pbc::{ImageCutoff, KptNumInt};
