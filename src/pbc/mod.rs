//! Periodic (k-point) grid kernels.
//!
//! - [`ao`]: Bloch sums of real AOs over lattice images
//! - [`rho`]: real density from complex orbitals and density matrix
//! - [`mat`]: Hermitian XC potential matrix
//! - [`kpt`]: [`KptNumInt`], the [`crate::numint::NumInt`] implementation
//!   the XC drivers consume
//!
//! Complex products are split into real and imaginary parts so that every
//! contraction runs through the real kernels of [`crate::numint::dot`].

pub mod ao;
pub mod kpt;
pub mod mat;
pub mod rho;


pub use ao::{bloch_phase, lattice_images, ImageCutoff};
pub use kpt::KptNumInt;
