//! Gaussian basis functions and the periodic cell that carries them.
//!
//! The crate evaluates real-valued atomic orbitals (and their gradients) on
//! grid points; Bloch sums over lattice images are left to the consumer.

pub mod basis;
pub mod cell;
pub mod cgto;
pub mod error;
pub mod gto;
pub mod helper;
pub mod non0tab;

mod gto_test;

pub use cell::Cell;
pub use error::BasisError;
pub use non0tab::{Non0Tab, BLKSIZE};
