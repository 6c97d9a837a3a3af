//! Block-by-shell sparsity mask for grid collocation and contractions.

use crate::error::BasisError;

/// Number of grid points per screening block.
pub const BLKSIZE: usize = 128;

/// Mask of shells that may be non-zero in each block of `BLKSIZE` grid points.
///
/// Entry `(b, s)` is 0 when shell `s` is known to vanish on every point of
/// block `b`; collocation and contractions skip such pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Non0Tab {
    nblk: usize,
    nbas: usize,
    mask: Vec<u8>,
}

impl Non0Tab {
    /// Number of blocks covering `ngrids` points.
    pub fn block_count(ngrids: usize) -> usize {
        (ngrids + BLKSIZE - 1) / BLKSIZE
    }

    /// Table with every shell active in every block.
    pub fn all_active(ngrids: usize, nbas: usize) -> Self {
        let nblk = Self::block_count(ngrids);
        Non0Tab {
            nblk,
            nbas,
            mask: vec![1; nblk * nbas],
        }
    }

    /// Wraps a row-major (block, shell) mask.
    pub fn new(nblk: usize, nbas: usize, mask: Vec<u8>) -> Result<Self, BasisError> {
        if mask.len() != nblk * nbas {
            return Err(BasisError::Shape(format!(
                "non0tab of {} entries cannot be ({}, {})",
                mask.len(),
                nblk,
                nbas
            )));
        }
        Ok(Non0Tab { nblk, nbas, mask })
    }

    pub fn nblk(&self) -> usize {
        self.nblk
    }

    pub fn nbas(&self) -> usize {
        self.nbas
    }

    pub fn is_active(&self, block: usize, shell: usize) -> bool {
        self.mask[block * self.nbas + shell] != 0
    }

    pub fn set(&mut self, block: usize, shell: usize, active: bool) {
        self.mask[block * self.nbas + shell] = active as u8;
    }

    /// Checks that the table covers `ngrids` points and `nbas` shells.
    pub fn check_shape(&self, ngrids: usize, nbas: usize) -> Result<(), BasisError> {
        let nblk = Self::block_count(ngrids);
        if self.nblk < nblk || self.nbas != nbas {
            return Err(BasisError::Shape(format!(
                "non0tab is ({}, {}) but the call needs ({}, {})",
                self.nblk, self.nbas, nblk, nbas
            )));
        }
        Ok(())
    }
}
