//! Real-arithmetic AO contractions, screened block by block with a [`Non0Tab`].

use crate::error::NumIntError;
use basis::{Cell, Non0Tab, BLKSIZE};
use color_eyre::eyre::{ensure, Result};
use nalgebra::{DMatrix, DVector, Scalar};
use std::borrow::Cow;
use std::ops::Mul;

/// The caller's table, or one with every shell active.
pub fn non0tab_or_all<'a>(
    non0tab: Option<&'a Non0Tab>,
    ngrids: usize,
    nbas: usize,
) -> Cow<'a, Non0Tab> {
    match non0tab {
        Some(tab) => Cow::Borrowed(tab),
        None => Cow::Owned(Non0Tab::all_active(ngrids, nbas)),
    }
}

/// Rows `p0..p0+np` of `ao`, with the columns of shells inactive in `blk` zeroed.
fn masked_block(
    ao: &DMatrix<f64>,
    p0: usize,
    np: usize,
    blk: usize,
    non0tab: &Non0Tab,
    ao_loc: &[usize],
) -> DMatrix<f64> {
    let mut block = ao.rows(p0, np).into_owned();
    for sh in 0..ao_loc.len() - 1 {
        if !non0tab.is_active(blk, sh) {
            block
                .columns_mut(ao_loc[sh], ao_loc[sh + 1] - ao_loc[sh])
                .fill(0.0);
        }
    }
    block
}

/// `ao · dm`, shape `(ngrids, ncols(dm))`.
///
/// `dm` may be any matrix with `nao` rows (a density matrix, or occupied MO
/// coefficients).
pub fn dot_ao_dm(
    cell: &Cell,
    ao: &DMatrix<f64>,
    dm: &DMatrix<f64>,
    non0tab: &Non0Tab,
) -> Result<DMatrix<f64>> {
    let (ngrids, nao) = ao.shape();
    ensure!(
        nao == cell.nao() && dm.nrows() == nao,
        NumIntError::ShapeMismatch(format!(
            "ao is ({}, {}), dm is ({}, {}), cell has {} AOs",
            ngrids,
            nao,
            dm.nrows(),
            dm.ncols(),
            cell.nao()
        ))
    );
    non0tab.check_shape(ngrids, cell.nbas())?;

    let ao_loc = cell.ao_loc();
    let mut out = DMatrix::zeros(ngrids, dm.ncols());
    for blk in 0..Non0Tab::block_count(ngrids) {
        let p0 = blk * BLKSIZE;
        let np = BLKSIZE.min(ngrids - p0);
        let block = masked_block(ao, p0, np, blk, non0tab, &ao_loc);
        out.rows_mut(p0, np).copy_from(&(block * dm));
    }
    Ok(out)
}

/// `ao1ᵀ · ao2`, shape `(nao, nao)`. Shell pairs with either shell masked
/// off in a block do not contribute.
pub fn dot_ao_ao(
    cell: &Cell,
    ao1: &DMatrix<f64>,
    ao2: &DMatrix<f64>,
    non0tab: &Non0Tab,
) -> Result<DMatrix<f64>> {
    let (ngrids, nao) = ao1.shape();
    ensure!(
        ao2.shape() == ao1.shape() && nao == cell.nao(),
        NumIntError::ShapeMismatch(format!(
            "ao1 is {:?}, ao2 is {:?}, cell has {} AOs",
            ao1.shape(),
            ao2.shape(),
            cell.nao()
        ))
    );
    non0tab.check_shape(ngrids, cell.nbas())?;

    let ao_loc = cell.ao_loc();
    let mut out = DMatrix::zeros(nao, nao);
    for blk in 0..Non0Tab::block_count(ngrids) {
        let p0 = blk * BLKSIZE;
        let np = BLKSIZE.min(ngrids - p0);
        let a1 = masked_block(ao1, p0, np, blk, non0tab, &ao_loc);
        let a2 = masked_block(ao2, p0, np, blk, non0tab, &ao_loc);
        out += a1.tr_mul(&a2);
    }
    Ok(out)
}

/// Per-point inner product over the AO index: `Σ_i a[p, i] b[p, i]`.
pub(crate) fn row_dot(a: &DMatrix<f64>, b: &DMatrix<f64>) -> DVector<f64> {
    a.component_mul(b).column_sum()
}

/// Scales row `p` of `m` by `f[p]`.
pub(crate) fn scale_rows<T>(m: &DMatrix<T>, f: &DVector<f64>) -> DMatrix<T>
where
    T: Scalar + Copy + Mul<f64, Output = T>,
{
    DMatrix::from_fn(m.nrows(), m.ncols(), |p, i| m[(p, i)] * f[p])
}
