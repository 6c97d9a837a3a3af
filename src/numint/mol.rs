//! Real-orbital grid integration, used directly for molecules and as the
//! fallback of the periodic kernels when every Bloch phase is real.

use super::dot::{dot_ao_ao, dot_ao_dm, non0tab_or_all, row_dot, scale_rows};
use super::{
    check_deriv, check_dm, check_potential_inputs, driver, gga_vsigma, AoValues, Grids, NumInt,
    RksVxc, UksVxc, XcFunctional,
};
use crate::config::DEFAULT_BLOCK_POINTS;
use crate::error::NumIntError;
use basis::{Cell, Non0Tab};
use color_eyre::eyre::{ensure, Result};
use nalgebra::{DMatrix, DVector, Vector3};

/// Real AO values (and gradients) on `coords`.
pub fn eval_ao(
    cell: &Cell,
    coords: &[Vector3<f64>],
    deriv: bool,
    non0tab: Option<&Non0Tab>,
) -> Result<AoValues<f64>> {
    let comps = cell.eval_gto(coords, deriv, non0tab)?;
    AoValues::new(comps)
}

/// Density from a symmetric density matrix.
///
/// Row 0 is `Σ_μν φ_μ D_μν φ_ν`; rows 1..=3, when `isgga`, are
/// `2 Σ_μν ∂φ_μ D_μν φ_ν`.
pub fn eval_rho(
    cell: &Cell,
    ao: &AoValues<f64>,
    dm: &DMatrix<f64>,
    non0tab: Option<&Non0Tab>,
    isgga: bool,
) -> Result<DMatrix<f64>> {
    check_deriv(ao, isgga)?;
    check_dm(dm, cell.nao())?;
    let ngrids = ao.ngrids();
    let tab = non0tab_or_all(non0tab, ngrids, cell.nbas());

    let c0 = dot_ao_dm(cell, ao.value(), dm, &tab)?;
    let nrows = if isgga { 4 } else { 1 };
    let mut rho = DMatrix::zeros(nrows, ngrids);
    rho.set_row(0, &row_dot(ao.value(), &c0).transpose());
    for i in 1..nrows {
        let grad = row_dot(ao.component(i), &c0) * 2.0;
        rho.set_row(i, &grad.transpose());
    }
    Ok(rho)
}

/// Density from MO coefficients and occupation numbers.
///
/// Orbitals with non-positive occupation are dropped; the rest are scaled
/// by `√occ` so that `ρ = Σ_i |φ·c_i|²`.
pub fn eval_rho2(
    cell: &Cell,
    ao: &AoValues<f64>,
    mo_coeff: &DMatrix<f64>,
    mo_occ: &DVector<f64>,
    non0tab: Option<&Non0Tab>,
    isgga: bool,
) -> Result<DMatrix<f64>> {
    check_deriv(ao, isgga)?;
    ensure!(
        mo_occ.len() == mo_coeff.ncols(),
        NumIntError::ShapeMismatch(format!(
            "{} occupations for {} orbitals",
            mo_occ.len(),
            mo_coeff.ncols()
        ))
    );
    let ngrids = ao.ngrids();
    let tab = non0tab_or_all(non0tab, ngrids, cell.nbas());

    let occupied: Vec<usize> = (0..mo_occ.len()).filter(|&i| mo_occ[i] > 0.0).collect();
    let cpos = DMatrix::from_fn(mo_coeff.nrows(), occupied.len(), |mu, j| {
        mo_coeff[(mu, occupied[j])] * mo_occ[occupied[j]].sqrt()
    });

    let c0 = dot_ao_dm(cell, ao.value(), &cpos, &tab)?;
    let nrows = if isgga { 4 } else { 1 };
    let mut rho = DMatrix::zeros(nrows, ngrids);
    rho.set_row(0, &row_dot(&c0, &c0).transpose());
    for i in 1..nrows {
        let c1 = dot_ao_dm(cell, ao.component(i), &cpos, &tab)?;
        rho.set_row(i, &(row_dot(&c0, &c1) * 2.0).transpose());
    }
    Ok(rho)
}

/// Weighted AO values `aow` such that `ao0ᵀ·aow + (ao0ᵀ·aow)ᵀ` is the
/// potential matrix.
pub(crate) fn weighted_ao<T>(
    ao: &AoValues<T>,
    weight: &DVector<f64>,
    rho: &DMatrix<f64>,
    vrho: &DVector<f64>,
    vsigma: Option<&DVector<f64>>,
    isgga: bool,
) -> DMatrix<T>
where
    T: nalgebra::Scalar + Copy + std::ops::Mul<f64, Output = T> + std::ops::AddAssign,
{
    let wv0 = weight.component_mul(vrho) * 0.5;
    let mut aow = scale_rows(ao.value(), &wv0);
    if isgga {
        let wvs = weight.component_mul(gga_vsigma(vsigma, rho)) * 2.0;
        for i in 1..4 {
            let wv = rho.row(i).transpose().component_mul(&wvs);
            aow.zip_apply(&scale_rows(ao.component(i), &wv), |a, b| *a += b);
        }
    }
    aow
}

/// Real XC potential matrix, symmetric by construction.
///
/// # Panics
/// If `isgga` and `vsigma` is missing or `rho` lacks gradient rows.
#[allow(clippy::too_many_arguments)]
pub fn eval_mat(
    cell: &Cell,
    ao: &AoValues<f64>,
    weight: &DVector<f64>,
    rho: &DMatrix<f64>,
    vrho: &DVector<f64>,
    vsigma: Option<&DVector<f64>>,
    non0tab: Option<&Non0Tab>,
    isgga: bool,
) -> Result<DMatrix<f64>> {
    if isgga {
        gga_vsigma(vsigma, rho);
    }
    check_deriv(ao, isgga)?;
    let ngrids = ao.ngrids();
    check_potential_inputs(ngrids, weight, rho, vrho, vsigma)?;
    let tab = non0tab_or_all(non0tab, ngrids, cell.nbas());

    let aow = weighted_ao(ao, weight, rho, vrho, vsigma, isgga);
    let mat = dot_ao_ao(cell, ao.value(), &aow, &tab)?;
    Ok(&mat + mat.transpose())
}

/// Grid integrator for real orbitals.
#[derive(Clone, Debug)]
pub struct MolNumInt {
    /// Grid points handled per driver block
    pub block_points: usize,
}

impl Default for MolNumInt {
    fn default() -> Self {
        MolNumInt {
            block_points: DEFAULT_BLOCK_POINTS,
        }
    }
}

impl NumInt for MolNumInt {
    type Elem = f64;

    fn eval_ao(
        &self,
        cell: &Cell,
        coords: &[Vector3<f64>],
        deriv: bool,
        non0tab: Option<&Non0Tab>,
    ) -> Result<AoValues<f64>> {
        eval_ao(cell, coords, deriv, non0tab)
    }

    fn eval_rho(
        &self,
        cell: &Cell,
        ao: &AoValues<f64>,
        dm: &DMatrix<f64>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<f64>> {
        eval_rho(cell, ao, dm, non0tab, isgga)
    }

    fn eval_rho2(
        &self,
        cell: &Cell,
        ao: &AoValues<f64>,
        mo_coeff: &DMatrix<f64>,
        mo_occ: &DVector<f64>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<f64>> {
        eval_rho2(cell, ao, mo_coeff, mo_occ, non0tab, isgga)
    }

    fn eval_mat(
        &self,
        cell: &Cell,
        ao: &AoValues<f64>,
        weight: &DVector<f64>,
        rho: &DMatrix<f64>,
        vrho: &DVector<f64>,
        vsigma: Option<&DVector<f64>>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<f64>> {
        eval_mat(cell, ao, weight, rho, vrho, vsigma, non0tab, isgga)
    }

    fn nr_rks(
        &self,
        cell: &Cell,
        grids: &Grids,
        xc: XcFunctional,
        dm: &DMatrix<f64>,
    ) -> Result<RksVxc<f64>> {
        driver::nr_rks_vxc(self, cell, grids, xc, dm, self.block_points)
    }

    fn nr_uks(
        &self,
        cell: &Cell,
        grids: &Grids,
        xc: XcFunctional,
        dms: &[DMatrix<f64>; 2],
    ) -> Result<UksVxc<f64>> {
        driver::nr_uks_vxc(self, cell, grids, xc, dms, self.block_points)
    }
}
