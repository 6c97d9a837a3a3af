//! Hermitian XC potential matrix from complex crystal orbitals.

use crate::numint::dot::{dot_ao_ao, non0tab_or_all};
use crate::numint::mol::{self, weighted_ao};
use crate::numint::{check_deriv, check_potential_inputs, gga_vsigma, AoValues};
use basis::{Cell, Non0Tab};
use color_eyre::eyre::Result;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// `V = M + Mᴴ` with `M_μν = Σ_p conj(ψ_μ) (w v)_p ψ_ν`, the weighting
/// halved on the value row so that `V` carries the full potential.
///
/// Orbitals with no imaginary part at all go through the real kernel and
/// come back as a real symmetric matrix lifted to complex.
///
/// # Panics
/// If `isgga` and `vsigma` is missing or `rho` lacks gradient rows.
#[allow(clippy::too_many_arguments)]
pub fn eval_mat(
    cell: &Cell,
    ao: &AoValues<Complex64>,
    weight: &DVector<f64>,
    rho: &DMatrix<f64>,
    vrho: &DVector<f64>,
    vsigma: Option<&DVector<f64>>,
    non0tab: Option<&Non0Tab>,
    isgga: bool,
) -> Result<DMatrix<Complex64>> {
    if isgga {
        gga_vsigma(vsigma, rho);
    }
    if ao.is_real() {
        tracing::trace!("eval_mat: real orbitals, using the real kernel");
        let mat = mol::eval_mat(cell, &ao.real_part(), weight, rho, vrho, vsigma, non0tab, isgga)?;
        return Ok(mat.map(|v| Complex64::new(v, 0.0)));
    }

    check_deriv(ao, isgga)?;
    let ngrids = ao.ngrids();
    check_potential_inputs(ngrids, weight, rho, vrho, vsigma)?;
    let tab = non0tab_or_all(non0tab, ngrids, cell.nbas());

    let aow = weighted_ao(ao, weight, rho, vrho, vsigma, isgga);
    let (w_re, w_im) = (aow.map(|z| z.re), aow.map(|z| z.im));
    let (a_re, a_im) = ao.split(0);

    let mat_re = dot_ao_ao(cell, &a_re, &w_re, &tab)? + dot_ao_ao(cell, &a_im, &w_im, &tab)?;
    let mat_im = dot_ao_ao(cell, &a_re, &w_im, &tab)? - dot_ao_ao(cell, &a_im, &w_re, &tab)?;
    let mat = mat_re.zip_map(&mat_im, Complex64::new);
    Ok(&mat + mat.adjoint())
}
