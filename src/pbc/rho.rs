//! Real density from complex crystal orbitals and a complex density matrix.
//!
//! The complex contraction `ψ D ψᴴ` is carried out as four real
//! contractions so the real `dot_ao_dm` kernel can be reused.

use crate::numint::dot::{dot_ao_dm, non0tab_or_all, row_dot};
use crate::numint::{check_deriv, check_dm, AoValues};
use basis::{Cell, Non0Tab};
use color_eyre::eyre::Result;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

/// `ao_y · dm_x` for the real (`r`) and imaginary (`i`) parts, named
/// density-matrix part first.
struct PartialContractions {
    rr: DMatrix<f64>,
    ri: DMatrix<f64>,
    ir: DMatrix<f64>,
    ii: DMatrix<f64>,
}

impl PartialContractions {
    fn new(
        cell: &Cell,
        ao_re: &DMatrix<f64>,
        ao_im: &DMatrix<f64>,
        dm_re: &DMatrix<f64>,
        dm_im: &DMatrix<f64>,
        non0tab: &Non0Tab,
    ) -> Result<Self> {
        Ok(PartialContractions {
            rr: dot_ao_dm(cell, ao_re, dm_re, non0tab)?,
            ri: dot_ao_dm(cell, ao_im, dm_re, non0tab)?,
            ir: dot_ao_dm(cell, ao_re, dm_im, non0tab)?,
            ii: dot_ao_dm(cell, ao_im, dm_im, non0tab)?,
        })
    }

    /// `Re(ψ D braᴴ)` per point.
    fn combine(&self, bra_re: &DMatrix<f64>, bra_im: &DMatrix<f64>) -> DVector<f64> {
        row_dot(bra_im, &self.ri) + row_dot(bra_re, &self.rr) + row_dot(bra_im, &self.ir)
            - row_dot(bra_re, &self.ii)
    }
}

/// Density `Re(ψ D ψᴴ)` of shape `(1 or 4, ngrids)`.
///
/// Gradient rows are `2 Re(∂ψ D ψᴴ)`, the derivative of the value row for
/// Hermitian `D`.
pub fn eval_rho(
    cell: &Cell,
    ao: &AoValues<Complex64>,
    dm: &DMatrix<Complex64>,
    non0tab: Option<&Non0Tab>,
    isgga: bool,
) -> Result<DMatrix<f64>> {
    check_deriv(ao, isgga)?;
    check_dm(dm, cell.nao())?;
    let ngrids = ao.ngrids();
    let tab = non0tab_or_all(non0tab, ngrids, cell.nbas());

    let dm_re = dm.map(|z| z.re);
    let dm_im = dm.map(|z| z.im);
    let (ao_re, ao_im) = ao.split(0);
    let c0 = PartialContractions::new(cell, &ao_re, &ao_im, &dm_re, &dm_im, &tab)?;

    let nrows = if isgga { 4 } else { 1 };
    let mut rho = DMatrix::zeros(nrows, ngrids);
    rho.set_row(0, &c0.combine(&ao_re, &ao_im).transpose());
    for i in 1..nrows {
        let (g_re, g_im) = ao.split(i);
        rho.set_row(i, &(c0.combine(&g_re, &g_im) * 2.0).transpose());
    }
    Ok(rho)
}

#[cfg(test)]
mod tests {
    use super::*;
    use basis::cgto::Shell;
    use nalgebra::Vector3;

    fn pair_cell() -> Cell {
        let mut cell = Cell::from_lattice_rows(
            [[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]],
            [0, 0, 0],
        );
        cell.push_shell(Shell::new(0, Vector3::zeros(), &[1.0], &[1.0]));
        cell.push_shell(Shell::new(0, Vector3::new(1.0, 0.0, 0.0), &[1.0], &[1.0]));
        cell
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_real_orbitals_with_off_diagonal_dm() {
        let cell = pair_cell();
        let ao = AoValues::from_value(DMatrix::from_row_slice(1, 2, &[c(1.0, 0.0), c(2.0, 0.0)]));
        let dm = DMatrix::from_row_slice(
            2,
            2,
            &[c(0.0, 0.0), c(1.0, 2.0), c(1.0, -2.0), c(0.0, 0.0)],
        );
        let rho = eval_rho(&cell, &ao, &dm, None, false).unwrap();
        assert_eq!(rho.shape(), (1, 1));
        assert!((rho[(0, 0)] - 4.0).abs() < 1e-14);
    }

    #[test]
    fn test_complex_orbitals_match_dense_product() {
        let cell = pair_cell();
        let psi = [c(0.3, -0.8), c(-1.1, 0.4)];
        let ao = AoValues::from_value(DMatrix::from_row_slice(1, 2, &psi));
        let dm = DMatrix::from_row_slice(
            2,
            2,
            &[c(0.7, 0.0), c(0.2, 0.5), c(0.2, -0.5), c(1.3, 0.0)],
        );
        let rho = eval_rho(&cell, &ao, &dm, None, false).unwrap();

        let row = ao.value().row(0);
        let dense = (row * &dm * row.adjoint())[(0, 0)];
        assert!(dense.im.abs() < 1e-14);
        assert!((rho[(0, 0)] - dense.re).abs() < 1e-14);
    }

    #[test]
    fn test_gga_needs_gradient_components() {
        let cell = pair_cell();
        let ao = AoValues::from_value(DMatrix::from_element(3, 2, c(1.0, 0.0)));
        let dm = DMatrix::identity(2, 2);
        assert!(eval_rho(&cell, &ao, &dm, None, true).is_err());
    }

    #[test]
    fn test_non_square_dm_is_a_shape_error() {
        let cell = pair_cell();
        let ao = AoValues::from_value(DMatrix::from_element(1, 2, c(1.0, 0.0)));
        let dm = DMatrix::from_element(2, 3, c(1.0, 0.0));
        let err = eval_rho(&cell, &ao, &dm, None, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::error::NumIntError>(),
            Some(crate::error::NumIntError::ShapeMismatch(_))
        ));
    }
}
