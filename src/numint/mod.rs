//! Grid integration layer shared by the molecular and periodic integrators.
//!
//! [`NumInt`] is the interface the XC drivers call back into. The molecular
//! implementation lives in [`mol`]; the k-point implementation in
//! [`crate::pbc::kpt`].

pub mod dot;
pub mod driver;
pub mod mol;
pub mod xc;

use crate::error::NumIntError;
use basis::{Cell, Non0Tab};
use color_eyre::eyre::{ensure, Result};
use nalgebra::{ComplexField, DMatrix, DVector, Scalar, Vector3};
use num_complex::Complex64;

pub use xc::{XcFunctional, XcOutput};

/// AO values on a set of grid points.
///
/// Component 0 holds the values, components 1..=3 the x, y, z gradients
/// when present. Every component is `(ngrids, nao)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AoValues<T: Scalar> {
    comps: Vec<DMatrix<T>>,
}

impl<T: Scalar> AoValues<T> {
    /// Wraps one (values) or four (values + gradient) equally shaped components.
    pub fn new(comps: Vec<DMatrix<T>>) -> Result<Self> {
        ensure!(
            comps.len() == 1 || comps.len() == 4,
            NumIntError::ShapeMismatch(format!(
                "AO values need 1 or 4 components, got {}",
                comps.len()
            ))
        );
        let shape = comps[0].shape();
        ensure!(
            comps.iter().all(|c| c.shape() == shape),
            NumIntError::ShapeMismatch("AO components differ in shape".to_string())
        );
        Ok(AoValues { comps })
    }

    pub fn from_value(value: DMatrix<T>) -> Self {
        AoValues { comps: vec![value] }
    }

    pub fn value(&self) -> &DMatrix<T> {
        &self.comps[0]
    }

    pub fn component(&self, i: usize) -> &DMatrix<T> {
        &self.comps[i]
    }

    pub fn components(&self) -> &[DMatrix<T>] {
        &self.comps
    }

    pub fn has_gradient(&self) -> bool {
        self.comps.len() == 4
    }

    pub fn ngrids(&self) -> usize {
        self.comps[0].nrows()
    }

    pub fn nao(&self) -> usize {
        self.comps[0].ncols()
    }
}

impl AoValues<f64> {
    pub fn zeros(ngrids: usize, nao: usize, deriv: bool) -> Self {
        let ncomp = if deriv { 4 } else { 1 };
        AoValues {
            comps: vec![DMatrix::zeros(ngrids, nao); ncomp],
        }
    }

    pub fn to_complex(&self) -> AoValues<Complex64> {
        AoValues {
            comps: self.comps.iter().map(|c| c.map(|v| Complex64::new(v, 0.0))).collect(),
        }
    }
}

impl AoValues<Complex64> {
    pub fn zeros(ngrids: usize, nao: usize, deriv: bool) -> Self {
        let ncomp = if deriv { 4 } else { 1 };
        AoValues {
            comps: vec![DMatrix::from_element(ngrids, nao, Complex64::new(0.0, 0.0)); ncomp],
        }
    }

    /// True when no component carries an imaginary part.
    pub fn is_real(&self) -> bool {
        self.comps.iter().all(|c| c.iter().all(|z| z.im == 0.0))
    }

    /// Real and imaginary parts of component `i` as two real arrays.
    pub fn split(&self, i: usize) -> (DMatrix<f64>, DMatrix<f64>) {
        let c = &self.comps[i];
        (c.map(|z| z.re), c.map(|z| z.im))
    }

    pub fn real_part(&self) -> AoValues<f64> {
        AoValues {
            comps: self.comps.iter().map(|c| c.map(|z| z.re)).collect(),
        }
    }

    /// Adds `phase * real` component-wise.
    pub(crate) fn accumulate(&mut self, real: &[DMatrix<f64>], phase: Complex64) {
        for (acc, r) in self.comps.iter_mut().zip(real) {
            acc.zip_apply(r, |z, v| *z += phase * v);
        }
    }

    pub(crate) fn add_assign(&mut self, other: &AoValues<Complex64>) {
        for (acc, o) in self.comps.iter_mut().zip(&other.comps) {
            *acc += o;
        }
    }
}

/// Quadrature points and weights handed to the XC drivers.
#[derive(Clone, Debug)]
pub struct Grids {
    pub coords: Vec<Vector3<f64>>,
    pub weights: DVector<f64>,
}

impl Grids {
    pub fn new(coords: Vec<Vector3<f64>>, weights: Vec<f64>) -> Result<Self> {
        ensure!(
            coords.len() == weights.len(),
            NumIntError::ShapeMismatch(format!(
                "{} grid points but {} weights",
                coords.len(),
                weights.len()
            ))
        );
        Ok(Grids {
            coords,
            weights: DVector::from_vec(weights),
        })
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Result of a restricted XC integration.
#[derive(Clone, Debug)]
pub struct RksVxc<T: Scalar> {
    /// Number of electrons integrated on the grid
    pub nelec: f64,
    /// XC energy
    pub exc: f64,
    /// XC potential matrix
    pub vmat: DMatrix<T>,
}

/// Result of a spin-unrestricted XC integration (alpha, beta).
#[derive(Clone, Debug)]
pub struct UksVxc<T: Scalar> {
    pub nelec: [f64; 2],
    pub exc: f64,
    pub vmat: [DMatrix<T>; 2],
}

/// Grid integrator interface called back by the XC drivers.
///
/// Every method is required. Integrators that do not support an entry point
/// must return [`NumIntError::Unsupported`] rather than approximate.
pub trait NumInt {
    /// Scalar type of AO values, density matrices and potential matrices.
    type Elem: ComplexField<RealField = f64>;

    /// AO values (and gradients when `deriv`) on `coords`.
    fn eval_ao(
        &self,
        cell: &Cell,
        coords: &[Vector3<f64>],
        deriv: bool,
        non0tab: Option<&Non0Tab>,
    ) -> Result<AoValues<Self::Elem>>;

    /// Density `(1 or 4, ngrids)` from AO values and a density matrix.
    fn eval_rho(
        &self,
        cell: &Cell,
        ao: &AoValues<Self::Elem>,
        dm: &DMatrix<Self::Elem>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<f64>>;

    /// Density from MO coefficients and occupations.
    fn eval_rho2(
        &self,
        cell: &Cell,
        ao: &AoValues<Self::Elem>,
        mo_coeff: &DMatrix<Self::Elem>,
        mo_occ: &DVector<f64>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<f64>>;

    /// XC potential matrix from the functional derivatives on the grid.
    #[allow(clippy::too_many_arguments)]
    fn eval_mat(
        &self,
        cell: &Cell,
        ao: &AoValues<Self::Elem>,
        weight: &DVector<f64>,
        rho: &DMatrix<f64>,
        vrho: &DVector<f64>,
        vsigma: Option<&DVector<f64>>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<Self::Elem>>;

    /// Restricted XC energy and potential.
    fn nr_rks(
        &self,
        cell: &Cell,
        grids: &Grids,
        xc: XcFunctional,
        dm: &DMatrix<Self::Elem>,
    ) -> Result<RksVxc<Self::Elem>>;

    /// Spin-unrestricted XC energy and potentials.
    fn nr_uks(
        &self,
        cell: &Cell,
        grids: &Grids,
        xc: XcFunctional,
        dms: &[DMatrix<Self::Elem>; 2],
    ) -> Result<UksVxc<Self::Elem>>;
}

/// Checks that AO values carry gradients when a GGA density is requested.
pub(crate) fn check_deriv<T: Scalar>(ao: &AoValues<T>, isgga: bool) -> Result<()> {
    ensure!(
        !isgga || ao.has_gradient(),
        NumIntError::ShapeMismatch("GGA evaluation needs AO gradients".to_string())
    );
    Ok(())
}

/// Density matrices must be `nao × nao`.
pub(crate) fn check_dm<T: Scalar>(dm: &DMatrix<T>, nao: usize) -> Result<()> {
    ensure!(
        dm.shape() == (nao, nao),
        NumIntError::ShapeMismatch(format!(
            "density matrix is {:?}, basis has {} AOs",
            dm.shape(),
            nao
        ))
    );
    Ok(())
}

/// `vsigma` of a GGA potential; its absence is a caller bug.
pub(crate) fn gga_vsigma<'a>(
    vsigma: Option<&'a DVector<f64>>,
    rho: &DMatrix<f64>,
) -> &'a DVector<f64> {
    match vsigma {
        Some(v) if rho.nrows() == 4 => v,
        _ => panic!("GGA potential matrix requires vsigma and a density with gradient rows"),
    }
}

/// Checks the per-point inputs of a potential-matrix evaluation.
pub(crate) fn check_potential_inputs(
    ngrids: usize,
    weight: &DVector<f64>,
    rho: &DMatrix<f64>,
    vrho: &DVector<f64>,
    vsigma: Option<&DVector<f64>>,
) -> Result<()> {
    ensure!(
        weight.len() == ngrids && vrho.len() == ngrids && rho.ncols() == ngrids,
        NumIntError::ShapeMismatch(format!(
            "{} grid points but weight {}, vrho {}, rho {} columns",
            ngrids,
            weight.len(),
            vrho.len(),
            rho.ncols()
        ))
    );
    if let Some(vs) = vsigma {
        ensure!(
            vs.len() == ngrids,
            NumIntError::ShapeMismatch(format!("{} grid points but vsigma {}", ngrids, vs.len()))
        );
    }
    Ok(())
}
