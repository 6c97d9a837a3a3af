//! Single k-point integrator plugged into the generic XC drivers.

use super::ao::ImageCutoff;
use crate::config::{NumIntConfig, DEFAULT_BLOCK_POINTS};
use crate::error::NumIntError;
use crate::numint::{driver, AoValues, Grids, NumInt, RksVxc, UksVxc, XcFunctional};
use basis::{Cell, Non0Tab};
use color_eyre::eyre::{bail, Result};
use nalgebra::{DMatrix, DVector, Vector3};
use num_complex::Complex64;

/// Grid integrator for Bloch orbitals at one k-point.
///
/// `kpt == None` is the Γ point. Only the restricted path is provided;
/// [`NumInt::eval_rho2`] and [`NumInt::nr_uks`] return
/// [`NumIntError::Unsupported`].
#[derive(Clone, Debug)]
pub struct KptNumInt {
    pub kpt: Option<Vector3<f64>>,
    pub image_cutoff: ImageCutoff,
    pub block_points: usize,
}

impl KptNumInt {
    pub fn new(kpt: Option<Vector3<f64>>) -> Self {
        KptNumInt {
            kpt,
            image_cutoff: ImageCutoff::default(),
            block_points: DEFAULT_BLOCK_POINTS,
        }
    }

    pub fn gamma() -> Self {
        Self::new(None)
    }

    /// Integrator with the image cutoff and block size of `config`.
    pub fn from_config(config: &NumIntConfig, kpt: Option<Vector3<f64>>) -> Result<Self> {
        let config = config.clone().with_defaults();
        config.validate()?;
        Ok(KptNumInt {
            kpt,
            image_cutoff: config.image_cutoff.unwrap_or_default(),
            block_points: config.block_points.unwrap_or(DEFAULT_BLOCK_POINTS),
        })
    }
}

impl Default for KptNumInt {
    fn default() -> Self {
        Self::gamma()
    }
}

impl NumInt for KptNumInt {
    type Elem = Complex64;

    fn eval_ao(
        &self,
        cell: &Cell,
        coords: &[Vector3<f64>],
        deriv: bool,
        non0tab: Option<&Non0Tab>,
    ) -> Result<AoValues<Complex64>> {
        super::ao::eval_ao(cell, coords, self.kpt.as_ref(), deriv, non0tab, self.image_cutoff)
    }

    fn eval_rho(
        &self,
        cell: &Cell,
        ao: &AoValues<Complex64>,
        dm: &DMatrix<Complex64>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<f64>> {
        super::rho::eval_rho(cell, ao, dm, non0tab, isgga)
    }

    fn eval_rho2(
        &self,
        _cell: &Cell,
        _ao: &AoValues<Complex64>,
        _mo_coeff: &DMatrix<Complex64>,
        _mo_occ: &DVector<f64>,
        _non0tab: Option<&Non0Tab>,
        _isgga: bool,
    ) -> Result<DMatrix<f64>> {
        bail!(NumIntError::Unsupported("k-point density from MO coefficients"))
    }

    fn eval_mat(
        &self,
        cell: &Cell,
        ao: &AoValues<Complex64>,
        weight: &DVector<f64>,
        rho: &DMatrix<f64>,
        vrho: &DVector<f64>,
        vsigma: Option<&DVector<f64>>,
        non0tab: Option<&Non0Tab>,
        isgga: bool,
    ) -> Result<DMatrix<Complex64>> {
        super::mat::eval_mat(cell, ao, weight, rho, vrho, vsigma, non0tab, isgga)
    }

    fn nr_rks(
        &self,
        cell: &Cell,
        grids: &Grids,
        xc: XcFunctional,
        dm: &DMatrix<Complex64>,
    ) -> Result<RksVxc<Complex64>> {
        driver::nr_rks_vxc(self, cell, grids, xc, dm, self.block_points)
    }

    fn nr_uks(
        &self,
        _cell: &Cell,
        _grids: &Grids,
        _xc: XcFunctional,
        _dms: &[DMatrix<Complex64>; 2],
    ) -> Result<UksVxc<Complex64>> {
        bail!(NumIntError::Unsupported("spin-unrestricted k-point XC integration"))
    }
}
