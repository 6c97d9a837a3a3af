//! Exchange functionals evaluated point-wise on a density grid.
//!
//! Only exchange is provided: Slater (LDA) and PBE exchange. Both are
//! expressed in terms of ρ and σ = |∇ρ|², returning the energy per particle
//! and the derivatives of the energy density ρ·ε with respect to ρ and σ.

use crate::error::NumIntError;
use color_eyre::eyre::{ensure, Result};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Densities at or below this value contribute nothing.
const RHO_THRESHOLD: f64 = 1e-14;

const PBE_KAPPA: f64 = 0.804;
const PBE_MU: f64 = 0.219_514_972_764_517_1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XcFunctional {
    /// Local-density approximation exchange only (Slater exchange)
    LdaX,
    /// PBE GGA exchange only (no correlation)
    PbeX,
}

/// Point-wise functional values for one spin channel (or the total density).
#[derive(Clone, Debug, PartialEq)]
pub struct XcOutput {
    /// Energy per particle
    pub exc: DVector<f64>,
    /// ∂(ρε)/∂ρ
    pub vrho: DVector<f64>,
    /// ∂(ρε)/∂σ, GGA only
    pub vsigma: Option<DVector<f64>>,
}

#[inline]
fn c_x() -> f64 {
    -0.75 * (3.0 / PI).powf(1.0 / 3.0)
}

/// Slater exchange: (e per volume, de/dρ).
fn lda_x(rho: f64) -> (f64, f64) {
    let rho13 = rho.cbrt();
    (c_x() * rho * rho13, (4.0 / 3.0) * c_x() * rho13)
}

/// PBE exchange: (e per volume, de/dρ, de/dσ).
///
/// Uses the squared reduced gradient s² = σ / (2 (3π²)^(1/3) ρ^(4/3))².
fn pbe_x(rho: f64, sigma: f64) -> (f64, f64, f64) {
    let (e_lda, de_lda) = lda_x(rho);
    let c = 2.0 * (3.0 * PI * PI).cbrt();
    let denom2 = c * c * rho.powf(8.0 / 3.0);
    let s2 = sigma / denom2;

    let t = 1.0 + (PBE_MU / PBE_KAPPA) * s2;
    let fx = 1.0 + PBE_KAPPA - PBE_KAPPA / t;
    let dfx_ds2 = PBE_MU / (t * t);

    let de_drho = de_lda * fx + e_lda * dfx_ds2 * (-(8.0 / 3.0) * s2 / rho);
    let de_dsigma = e_lda * dfx_ds2 / denom2;
    (e_lda * fx, de_drho, de_dsigma)
}

impl XcFunctional {
    pub fn is_gga(&self) -> bool {
        matches!(self, XcFunctional::PbeX)
    }

    /// Unpolarized evaluation on `rho` of shape `(1 or 4, ngrids)`.
    ///
    /// GGA functionals need the three gradient rows.
    pub fn eval_xc(&self, rho: &DMatrix<f64>) -> Result<XcOutput> {
        let ngrids = rho.ncols();
        ensure!(
            rho.nrows() == 1 || rho.nrows() == 4,
            NumIntError::ShapeMismatch(format!("density has {} rows, expected 1 or 4", rho.nrows()))
        );
        ensure!(
            !self.is_gga() || rho.nrows() == 4,
            NumIntError::ShapeMismatch("GGA functional needs density gradients".to_string())
        );

        let mut exc = DVector::zeros(ngrids);
        let mut vrho = DVector::zeros(ngrids);
        let mut vsigma = self.is_gga().then(|| DVector::zeros(ngrids));

        for p in 0..ngrids {
            let r = rho[(0, p)];
            if r <= RHO_THRESHOLD {
                continue;
            }
            match self {
                XcFunctional::LdaX => {
                    let (e, de) = lda_x(r);
                    exc[p] = e / r;
                    vrho[p] = de;
                }
                XcFunctional::PbeX => {
                    let sigma = rho[(1, p)].powi(2) + rho[(2, p)].powi(2) + rho[(3, p)].powi(2);
                    let (e, de_drho, de_dsigma) = pbe_x(r, sigma);
                    exc[p] = e / r;
                    vrho[p] = de_drho;
                    if let Some(vs) = vsigma.as_mut() {
                        vs[p] = de_dsigma;
                    }
                }
            }
        }
        Ok(XcOutput { exc, vrho, vsigma })
    }

    /// Spin-polarized evaluation via exchange spin scaling,
    /// E[ρα, ρβ] = ½E[2ρα] + ½E[2ρβ].
    ///
    /// `exc` of each channel is per particle of that channel, so the energy
    /// is `Σ_s Σ_p w ρ_s ε_s`. `vsigma` is with respect to σ_ss.
    pub fn eval_xc_polarized(
        &self,
        rho_a: &DMatrix<f64>,
        rho_b: &DMatrix<f64>,
    ) -> Result<[XcOutput; 2]> {
        ensure!(
            rho_a.shape() == rho_b.shape(),
            NumIntError::ShapeMismatch(format!(
                "alpha density is {:?}, beta density is {:?}",
                rho_a.shape(),
                rho_b.shape()
            ))
        );
        let channel = |rho: &DMatrix<f64>| -> Result<XcOutput> {
            let mut out = self.eval_xc(&(rho * 2.0))?;
            if let Some(vs) = out.vsigma.as_mut() {
                *vs *= 2.0;
            }
            Ok(out)
        };
        Ok([channel(rho_a)?, channel(rho_b)?])
    }
}
