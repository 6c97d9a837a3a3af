//! Crystal orbitals: real AOs summed over lattice images with a Bloch phase.

use crate::numint::AoValues;
use basis::{Cell, Non0Tab};
use color_eyre::eyre::Result;
use itertools::iproduct;
use nalgebra::Vector3;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Which integer translations `T ∈ [-n, n]³` enter the image sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageCutoff {
    /// Keep `|T|² ≤ fraction · (n · n)`.
    Sphere { fraction: f64 },
    /// Keep the whole box.
    Box,
}

impl Default for ImageCutoff {
    fn default() -> Self {
        ImageCutoff::Sphere {
            fraction: 1.0 / 3.0,
        }
    }
}

/// Integer image indices for per-direction repeat counts `nimgs`.
///
/// Negative counts are treated as zero; the origin is always included.
pub fn lattice_images(nimgs: [i32; 3], cutoff: ImageCutoff) -> Vec<Vector3<i32>> {
    let n = nimgs.map(|x| x.max(0));
    let nn = n.iter().map(|&x| f64::from(x * x)).sum::<f64>();
    iproduct!(-n[0]..=n[0], -n[1]..=n[1], -n[2]..=n[2])
        .map(|(i, j, k)| Vector3::new(i, j, k))
        .filter(|t| match cutoff {
            ImageCutoff::Sphere { fraction } => {
                *t == Vector3::zeros() || f64::from(t.dot(t)) <= fraction * nn
            }
            ImageCutoff::Box => true,
        })
        .collect()
}

/// `exp(i k·L)`, exactly one at the Γ point.
pub fn bloch_phase(kpt: Option<&Vector3<f64>>, translation: &Vector3<f64>) -> Complex64 {
    match kpt {
        Some(k) => Complex64::new(0.0, k.dot(translation)).exp(),
        None => Complex64::new(1.0, 0.0),
    }
}

/// Complex AO values `Σ_L exp(i k·L) φ(r - L)` on `coords`.
///
/// With `deriv` the three gradient components are summed with the same
/// phase. Errors from the real-space evaluator are returned unchanged.
pub fn eval_ao(
    cell: &Cell,
    coords: &[Vector3<f64>],
    kpt: Option<&Vector3<f64>>,
    deriv: bool,
    non0tab: Option<&Non0Tab>,
    cutoff: ImageCutoff,
) -> Result<AoValues<Complex64>> {
    let images = lattice_images(cell.nimgs, cutoff);
    let (ngrids, nao) = (coords.len(), cell.nao());
    tracing::debug!(
        "periodic eval_ao: {} images, {} points, {} AOs",
        images.len(),
        ngrids,
        nao
    );

    images
        .par_iter()
        .try_fold(
            || AoValues::<Complex64>::zeros(ngrids, nao, deriv),
            |mut acc, image| -> Result<_> {
                let l = cell.translation(image);
                let shifted: Vec<Vector3<f64>> = coords.iter().map(|r| r - l).collect();
                let real = cell.eval_gto(&shifted, deriv, non0tab)?;
                acc.accumulate(&real, bloch_phase(kpt, &l));
                Ok(acc)
            },
        )
        .try_reduce(
            || AoValues::<Complex64>::zeros(ngrids, nao, deriv),
            |mut a, b| {
                a.add_assign(&b);
                Ok(a)
            },
        )
}
