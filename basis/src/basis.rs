#![allow(non_snake_case)]
use nalgebra::Vector3;

/// A real-valued basis function that can be collocated on grid points.
pub trait Basis {
    fn evaluate(&self, r: &Vector3<f64>) -> f64;

    /// Analytic gradient with respect to the electron coordinate `r`.
    fn gradient(&self, r: &Vector3<f64>) -> Vector3<f64>;

    // overlap integral <a|b>
    fn Sab(a: &Self, b: &Self) -> f64
    where
        Self: Sized;
}
