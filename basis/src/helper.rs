use itertools::iproduct;
use nalgebra::Vector3;
use rayon::prelude::*;

// Simpson's rule integration
pub fn simpson_integration<F>(f: F, a: f64, b: f64, n: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if n % 2 == 0 { n } else { n + 1 };
    let h = (b - a) / n as f64;

    let mut sum = f(a) + f(b);
    for i in 1..n {
        let x = a + i as f64 * h;
        sum += if i % 2 == 0 { 2.0 * f(x) } else { 4.0 * f(x) };
    }
    sum * h / 3.0
}

// Simpson's weight for index i out of n intervals
fn simpson_weight(i: usize, n: usize) -> f64 {
    if i == 0 || i == n {
        1.0
    } else if i % 2 == 1 {
        4.0
    } else {
        2.0
    }
}

fn even(n: usize) -> usize {
    if n % 2 == 0 {
        n
    } else {
        n + 1
    }
}

/// Parallel Simpson's rule integration over the box [a, b].
///
/// nx, ny, nz are the number of subdivisions, rounded up to even.
pub fn simpson_integration_3d<F>(
    f: F,
    a: Vector3<f64>,
    b: Vector3<f64>,
    nx: usize,
    ny: usize,
    nz: usize,
) -> f64
where
    F: Fn(f64, f64, f64) -> f64 + Sync,
{
    simpson_nodes_3d(a, b, nx, ny, nz)
        .par_iter()
        .map(|(r, w)| w * f(r.x, r.y, r.z))
        .sum()
}

/// Simpson quadrature nodes and weights over the box [a, b], x fastest.
///
/// The weights already carry the hx*hy*hz/27 factor, so that
/// sum_p w_p f(r_p) approximates the integral of f.
pub fn simpson_nodes_3d(
    a: Vector3<f64>,
    b: Vector3<f64>,
    nx: usize,
    ny: usize,
    nz: usize,
) -> Vec<(Vector3<f64>, f64)> {
    let (nx, ny, nz) = (even(nx), even(ny), even(nz));
    let h = Vector3::new(
        (b.x - a.x) / nx as f64,
        (b.y - a.y) / ny as f64,
        (b.z - a.z) / nz as f64,
    );
    let scale = h.x * h.y * h.z / 27.0;

    iproduct!(0..=nz, 0..=ny, 0..=nx)
        .map(|(k, j, i)| {
            let r = Vector3::new(
                a.x + i as f64 * h.x,
                a.y + j as f64 * h.y,
                a.z + k as f64 * h.z,
            );
            let w = simpson_weight(i, nx) * simpson_weight(j, ny) * simpson_weight(k, nz);
            (r, w * scale)
        })
        .collect()
}
