#[cfg(test)]
mod tests {
    use crate::basis::Basis;
    use crate::gto::{GTO1d, GTO};
    use crate::helper::*;
    use nalgebra::Vector3;
    use rand::Rng;
    use rand_distr::{Distribution, Uniform};

    #[test]
    fn test_gto1d_normalization() {
        let gto = GTO1d::new(1.0, 2, 1.0);
        let integral = simpson_integration(|x| gto.evaluate(x).powi(2), -10.0, 10.0, 10_000);
        let diff = (integral - 1.0).abs();
        assert!(diff < 1e-5, "Integral is not close to 1: got {}", integral);
    }

    #[test]
    fn test_gto1d_overlap() {
        let gto1 = GTO1d::new(1.2, 1, 1.0);
        let gto2 = GTO1d::new(0.8, 1, 3.0);
        let integral =
            simpson_integration(|x| gto1.evaluate(x) * gto2.evaluate(x), -10.0, 10.0, 10_000);
        let overlap = GTO1d::Sab(&gto1, &gto2);
        assert!(
            (integral - overlap).abs() < 1e-5,
            "Overlap is not close to integral: got {}",
            overlap
        );
    }

    #[test]
    fn test_gto1d_derivative() {
        let h = 1e-6;
        for l in 0..3 {
            let gto = GTO1d::new(0.8, l, 0.5);
            for &x in &[-1.3, 0.2, 0.5, 1.7] {
                let numerical = (gto.evaluate(x + h) - gto.evaluate(x - h)) / (2.0 * h);
                let analytical = gto.derivative(x);
                assert!(
                    (numerical - analytical).abs() < 1e-7,
                    "l = {}, x = {}: numerical = {}, analytical = {}",
                    l,
                    x,
                    numerical,
                    analytical
                );
            }
        }
    }

    #[test]
    fn test_gto_normalization() {
        let gto = GTO::new(1.0, Vector3::new(1, 1, 1), Vector3::new(0.0, 0.0, 0.0));
        let integrand = |x, y, z| gto.evaluate(&Vector3::new(x, y, z)).powi(2);

        let lower = Vector3::new(-10.0, -10.0, -10.0);
        let upper = Vector3::new(10.0, 10.0, 10.0);
        let integral = simpson_integration_3d(integrand, lower, upper, 100, 100, 100);
        let diff = (integral - 1.0).abs();
        assert!(diff < 1e-5, "Integral is not close to 1: got {}", integral);
    }

    #[test]
    fn test_gto_overlap() {
        let gto1 = GTO::new(1.2, Vector3::new(1, 0, 1), Vector3::new(0.0, 0.0, 0.0));
        let gto2 = GTO::new(0.8, Vector3::new(1, 1, 0), Vector3::new(0.5, 0.3, 0.2));
        let integrand =
            |x, y, z| gto1.evaluate(&Vector3::new(x, y, z)) * gto2.evaluate(&Vector3::new(x, y, z));

        let lower = Vector3::new(-8.0, -8.0, -8.0);
        let upper = Vector3::new(8.0, 8.0, 8.0);
        let integral = simpson_integration_3d(integrand, lower, upper, 100, 100, 100);
        let overlap = GTO::Sab(&gto1, &gto2);
        assert!(
            (integral - overlap).abs() < 1e-5,
            "Overlap is not close to integral: got {}, expected {}",
            overlap,
            integral
        );
    }

    #[test]
    fn test_gto_gradient_random_points() {
        let mut rng = rand::thread_rng();
        let dist = Uniform::new(-1.5, 1.5);
        let h = 1e-6;

        for _ in 0..20 {
            let l_xyz = Vector3::new(rng.gen_range(0..3), rng.gen_range(0..3), rng.gen_range(0..3));
            let center = Vector3::new(
                dist.sample(&mut rng),
                dist.sample(&mut rng),
                dist.sample(&mut rng),
            );
            let gto = GTO::new(rng.gen_range(0.3..2.0), l_xyz, center);
            let r = Vector3::new(
                dist.sample(&mut rng),
                dist.sample(&mut rng),
                dist.sample(&mut rng),
            );

            let (value, grad) = gto.value_and_gradient(&r);
            assert!((value - gto.evaluate(&r)).abs() < 1e-14);
            for d in 0..3 {
                let mut rp = r;
                let mut rm = r;
                rp[d] += h;
                rm[d] -= h;
                let numerical = (gto.evaluate(&rp) - gto.evaluate(&rm)) / (2.0 * h);
                assert!(
                    (numerical - grad[d]).abs() < 1e-6,
                    "l_xyz = {:?}, component {}: numerical = {}, analytical = {}",
                    l_xyz,
                    d,
                    numerical,
                    grad[d]
                );
            }
        }
    }
}
