//! XC energy and potential drivers.
//!
//! Both drivers walk the grid in blocks and call back into a [`NumInt`] for
//! every AO, density and potential evaluation, so any integrator (real or
//! k-point) can be plugged in.

use super::{check_dm, Grids, NumInt, RksVxc, UksVxc, XcFunctional};
use basis::{Cell, BLKSIZE};
use color_eyre::eyre::{Result, WrapErr};
use nalgebra::{DMatrix, DVector, Vector3};

/// Block length rounded up to a whole number of screening blocks.
fn block_len(block_points: usize) -> usize {
    block_points.max(1).div_ceil(BLKSIZE) * BLKSIZE
}

/// Consecutive `(coords, weights)` slices of at most `block` points.
fn grid_blocks(
    grids: &Grids,
    block: usize,
) -> impl Iterator<Item = (&[Vector3<f64>], DVector<f64>)> + '_ {
    (0..grids.len()).step_by(block).map(move |p0| {
        let np = block.min(grids.len() - p0);
        (
            &grids.coords[p0..p0 + np],
            grids.weights.rows(p0, np).into_owned(),
        )
    })
}

/// Restricted XC integration: electron count, XC energy and potential matrix.
pub fn nr_rks_vxc<N: NumInt + ?Sized>(
    ni: &N,
    cell: &Cell,
    grids: &Grids,
    xc: XcFunctional,
    dm: &DMatrix<N::Elem>,
    block_points: usize,
) -> Result<RksVxc<N::Elem>> {
    let nao = cell.nao();
    check_dm(dm, nao)?;
    let isgga = xc.is_gga();
    let block = block_len(block_points);
    tracing::debug!(
        "nr_rks: {} grid points in blocks of {}, GGA = {}",
        grids.len(),
        block,
        isgga
    );

    let mut nelec = 0.0;
    let mut exc = 0.0;
    let mut vmat = DMatrix::<N::Elem>::zeros(nao, nao);
    for (ib, (coords, weight)) in grid_blocks(grids, block).enumerate() {
        let ao = ni.eval_ao(cell, coords, isgga, None)?;
        let rho = ni
            .eval_rho(cell, &ao, dm, None, isgga)
            .wrap_err_with(|| format!("density evaluation failed in block {}", ib))?;
        let out = xc.eval_xc(&rho)?;

        let rho0 = rho.row(0).transpose();
        let den = weight.component_mul(&rho0);
        nelec += den.sum();
        exc += den.dot(&out.exc);
        vmat += ni.eval_mat(
            cell,
            &ao,
            &weight,
            &rho,
            &out.vrho,
            out.vsigma.as_ref(),
            None,
            isgga,
        )?;
        tracing::trace!("block {}: {} points", ib, coords.len());
    }

    tracing::info!("nr_rks: nelec = {:.8}, exc = {:.10}", nelec, exc);
    Ok(RksVxc { nelec, exc, vmat })
}

/// Spin-unrestricted XC integration with alpha and beta density matrices.
pub fn nr_uks_vxc<N: NumInt + ?Sized>(
    ni: &N,
    cell: &Cell,
    grids: &Grids,
    xc: XcFunctional,
    dms: &[DMatrix<N::Elem>; 2],
    block_points: usize,
) -> Result<UksVxc<N::Elem>> {
    let nao = cell.nao();
    for dm in dms {
        check_dm(dm, nao)?;
    }
    let isgga = xc.is_gga();
    let block = block_len(block_points);
    tracing::debug!("nr_uks: {} grid points in blocks of {}", grids.len(), block);

    let mut nelec = [0.0; 2];
    let mut exc = 0.0;
    let mut vmat = [
        DMatrix::<N::Elem>::zeros(nao, nao),
        DMatrix::<N::Elem>::zeros(nao, nao),
    ];
    for (coords, weight) in grid_blocks(grids, block) {
        let ao = ni.eval_ao(cell, coords, isgga, None)?;
        let rho = [
            ni.eval_rho(cell, &ao, &dms[0], None, isgga)?,
            ni.eval_rho(cell, &ao, &dms[1], None, isgga)?,
        ];
        let outs = xc.eval_xc_polarized(&rho[0], &rho[1])?;

        for s in 0..2 {
            let den = weight.component_mul(&rho[s].row(0).transpose());
            nelec[s] += den.sum();
            exc += den.dot(&outs[s].exc);
            vmat[s] += ni.eval_mat(
                cell,
                &ao,
                &weight,
                &rho[s],
                &outs[s].vrho,
                outs[s].vsigma.as_ref(),
                None,
                isgga,
            )?;
        }
    }

    tracing::info!(
        "nr_uks: nelec = ({:.8}, {:.8}), exc = {:.10}",
        nelec[0],
        nelec[1],
        exc
    );
    Ok(UksVxc { nelec, exc, vmat })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NumIntError;
    use crate::numint::mol::MolNumInt;
    use basis::cgto::Shell;
    use basis::helper::simpson_nodes_3d;

    fn one_center_cell() -> Cell {
        let mut cell = Cell::from_lattice_rows(
            [[10.0, 0.0, 0.0], [0.0, 10.0, 0.0], [0.0, 0.0, 10.0]],
            [0, 0, 0],
        );
        cell.push_shell(Shell::new(0, Vector3::zeros(), &[0.8], &[1.0]));
        cell.push_shell(Shell::new(0, Vector3::zeros(), &[0.3], &[1.0]));
        cell
    }

    fn cube_grid(n: usize) -> Grids {
        let (coords, weights): (Vec<_>, Vec<_>) = simpson_nodes_3d(
            Vector3::new(-6.0, -6.0, -6.0),
            Vector3::new(6.0, 6.0, 6.0),
            n,
            n,
            n,
        )
        .into_iter()
        .unzip();
        Grids::new(coords, weights).unwrap()
    }

    #[test]
    fn test_block_len_rounds_up() {
        assert_eq!(block_len(0), BLKSIZE);
        assert_eq!(block_len(BLKSIZE), BLKSIZE);
        assert_eq!(block_len(BLKSIZE + 1), 2 * BLKSIZE);
    }

    #[test]
    fn test_nelec_counts_normalized_density() {
        let cell = one_center_cell();
        let grids = cube_grid(40);
        let dm = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 0.0]);
        let ni = MolNumInt::default();
        let out = ni.nr_rks(&cell, &grids, XcFunctional::LdaX, &dm).unwrap();
        assert!((out.nelec - 2.0).abs() < 1e-4, "nelec = {}", out.nelec);
        assert!(out.exc < 0.0);
        assert_eq!(out.vmat, out.vmat.transpose());
    }

    #[test]
    fn test_result_does_not_depend_on_block_size() {
        let cell = one_center_cell();
        let grids = cube_grid(20);
        let dm = DMatrix::from_row_slice(2, 2, &[1.0, 0.3, 0.3, 0.5]);
        let small = MolNumInt { block_points: 1 };
        let large = MolNumInt { block_points: 100_000 };
        for xc in [XcFunctional::LdaX, XcFunctional::PbeX] {
            let a = small.nr_rks(&cell, &grids, xc, &dm).unwrap();
            let b = large.nr_rks(&cell, &grids, xc, &dm).unwrap();
            assert!((a.nelec - b.nelec).abs() < 1e-10);
            assert!((a.exc - b.exc).abs() < 1e-10);
            assert!((a.vmat - b.vmat).abs().max() < 1e-10);
        }
    }

    #[test]
    fn test_uks_closed_shell_matches_rks() {
        let cell = one_center_cell();
        let grids = cube_grid(20);
        let dm = DMatrix::from_row_slice(2, 2, &[1.0, 0.2, 0.2, 0.6]);
        let half = &dm * 0.5;
        let ni = MolNumInt::default();
        for xc in [XcFunctional::LdaX, XcFunctional::PbeX] {
            let rks = ni.nr_rks(&cell, &grids, xc, &dm).unwrap();
            let uks = ni.nr_uks(&cell, &grids, xc, &[half.clone(), half.clone()]).unwrap();
            assert!((uks.nelec[0] + uks.nelec[1] - rks.nelec).abs() < 1e-10);
            assert!((uks.exc - rks.exc).abs() < 1e-10);
            assert!((&uks.vmat[0] - &rks.vmat).abs().max() < 1e-10);
            assert_eq!(uks.vmat[0], uks.vmat[1]);
        }
    }

    #[test]
    fn test_wrong_density_matrix_shape() {
        let cell = one_center_cell();
        let grids = cube_grid(4);
        let dm = DMatrix::identity(3, 3);
        let err = MolNumInt::default()
            .nr_rks(&cell, &grids, XcFunctional::LdaX, &dm)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<NumIntError>(),
            Some(NumIntError::ShapeMismatch(_))
        ));
    }
}
