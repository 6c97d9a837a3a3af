//! Periodic cell: lattice, atoms, and the shells of the AO basis.

use crate::basis::Basis;
use crate::cgto::{parse_nwchem, Shell};
use crate::error::BasisError;
use crate::non0tab::{Non0Tab, BLKSIZE};
use nalgebra::{DMatrix, Matrix3, Vector3};
use periodic_table_on_an_enum::Element;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct Atom {
    pub symbol: String,
    pub atomic_number: u32,
    pub position: Vector3<f64>,
}

#[derive(Debug, Clone)]
pub struct Cell {
    /// Lattice vectors as columns, in bohr.
    pub lattice: Matrix3<f64>,
    /// Number of periodic repeats considered along each lattice direction.
    pub nimgs: [i32; 3],
    pub atoms: Vec<Atom>,
    pub shells: Vec<Shell>,
}

impl Cell {
    pub fn new(lattice: Matrix3<f64>, nimgs: [i32; 3]) -> Self {
        Cell {
            lattice,
            nimgs,
            atoms: Vec::new(),
            shells: Vec::new(),
        }
    }

    /// Lattice given as three row vectors a1, a2, a3.
    pub fn from_lattice_rows(rows: [[f64; 3]; 3], nimgs: [i32; 3]) -> Self {
        let lattice = Matrix3::from_fn(|i, j| rows[j][i]);
        Cell::new(lattice, nimgs)
    }

    /// Adds an atom and the shells parsed from its NWChem basis block.
    pub fn add_atom(
        &mut self,
        symbol: &str,
        position: Vector3<f64>,
        nwchem: &str,
    ) -> Result<(), BasisError> {
        let element = Element::from_symbol(symbol)
            .ok_or_else(|| BasisError::UnknownElement(symbol.to_string()))?;
        let shells = parse_nwchem(nwchem, position)?;
        self.atoms.push(Atom {
            symbol: element.get_symbol().to_string(),
            atomic_number: element.get_atomic_number() as u32,
            position,
        });
        self.shells.extend(shells);
        Ok(())
    }

    pub fn push_shell(&mut self, shell: Shell) {
        self.shells.push(shell);
    }

    pub fn nbas(&self) -> usize {
        self.shells.len()
    }

    pub fn nao(&self) -> usize {
        self.shells.iter().map(|s| s.nfunctions()).sum()
    }

    /// AO offset of every shell, with the total as the last entry.
    pub fn ao_loc(&self) -> Vec<usize> {
        let mut loc = Vec::with_capacity(self.shells.len() + 1);
        let mut off = 0;
        loc.push(off);
        for shell in &self.shells {
            off += shell.nfunctions();
            loc.push(off);
        }
        loc
    }

    /// Real-space translation L = lattice * T of an integer image index.
    pub fn translation(&self, image: &Vector3<i32>) -> Vector3<f64> {
        self.lattice * image.map(|i| i as f64)
    }

    /// Collocates the real AO basis on `coords`.
    ///
    /// Returns one `(ngrids, nao)` matrix of values, or four (value, d/dx,
    /// d/dy, d/dz) when `deriv` is set. Shells masked off in a block are
    /// left as zeros.
    pub fn eval_gto(
        &self,
        coords: &[Vector3<f64>],
        deriv: bool,
        non0tab: Option<&Non0Tab>,
    ) -> Result<Vec<DMatrix<f64>>, BasisError> {
        let ngrids = coords.len();
        let nao = self.nao();
        if let Some(tab) = non0tab {
            tab.check_shape(ngrids, self.nbas())?;
        }
        let ncomp = if deriv { 4 } else { 1 };
        let ao_loc = self.ao_loc();

        let rows: Vec<Vec<f64>> = coords
            .par_iter()
            .enumerate()
            .map(|(p, r)| {
                let blk = p / BLKSIZE;
                let mut row = vec![0.0; ncomp * nao];
                for (sh, shell) in self.shells.iter().enumerate() {
                    if non0tab.is_some_and(|tab| !tab.is_active(blk, sh)) {
                        continue;
                    }
                    for (k, f) in shell.functions.iter().enumerate() {
                        let i = ao_loc[sh] + k;
                        if deriv {
                            let (v, g) = f.value_and_gradient(r);
                            row[i] = v;
                            row[nao + i] = g.x;
                            row[2 * nao + i] = g.y;
                            row[3 * nao + i] = g.z;
                        } else {
                            row[i] = f.evaluate(r);
                        }
                    }
                }
                row
            })
            .collect();

        let mut out = vec![DMatrix::zeros(ngrids, nao); ncomp];
        for (p, row) in rows.iter().enumerate() {
            for (c, comp) in out.iter_mut().enumerate() {
                for i in 0..nao {
                    comp[(p, i)] = row[c * nao + i];
                }
            }
        }
        Ok(out)
    }
}
