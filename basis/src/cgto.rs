/* Contracted gaussian type orbitals (CGTO) and shells,
   built on gto.rs, which is the basic gaussian type orbital
*/
#![allow(non_snake_case)]

use crate::basis::Basis;
use crate::error::BasisError;
use crate::gto::GTO;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractedGTO {
    pub primitives: Vec<GTO>,
    pub coefficients: Vec<f64>,
    // shell_type: s, px, py, pz, dxx, ...
    pub shell_type: String,
    pub l: i32,
}

impl Basis for ContractedGTO {
    fn evaluate(&self, r: &Vector3<f64>) -> f64 {
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .map(|(g, c)| c * g.evaluate(r))
            .sum()
    }

    fn gradient(&self, r: &Vector3<f64>) -> Vector3<f64> {
        self.primitives
            .iter()
            .zip(&self.coefficients)
            .fold(Vector3::zeros(), |acc, (g, c)| acc + g.gradient(r) * *c)
    }

    fn Sab(a: &Self, b: &Self) -> f64 {
        let mut val = 0.0;
        for (ga, ca) in a.primitives.iter().zip(&a.coefficients) {
            for (gb, cb) in b.primitives.iter().zip(&b.coefficients) {
                val += ca * cb * GTO::Sab(ga, gb);
            }
        }
        val
    }
}

impl ContractedGTO {
    pub fn value_and_gradient(&self, r: &Vector3<f64>) -> (f64, Vector3<f64>) {
        self.primitives.iter().zip(&self.coefficients).fold(
            (0.0, Vector3::zeros()),
            |(v, g), (prim, c)| {
                let (pv, pg) = prim.value_and_gradient(r);
                (v + c * pv, g + pg * *c)
            },
        )
    }
}

/// Cartesian components per angular momentum, in the order the functions
/// of a shell are laid out.
const CART_S: [(&str, [i32; 3]); 1] = [("s", [0, 0, 0])];
const CART_P: [(&str, [i32; 3]); 3] = [("px", [1, 0, 0]), ("py", [0, 1, 0]), ("pz", [0, 0, 1])];
const CART_D: [(&str, [i32; 3]); 6] = [
    ("dxx", [2, 0, 0]),
    ("dxy", [1, 1, 0]),
    ("dxz", [1, 0, 1]),
    ("dyy", [0, 2, 0]),
    ("dyz", [0, 1, 1]),
    ("dzz", [0, 0, 2]),
];

fn cartesian_components(l: i32) -> &'static [(&'static str, [i32; 3])] {
    match l {
        0 => &CART_S,
        1 => &CART_P,
        2 => &CART_D,
        _ => panic!("Cartesian shells support l = 0, 1, 2; got l = {}", l),
    }
}

/// One angular-momentum shell: all Cartesian functions sharing exponents and a center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shell {
    pub l: i32,
    pub center: Vector3<f64>,
    pub functions: Vec<ContractedGTO>,
}

impl Shell {
    /// Builds the Cartesian shell of angular momentum `l`.
    ///
    /// # Panics
    /// If `l` is not 0, 1 or 2.
    pub fn new(l: i32, center: Vector3<f64>, exponents: &[f64], coefficients: &[f64]) -> Self {
        let functions = cartesian_components(l)
            .iter()
            .map(|(label, lxyz)| ContractedGTO {
                primitives: exponents
                    .iter()
                    .map(|&alpha| GTO::new(alpha, Vector3::new(lxyz[0], lxyz[1], lxyz[2]), center))
                    .collect(),
                coefficients: coefficients.to_vec(),
                shell_type: label.to_string(),
                l,
            })
            .collect();
        Shell {
            l,
            center,
            functions,
        }
    }

    pub fn nfunctions(&self) -> usize {
        self.functions.len()
    }
}

fn shell_labels(label: &str) -> Result<Vec<i32>, BasisError> {
    match label {
        "S" => Ok(vec![0]),
        "P" => Ok(vec![1]),
        "D" => Ok(vec![2]),
        "SP" => Ok(vec![0, 1]),
        _ => Err(BasisError::Parse(format!("unsupported shell type '{}'", label))),
    }
}

// Example of nwchem format:
// BASIS "ao basis" PRINT
// H    S
//       3.42525091             0.15432897
//       0.62391373             0.53532814
//       0.16885540             0.44463454
// C    SP
//       2.9412494             -0.09996723             0.15591627
//       0.6834831              0.39951283             0.60768372
//       0.2222899              0.70011547             0.39195739
// END
fn flush_block(
    shells: &mut Vec<Shell>,
    ls: &[i32],
    rows: &[Vec<f64>],
    center: Vector3<f64>,
) -> Result<(), BasisError> {
    if rows.is_empty() {
        return Ok(());
    }
    let exponents: Vec<f64> = rows.iter().map(|r| r[0]).collect();
    for (k, &l) in ls.iter().enumerate() {
        let coefficients = rows
            .iter()
            .map(|r| {
                r.get(k + 1).copied().ok_or_else(|| {
                    BasisError::Parse(format!(
                        "missing contraction coefficient {} in row {:?}",
                        k + 1,
                        r
                    ))
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        shells.push(Shell::new(l, center, &exponents, &coefficients));
    }
    Ok(())
}

/// Parses an NWChem-format basis for one element into shells centred at `center`.
pub fn parse_nwchem(input: &str, center: Vector3<f64>) -> Result<Vec<Shell>, BasisError> {
    let mut shells = Vec::new();
    let mut current: Option<Vec<i32>> = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("BASIS") {
            continue;
        }
        if line.eq_ignore_ascii_case("END") {
            break;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens[0].chars().all(char::is_alphabetic) {
            if tokens.len() < 2 {
                return Err(BasisError::Parse(format!("missing shell type in '{}'", line)));
            }
            if let Some(ls) = current.take() {
                flush_block(&mut shells, &ls, &rows, center)?;
            }
            rows.clear();
            current = Some(shell_labels(tokens[1])?);
            continue;
        }

        if current.is_none() {
            return Err(BasisError::Parse(format!(
                "primitive line before shell header: '{}'",
                line
            )));
        }
        let row = tokens
            .iter()
            .map(|t| {
                t.replace(['D', 'd'], "E")
                    .parse::<f64>()
                    .map_err(|_| BasisError::Parse(format!("invalid number '{}'", t)))
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    if let Some(ls) = current {
        flush_block(&mut shells, &ls, &rows, center)?;
    }
    Ok(shells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::simpson_integration_3d;

    const H_STO3G: &str = "
#  STO-3G  EMSL  Basis Set Exchange Library
BASIS \"ao basis\" PRINT
H    S
      3.42525091             0.15432897
      0.62391373             0.53532814
      0.16885540             0.44463454
END
";

    const C_STO3G: &str = "
C    S
     71.6168370              0.15432897
     13.0450960              0.53532814
      3.5305122              0.44463454
C    SP
      2.9412494             -0.09996723             0.15591627
      0.6834831              0.39951283             0.60768372
      0.2222899              0.70011547             0.39195739
END
";

    #[test]
    fn test_d_shell_has_six_functions() {
        let shell = Shell::new(2, Vector3::zeros(), &[0.5], &[1.0]);
        assert_eq!(shell.nfunctions(), 6);
    }

    #[test]
    #[should_panic(expected = "got l = 3")]
    fn test_f_shell_is_rejected() {
        Shell::new(3, Vector3::zeros(), &[0.5], &[1.0]);
    }

    #[test]
    fn test_parse_single_s_shell() {
        let shells = parse_nwchem(H_STO3G, Vector3::zeros()).unwrap();
        assert_eq!(shells.len(), 1);
        assert_eq!(shells[0].l, 0);
        assert_eq!(shells[0].functions[0].primitives.len(), 3);
        assert!((shells[0].functions[0].coefficients[1] - 0.53532814).abs() < 1e-12);
    }

    #[test]
    fn test_parse_sp_block_splits_into_s_and_p() {
        let shells = parse_nwchem(C_STO3G, Vector3::new(0.0, 0.0, 1.0)).unwrap();
        let ls: Vec<i32> = shells.iter().map(|s| s.l).collect();
        assert_eq!(ls, vec![0, 0, 1]);
        assert_eq!(shells[2].nfunctions(), 3);
        assert_eq!(shells[2].functions[1].shell_type, "py");
        assert!((shells[2].functions[0].coefficients[0] - 0.15591627).abs() < 1e-12);
        assert!((shells[2].center.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_parse_rejects_unknown_shell() {
        let err = parse_nwchem("H    F\n 1.0 1.0\n", Vector3::zeros()).unwrap_err();
        assert!(matches!(err, BasisError::Parse(_)));
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        let err = parse_nwchem("H    S\n 1.0 abc\n", Vector3::zeros()).unwrap_err();
        assert!(matches!(err, BasisError::Parse(_)));
    }

    #[test]
    fn test_contracted_gradient_matches_finite_difference() {
        let shells = parse_nwchem(C_STO3G, Vector3::new(0.1, -0.2, 0.3)).unwrap();
        let r = Vector3::new(0.4, 0.5, -0.3);
        let h = 1e-5;
        for f in shells.iter().flat_map(|s| s.functions.iter()) {
            let (_, grad) = f.value_and_gradient(&r);
            for d in 0..3 {
                let mut rp = r;
                let mut rm = r;
                rp[d] += h;
                rm[d] -= h;
                let fd = (f.evaluate(&rp) - f.evaluate(&rm)) / (2.0 * h);
                assert!(
                    (fd - grad[d]).abs() < 1e-6,
                    "{} d{}: fd = {}, analytic = {}",
                    f.shell_type,
                    d,
                    fd,
                    grad[d]
                );
            }
        }
    }

    #[test]
    fn test_contracted_overlap_matches_quadrature() {
        let shells = parse_nwchem(H_STO3G, Vector3::zeros()).unwrap();
        let f = &shells[0].functions[0];
        let lower = Vector3::new(-6.0, -6.0, -6.0);
        let upper = Vector3::new(6.0, 6.0, 6.0);
        let integral = simpson_integration_3d(
            |x, y, z| f.evaluate(&Vector3::new(x, y, z)).powi(2),
            lower,
            upper,
            80,
            80,
            80,
        );
        let overlap = ContractedGTO::Sab(f, f);
        assert!((integral - overlap).abs() < 1e-4, "{} vs {}", integral, overlap);
        // STO-3G contractions are normalized
        assert!((overlap - 1.0).abs() < 1e-3);
    }
}
