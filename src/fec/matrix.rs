//! Constraint matrix A for one source block.
//!
//! Row layout: S LDPC rows, H HDPC rows, then one row per padded source
//! symbol. Columns are the L intermediate symbols: W LT columns (the last S
//! of which belong to the LDPC block) followed by P permanently inactive
//! columns.

use crate::fec::gf_tables::{gf_exp, gf_mul, ALPHA};
use crate::fec::params::CodeParameters;
use crate::fec::tuple::{rand, tuple_for};

/// Sorted `(column, coefficient)` pairs with nonzero coefficients.
pub type SparseRow = Vec<(usize, u8)>;

#[derive(Clone, Debug)]
pub struct ConstraintMatrix {
    params: CodeParameters,
    ldpc: Vec<SparseRow>,
    hdpc: Vec<Vec<u8>>,
}

impl ConstraintMatrix {
    pub fn new(params: CodeParameters) -> Self {
        let ldpc = build_ldpc(&params);
        let hdpc = build_hdpc(&params);
        Self { params, ldpc, hdpc }
    }

    pub fn params(&self) -> &CodeParameters {
        &self.params
    }

    pub fn num_columns(&self) -> usize {
        self.params.l()
    }

    pub fn ldpc_rows(&self) -> &[SparseRow] {
        &self.ldpc
    }

    /// Dense HDPC rows, each `L` wide.
    pub fn hdpc_rows(&self) -> &[Vec<u8>] {
        &self.hdpc
    }

    /// Row of encoding symbol `esi`. Source symbols (esi < K') use the same
    /// generator, which pins C so that re-encoding them reproduces the source.
    pub fn tuple_for(&self, esi: u32) -> SparseRow {
        tuple_for(&self.params, esi)
    }

    /// Rows S+H.. of A, one per padded source symbol.
    pub fn source_rows(&self) -> impl Iterator<Item = SparseRow> + '_ {
        (0..self.params.k_prime as u32).map(move |isi| self.tuple_for(isi))
    }

    /// Sparse part of the system for the given rows: LDPC rows first, then
    /// one row per ESI in the order supplied.
    pub fn sparse_system<I>(&self, esis: I) -> Vec<SparseRow>
    where
        I: IntoIterator<Item = u32>,
    {
        let mut rows = self.ldpc.clone();
        rows.extend(esis.into_iter().map(|esi| self.tuple_for(esi)));
        rows
    }

    /// Materialises sparse rows into `L`-wide dense rows.
    pub fn dense(&self, rows: &[SparseRow]) -> Vec<Vec<u8>> {
        let l = self.num_columns();
        rows.iter()
            .map(|row| {
                let mut dense = vec![0u8; l];
                for &(c, v) in row {
                    dense[c] = v;
                }
                dense
            })
            .collect()
    }

    /// The full L x L systematic matrix in canonical row order.
    pub fn to_dense(&self) -> Vec<Vec<u8>> {
        let mut rows = self.dense(&self.ldpc);
        rows.extend(self.hdpc.iter().cloned());
        let source: Vec<SparseRow> = self.source_rows().collect();
        rows.extend(self.dense(&source));
        rows
    }
}

fn build_ldpc(params: &CodeParameters) -> Vec<SparseRow> {
    let s = params.s;
    let b_cols = params.b();
    let w = params.w;
    let p = params.p();
    let mut cols: Vec<Vec<usize>> = vec![Vec::new(); s];

    for i in 0..b_cols {
        let a = 1 + i / s;
        let mut b = i % s;
        cols[b].push(i);
        b = (b + a) % s;
        cols[b].push(i);
        b = (b + a) % s;
        cols[b].push(i);
    }
    for (i, row) in cols.iter_mut().enumerate() {
        row.push(b_cols + i);
        row.push(w + i % p);
        row.push(w + (i + 1) % p);
    }

    cols.into_iter()
        .map(|mut row| {
            row.sort_unstable();
            row.dedup();
            row.into_iter().map(|c| (c, 1u8)).collect()
        })
        .collect()
}

/// HDPC rows: MT * GAMMA over the first K'+S columns, identity on the last H.
fn build_hdpc(params: &CodeParameters) -> Vec<Vec<u8>> {
    let h = params.h;
    let n = params.k_prime + params.s;
    let l = params.l();

    // two nonzero rows per MT column, except the last which is alpha^i
    let mt_rows: Vec<(usize, usize)> = (0..n - 1)
        .map(|j| {
            let seed = (j + 1) as u32;
            let i1 = rand(seed, 6, h as u32) as usize;
            let i2 = (i1 + rand(seed, 7, h as u32 - 1) as usize + 1) % h;
            (i1, i2)
        })
        .collect();

    (0..h)
        .map(|row| {
            let mut dense = vec![0u8; l];
            let mut acc = gf_exp(row);
            dense[n - 1] = acc;
            for j in (0..n - 1).rev() {
                let (i1, i2) = mt_rows[j];
                let mt = u8::from(i1 == row || i2 == row);
                acc = gf_mul(acc, ALPHA) ^ mt;
                dense[j] = acc;
            }
            dense[n + row] = 1;
            dense
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fec::gf_tables::gf_inv;

    pub(crate) fn rank(mut rows: Vec<Vec<u8>>, width: usize) -> usize {
        let mut rank = 0;
        for col in 0..width {
            let Some(pivot) = (rank..rows.len()).find(|&r| rows[r][col] != 0) else {
                continue;
            };
            rows.swap(rank, pivot);
            let inv = gf_inv(rows[rank][col]).unwrap();
            for v in rows[rank].iter_mut() {
                *v = gf_mul(*v, inv);
            }
            let pivot_row = rows[rank].clone();
            for (r, row) in rows.iter_mut().enumerate() {
                if r != rank && row[col] != 0 {
                    let f = row[col];
                    for (v, p) in row.iter_mut().zip(&pivot_row) {
                        *v ^= gf_mul(f, *p);
                    }
                }
            }
            rank += 1;
        }
        rank
    }

    fn matrix_for(k: usize) -> ConstraintMatrix {
        ConstraintMatrix::new(CodeParameters::for_source_count(k).unwrap())
    }

    #[test]
    fn shapes_follow_parameters() {
        let m = matrix_for(10);
        let p = m.params().clone();
        assert_eq!(m.ldpc_rows().len(), p.s);
        assert_eq!(m.hdpc_rows().len(), p.h);
        assert!(m.hdpc_rows().iter().all(|r| r.len() == p.l()));
        assert_eq!(m.to_dense().len(), p.l());
    }

    #[test]
    fn ldpc_rows_carry_identity_and_pi_columns() {
        let m = matrix_for(150);
        let p = m.params().clone();
        for (i, row) in m.ldpc_rows().iter().enumerate() {
            assert!(row.contains(&(p.b() + i, 1)));
            assert!(row.contains(&(p.w + i % p.p(), 1)));
            assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
        }
        for col in 0..p.b() {
            let hits = m.ldpc_rows().iter().filter(|r| r.iter().any(|&(c, _)| c == col)).count();
            assert!((1..=3).contains(&hits));
        }
    }

    #[test]
    fn hdpc_block_has_full_rank() {
        let m = matrix_for(40);
        let l = m.num_columns();
        assert_eq!(rank(m.hdpc_rows().to_vec(), l), m.params().h);
    }

    #[test]
    fn systematic_matrix_is_invertible() {
        for k in [1, 10, 30, 64] {
            let m = matrix_for(k);
            let l = m.num_columns();
            assert_eq!(rank(m.to_dense(), l), l, "K = {k}");
        }
    }

    #[test]
    fn repair_tuples_stay_in_range() {
        let m = matrix_for(200);
        let l = m.num_columns();
        for esi in 200..400 {
            let row = m.tuple_for(esi);
            assert!(!row.is_empty());
            assert!(row.iter().all(|&(c, v)| c < l && v == 1));
            assert_eq!(row, m.tuple_for(esi));
        }
    }
}
