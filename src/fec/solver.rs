//! Intermediate symbol solver.
//!
//! Inactivation decoding over GF(256):
//! 1. Pivot on the sparsest remaining sparse row. Its other active columns
//!    are inactivated so that fill-in only ever lands on inactive columns.
//! 2. Dense Gauss-Jordan over the inactive columns, using the rows left over
//!    from phase 1 together with the HDPC rows.
//! 3. Back-substitute every phase-1 pivot from the inactive values.
//!
//! Elimination only looks at coefficients, so it is recorded once as a
//! [`SolvePlan`] of deferred symbol operations and then replayed on the
//! right-hand side. The same plan serves every block with the same row set.
//! Pivot order depends only on the row set and its order, never on timing,
//! so a fixed canonical row order always yields the same C.

use crate::error::{FountainError, Result};
use crate::fec::gf_tables::{gf_inv, gf_mul, gf_mul_add_slice, gf_scale_slice};
use crate::fec::params::CodeParameters;
use crate::fec::symbol::Symbol;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    Active,
    Inactive,
    Pivot,
}

/// Deferred operation on the right-hand side symbols, addressed by row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolOp {
    AddAssign { dest: usize, src: usize },
    MulAssign { dest: usize, scalar: u8 },
    Fma { dest: usize, src: usize, scalar: u8 },
}

impl SymbolOp {
    /// `dest += scalar * src`, or nothing for a zero scalar.
    fn fma(dest: usize, src: usize, scalar: u8) -> Option<Self> {
        match scalar {
            0 => None,
            1 => Some(SymbolOp::AddAssign { dest, src }),
            _ => Some(SymbolOp::Fma { dest, src, scalar }),
        }
    }

    fn scale(dest: usize, scalar: u8) -> Option<Self> {
        (scalar != 1).then_some(SymbolOp::MulAssign { dest, scalar })
    }
}

/// Recorded elimination for one row set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvePlan {
    rows: usize,
    ops: Vec<SymbolOp>,
    /// Row holding each intermediate symbol once `ops` have run.
    columns: Vec<usize>,
    inactivated: usize,
}

impl SolvePlan {
    /// Number of right-hand sides the plan expects.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn operations(&self) -> usize {
        self.ops.len()
    }

    /// Columns handled by dense elimination.
    pub fn inactivated(&self) -> usize {
        self.inactivated
    }

    fn check(&self) -> Result<()> {
        let in_range = |i: usize| i < self.rows;
        let ops_ok = self.ops.iter().all(|op| match *op {
            SymbolOp::AddAssign { dest, src } | SymbolOp::Fma { dest, src, .. } => {
                in_range(dest) && in_range(src) && dest != src
            }
            SymbolOp::MulAssign { dest, scalar } => in_range(dest) && scalar != 0,
        });
        if !ops_ok || !self.columns.iter().all(|&r| in_range(r)) {
            return Err(FountainError::MismatchedParameters(
                "solve plan addresses rows outside its system".into(),
            ));
        }
        Ok(())
    }

    /// Replays the plan on `rhs`, one symbol per row in plan order, and
    /// returns the L intermediate symbols.
    pub fn apply(&self, mut rhs: Vec<Symbol>) -> Result<Vec<Symbol>> {
        if rhs.len() != self.rows {
            return Err(FountainError::MismatchedParameters(format!(
                "{} right-hand sides for {} rows",
                rhs.len(),
                self.rows
            )));
        }
        self.check()?;
        for op in &self.ops {
            match *op {
                SymbolOp::AddAssign { dest, src } => {
                    let (dst, src) = pair_mut(&mut rhs, dest, src);
                    dst.mul_add_assign(src, 1);
                }
                SymbolOp::MulAssign { dest, scalar } => rhs[dest].scale(scalar),
                SymbolOp::Fma { dest, src, scalar } => {
                    let (dst, src) = pair_mut(&mut rhs, dest, src);
                    dst.mul_add_assign(src, scalar);
                }
            }
        }
        Ok(self
            .columns
            .iter()
            .map(|&row| std::mem::take(&mut rhs[row]))
            .collect())
    }
}

/// Result of a successful solve.
#[derive(Debug)]
pub struct Solution {
    pub symbols: Vec<Symbol>,
    /// Columns handled by dense elimination.
    pub inactivated: usize,
}

/// Returns `(dst, src)` for two distinct indices of the same slice.
fn pair_mut(v: &mut [Symbol], dst: usize, src: usize) -> (&mut Symbol, &Symbol) {
    debug_assert_ne!(dst, src);
    if dst < src {
        let (lo, hi) = v.split_at_mut(src);
        (&mut lo[dst], &hi[0])
    } else {
        let (lo, hi) = v.split_at_mut(dst);
        (&mut hi[0], &lo[src])
    }
}

/// Eliminates the system `sparse` followed by `dense` without touching any
/// symbol data.
///
/// Columns `W..L` start inactive. A rank-deficient system yields
/// `InsufficientSymbols`.
pub fn plan<R>(params: &CodeParameters, sparse: &[R], dense: &[Vec<u8>]) -> Result<SolvePlan>
where
    R: AsRef<[(usize, u8)]>,
{
    let l = params.l();
    let ns = sparse.len();
    let mut dense: Vec<Vec<u8>> = dense.to_vec();
    let mut ops: Vec<SymbolOp> = Vec::new();

    let mut state = vec![Column::Active; l];
    let mut inactive_order: Vec<usize> = Vec::with_capacity(params.p() * 2);
    for c in params.w..l {
        state[c] = Column::Inactive;
        inactive_order.push(c);
    }

    let mut active: Vec<Vec<(usize, u8)>> = Vec::with_capacity(ns);
    let mut inactive: Vec<BTreeMap<usize, u8>> = Vec::with_capacity(ns);
    let mut col_rows: Vec<Vec<usize>> = vec![Vec::new(); l];
    for (r, row) in sparse.iter().enumerate() {
        let mut a = Vec::with_capacity(row.as_ref().len());
        let mut i = BTreeMap::new();
        for &(c, v) in row.as_ref() {
            if v == 0 {
                continue;
            }
            if state[c] == Column::Inactive {
                i.insert(c, v);
            } else {
                a.push((c, v));
                col_rows[c].push(r);
            }
        }
        active.push(a);
        inactive.push(i);
    }

    let mut used = vec![false; ns];
    let mut heap: BinaryHeap<Reverse<(usize, usize)>> =
        (0..ns).map(|r| Reverse((active[r].len(), r))).collect();
    let mut pivots: Vec<(usize, usize, u8)> = Vec::new();

    while let Some(Reverse((degree, r))) = heap.pop() {
        if used[r] || degree == 0 || degree != active[r].len() {
            continue;
        }

        let (pc, coef) = active[r][0];
        let extra: Vec<usize> = active[r][1..].iter().map(|&(c, _)| c).collect();
        for c in extra {
            state[c] = Column::Inactive;
            inactive_order.push(c);
            for x in std::mem::take(&mut col_rows[c]) {
                if let Some(pos) = active[x].iter().position(|&(cc, _)| cc == c) {
                    let (_, v) = active[x].remove(pos);
                    inactive[x].insert(c, v);
                    if !used[x] && x != r {
                        heap.push(Reverse((active[x].len(), x)));
                    }
                }
            }
        }

        used[r] = true;
        state[pc] = Column::Pivot;
        let inv = gf_inv(coef)?;
        let pivot_terms: Vec<(usize, u8)> = inactive[r].iter().map(|(&c, &v)| (c, v)).collect();

        for x in std::mem::take(&mut col_rows[pc]) {
            if used[x] {
                continue;
            }
            let Some(pos) = active[x].iter().position(|&(c, _)| c == pc) else {
                continue;
            };
            let (_, v) = active[x].remove(pos);
            let f = gf_mul(v, inv);
            for &(c, pv) in &pivot_terms {
                let e = inactive[x].entry(c).or_insert(0);
                *e ^= gf_mul(f, pv);
                if *e == 0 {
                    inactive[x].remove(&c);
                }
            }
            ops.extend(SymbolOp::fma(x, r, f));
            heap.push(Reverse((active[x].len(), x)));
        }

        for (hi, row) in dense.iter_mut().enumerate() {
            if row[pc] == 0 {
                continue;
            }
            let f = gf_mul(row[pc], inv);
            row[pc] = 0;
            for &(c, pv) in &pivot_terms {
                row[c] ^= gf_mul(f, pv);
            }
            ops.extend(SymbolOp::fma(ns + hi, r, f));
        }

        pivots.push((pc, r, coef));
    }

    // columns no sparse row could pivot on go to the dense phase
    for (c, s) in state.iter_mut().enumerate() {
        if *s == Column::Active {
            *s = Column::Inactive;
            inactive_order.push(c);
        }
    }
    let num_inactive = inactive_order.len();
    debug!(
        "solver phase 1: {} pivots, {} inactive columns, {} rows",
        pivots.len(),
        num_inactive,
        ns + dense.len()
    );

    let mut position = vec![usize::MAX; l];
    for (i, &c) in inactive_order.iter().enumerate() {
        position[c] = i;
    }

    // phase 2 rows reference their right-hand side by row index
    let mut mat: Vec<Vec<u8>> = Vec::new();
    let mut mat_rhs: Vec<usize> = Vec::new();
    for r in (0..ns).filter(|&r| !used[r]) {
        let mut v = vec![0u8; num_inactive];
        for (&c, &coef) in &inactive[r] {
            v[position[c]] = coef;
        }
        mat.push(v);
        mat_rhs.push(r);
    }
    for (hi, row) in dense.iter().enumerate() {
        mat.push(inactive_order.iter().map(|&c| row[c]).collect());
        mat_rhs.push(ns + hi);
    }

    let n = mat.len();
    let mut row_used = vec![false; n];
    let mut pivot_row = vec![usize::MAX; num_inactive];
    let mut rank = 0;
    for col in 0..num_inactive {
        let Some(p) = (0..n).find(|&r| !row_used[r] && mat[r][col] != 0) else {
            continue;
        };
        row_used[p] = true;
        pivot_row[col] = p;
        rank += 1;

        let inv = gf_inv(mat[p][col])?;
        gf_scale_slice(&mut mat[p], inv);
        ops.extend(SymbolOp::scale(mat_rhs[p], inv));
        let pr = mat[p].clone();
        for r in 0..n {
            if r == p || mat[r][col] == 0 {
                continue;
            }
            let f = mat[r][col];
            gf_mul_add_slice(&mut mat[r], &pr, f);
            ops.extend(SymbolOp::fma(mat_rhs[r], mat_rhs[p], f));
        }
    }

    if rank < num_inactive {
        debug!("solver phase 2: rank {} of {} inactive columns", rank, num_inactive);
        return Err(FountainError::InsufficientSymbols {
            rank: pivots.len() + rank,
            needed: l,
        });
    }

    let mut columns = vec![usize::MAX; l];
    for (col, &p) in pivot_row.iter().enumerate() {
        columns[inactive_order[col]] = mat_rhs[p];
    }
    for &(pc, r, coef) in &pivots {
        for (&c, &v) in &inactive[r] {
            let src = columns[c];
            if src == usize::MAX {
                return Err(FountainError::Arithmetic("inactive column left unsolved"));
            }
            ops.extend(SymbolOp::fma(r, src, v));
        }
        ops.extend(SymbolOp::scale(r, gf_inv(coef)?));
        columns[pc] = r;
    }
    if columns.contains(&usize::MAX) {
        return Err(FountainError::Arithmetic("intermediate symbol left unsolved"));
    }
    debug!("solver: {} symbol operations recorded", ops.len());

    Ok(SolvePlan {
        rows: ns + dense.len(),
        ops,
        columns,
        inactivated: num_inactive,
    })
}

/// Solves `A * C = rhs` where A is `sparse` followed by `dense`.
///
/// `rhs` holds one symbol per row in the same order.
pub fn solve<R>(
    params: &CodeParameters,
    sparse: &[R],
    dense: &[Vec<u8>],
    rhs: Vec<Symbol>,
) -> Result<Solution>
where
    R: AsRef<[(usize, u8)]>,
{
    let rows = sparse.len() + dense.len();
    if rhs.len() != rows {
        return Err(FountainError::MismatchedParameters(format!(
            "{} right-hand sides for {} rows",
            rhs.len(),
            rows
        )));
    }
    let plan = plan(params, sparse, dense)?;
    let symbols = plan.apply(rhs)?;
    Ok(Solution {
        symbols,
        inactivated: plan.inactivated,
    })
}
