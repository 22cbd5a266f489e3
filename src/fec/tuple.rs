//! Deterministic tuple generator.
//!
//! Every repair symbol is a combination of intermediate symbols chosen by a
//! tuple derived only from its ESI and the block parameters. Encoder and
//! decoder must agree bit for bit, so nothing here carries state.

use crate::fec::params::CodeParameters;

/// Cumulative degree distribution over 2^20.
const DEGREE_TABLE: [u32; 31] = [
    0, 5243, 529531, 704294, 791675, 844104, 879057, 904023, 922747, 937311, 948962, 958494,
    966438, 973160, 978921, 983914, 988283, 992138, 995565, 998631, 1001391, 1003887, 1006157,
    1008229, 1010129, 1011876, 1013490, 1014983, 1016370, 1017662, 1048576,
];

#[inline]
pub(crate) fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Pseudo-random value in `0..m` for seed `y` and stream `i`.
#[inline]
pub fn rand(y: u32, i: u8, m: u32) -> u32 {
    debug_assert!(m > 0);
    let mixed = splitmix64((u64::from(y) << 32) | u64::from(i));
    ((mixed >> 32) % u64::from(m)) as u32
}

/// LT degree for `v` drawn from `0..2^20`, capped at `w - 2`.
pub fn degree(v: u32, w: u32) -> u32 {
    let d = DEGREE_TABLE
        .iter()
        .skip(1)
        .position(|&threshold| v < threshold)
        .map_or(DEGREE_TABLE.len() as u32 - 1, |p| p as u32 + 1);
    d.min(w - 2)
}

/// Parameters selecting the LT and PI columns of one encoding symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuple {
    pub d: u32,
    pub a: u32,
    pub b: u32,
    pub d1: u32,
    pub a1: u32,
    pub b1: u32,
}

impl Tuple {
    pub fn new(params: &CodeParameters, isi: u32) -> Self {
        let w = params.w as u32;
        let p1 = params.p1() as u32;
        let j = params.j as u32;

        let mut a_seed = 53591u32.wrapping_add(j.wrapping_mul(997));
        if a_seed % 2 == 0 {
            a_seed = a_seed.wrapping_add(1);
        }
        let b_seed = 10267u32.wrapping_mul(j + 1);
        let y = b_seed.wrapping_add(isi.wrapping_mul(a_seed));

        let v = rand(y, 0, 1 << 20);
        let d = degree(v, w);
        let a = 1 + rand(y, 1, w - 1);
        let b = rand(y, 2, w);
        let d1 = if d < 4 { 2 + rand(isi, 3, 2) } else { 2 };
        let a1 = 1 + rand(isi, 4, p1 - 1);
        let b1 = rand(isi, 5, p1);
        Tuple { d, a, b, d1, a1, b1 }
    }

    /// Intermediate-symbol columns touched by this tuple, LT columns first.
    pub fn columns(&self, params: &CodeParameters) -> Vec<usize> {
        let w = params.w as u32;
        let p = params.p() as u32;
        let p1 = params.p1() as u32;
        let mut cols = Vec::with_capacity((self.d + self.d1) as usize);

        let mut b = self.b;
        cols.push(b as usize);
        for _ in 1..self.d {
            b = (b + self.a) % w;
            cols.push(b as usize);
        }

        let mut b1 = self.b1;
        while b1 >= p {
            b1 = (b1 + self.a1) % p1;
        }
        cols.push((w + b1) as usize);
        for _ in 1..self.d1 {
            b1 = (b1 + self.a1) % p1;
            while b1 >= p {
                b1 = (b1 + self.a1) % p1;
            }
            cols.push((w + b1) as usize);
        }
        cols
    }
}

/// Sparse `(column, coefficient)` pairs for encoding symbol `esi`, sorted by column.
pub fn tuple_for(params: &CodeParameters, esi: u32) -> Vec<(usize, u8)> {
    let mut cols = Tuple::new(params, esi).columns(params);
    cols.sort_unstable();
    let mut row: Vec<(usize, u8)> = Vec::with_capacity(cols.len());
    for c in cols {
        match row.last() {
            Some(&(last, _)) if last == c => {
                row.pop();
            }
            _ => row.push((c, 1)),
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splitmix_reference_output() {
        assert_eq!(splitmix64(0), 0xe220_a839_7b1d_cdaf);
        assert_eq!(splitmix64(1), 0x910a_2dec_8902_5cc1);
    }

    #[test]
    fn rand_golden_values() {
        assert_eq!(rand(0, 0, 1 << 20), 43065);
        assert_eq!(rand(1, 6, 10), 5);
        assert_eq!(rand(12345, 2, 1021), 236);
        assert_eq!(rand(u32::MAX, 5, 97), 34);
    }

    #[test]
    fn degree_bounds() {
        assert_eq!(degree(0, 100), 1);
        assert_eq!(degree(5243, 100), 2);
        assert_eq!(degree(1_048_575, 100), 30);
        assert_eq!(degree(1_048_575, 17), 15);
    }
}
