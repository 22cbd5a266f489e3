//! GF(2^8) arithmetic backed by log/antilog tables.
//!
//! The tables are built once per process on first use and are read-only
//! afterwards, so every encoder and decoder shares them freely.

use crate::error::{FountainError, Result};
use lazy_static::lazy_static;

/// x^8 + x^4 + x^3 + x^2 + 1
pub const IRREDUCIBLE_POLY: u16 = 0x11D;

/// Generator of the multiplicative group.
pub const ALPHA: u8 = 2;

pub struct GfTables {
    pub log: [u8; 256],
    /// Doubled so that `exp[log a + log b]` never needs a modulo.
    pub exp: [u8; 510],
}

fn build_tables() -> GfTables {
    let mut log = [0u8; 256];
    let mut exp = [0u8; 510];
    let mut x: u16 = 1;
    for i in 0..255 {
        exp[i] = x as u8;
        exp[i + 255] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= IRREDUCIBLE_POLY;
        }
    }
    GfTables { log, exp }
}

lazy_static! {
    pub static ref GF_TABLES: GfTables = build_tables();
}

/// Forces the one-time table build.
pub fn init_gf_tables() {
    lazy_static::initialize(&GF_TABLES);
}

#[inline(always)]
pub fn gf_add(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline(always)]
pub fn gf_mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = &*GF_TABLES;
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

#[inline(always)]
pub fn gf_inv(a: u8) -> Result<u8> {
    if a == 0 {
        return Err(FountainError::Arithmetic("inverse of zero"));
    }
    let t = &*GF_TABLES;
    Ok(t.exp[255 - t.log[a as usize] as usize])
}

#[inline(always)]
pub fn gf_div(a: u8, b: u8) -> Result<u8> {
    if b == 0 {
        return Err(FountainError::Arithmetic("division by zero"));
    }
    if a == 0 {
        return Ok(0);
    }
    let t = &*GF_TABLES;
    Ok(t.exp[t.log[a as usize] as usize + 255 - t.log[b as usize] as usize])
}

/// alpha^i for any exponent.
#[inline(always)]
pub fn gf_exp(i: usize) -> u8 {
    GF_TABLES.exp[i % 255]
}

/// `dst[i] ^= c * src[i]`
pub fn gf_mul_add_slice(dst: &mut [u8], src: &[u8], c: u8) {
    debug_assert_eq!(dst.len(), src.len());
    match c {
        0 => {}
        1 => {
            for (d, s) in dst.iter_mut().zip(src) {
                *d ^= *s;
            }
        }
        _ => {
            let t = &*GF_TABLES;
            let log_c = t.log[c as usize] as usize;
            for (d, s) in dst.iter_mut().zip(src) {
                if *s != 0 {
                    *d ^= t.exp[log_c + t.log[*s as usize] as usize];
                }
            }
        }
    }
}

/// `buf[i] *= c`
pub fn gf_scale_slice(buf: &mut [u8], c: u8) {
    match c {
        0 => buf.fill(0),
        1 => {}
        _ => {
            let t = &*GF_TABLES;
            let log_c = t.log[c as usize] as usize;
            for b in buf.iter_mut() {
                if *b != 0 {
                    *b = t.exp[log_c + t.log[*b as usize] as usize];
                }
            }
        }
    }
}
