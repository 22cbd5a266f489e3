use crate::fec::gf_tables::{gf_mul_add_slice, gf_scale_slice};

/// A fixed-size block of `T` bytes that the codec treats as a vector over GF(256).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Symbol {
    data: Vec<u8>,
}

impl Symbol {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn zero(len: usize) -> Self {
        Self { data: vec![0; len] }
    }

    /// Copies `src` into a symbol of `len` bytes, zero-filling the tail.
    pub fn padded(src: &[u8], len: usize) -> Self {
        let mut data = vec![0; len];
        let n = src.len().min(len);
        data[..n].copy_from_slice(&src[..n]);
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// `self += c * other`
    pub fn mul_add_assign(&mut self, other: &Symbol, c: u8) {
        gf_mul_add_slice(&mut self.data, &other.data, c);
    }

    pub fn scale(&mut self, c: u8) {
        gf_scale_slice(&mut self.data, c);
    }
}

impl From<Vec<u8>> for Symbol {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for Symbol {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
